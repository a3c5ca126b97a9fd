//! Best-of archive used to seed restarts.

use crate::schema::Puzzle;

/// Accumulates the fittest members of every generation.
///
/// The archive holds at most `capacity` puzzles (the population size). Once
/// full it is swapped in as the population of the next restart.
#[derive(Debug, Clone, Default)]
pub struct BestOfArchive {
    members: Vec<Puzzle>,
    capacity: usize,
}

impl BestOfArchive {
    /// Create an empty archive.
    pub fn new(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the archive can replace a whole population.
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.members.len() >= self.capacity
    }

    pub fn members(&self) -> &[Puzzle] {
        &self.members
    }

    /// Append the first `take` members of a sorted generation, stopping at
    /// capacity. Returns how many were added.
    pub fn record_generation(&mut self, sorted: &[Puzzle], take: usize) -> usize {
        let room = self.capacity.saturating_sub(self.members.len());
        let added = take.min(room).min(sorted.len());
        self.members.extend(sorted[..added].iter().cloned());
        added
    }

    /// Move every member out, leaving the archive empty.
    pub fn take(&mut self) -> Vec<Puzzle> {
        std::mem::take(&mut self.members)
    }
}
