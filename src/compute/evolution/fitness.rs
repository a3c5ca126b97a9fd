//! Fitness scoring and ordering of populations.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::schema::layout::DIM;
use crate::schema::{Puzzle, duplicate_count};

/// Scores puzzles by row and column duplicates.
///
/// Subgrids are permutations by construction, so only rows and columns are
/// counted. Fitness 0 is a valid solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessEvaluator;

impl FitnessEvaluator {
    /// Fitness of a puzzle without storing it.
    pub fn evaluate(&self, puzzle: &Puzzle) -> u32 {
        (0..DIM)
            .map(|i| duplicate_count(&puzzle.row_values(i)) + duplicate_count(&puzzle.col_values(i)))
            .sum()
    }

    /// Compute and store the fitness of a puzzle.
    pub fn score(&self, puzzle: &mut Puzzle) {
        puzzle.fitness = self.evaluate(puzzle);
    }

    /// Score every member in parallel, then sort ascending (index 0 fittest).
    pub fn evaluate_population(&self, population: &mut [Puzzle]) {
        population.par_iter_mut().for_each(|puzzle| self.score(puzzle));
        population.sort_unstable_by(compare_fitness);
    }
}

/// Order two puzzles by fitness, fittest first.
pub fn compare_fitness(a: &Puzzle, b: &Puzzle) -> Ordering {
    a.fitness.cmp(&b.fitness)
}

/// Summary of a sorted population.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessSummary {
    pub best: u32,
    pub worst: u32,
    pub mean: f64,
}

impl FitnessSummary {
    /// Summarize a population sorted by [`FitnessEvaluator::evaluate_population`].
    pub fn of_sorted(population: &[Puzzle]) -> Option<Self> {
        let best = population.first()?.fitness;
        let worst = population.last()?.fitness;
        let total: u64 = population.iter().map(|p| p.fitness as u64).sum();

        Some(Self {
            best,
            worst,
            mean: total as f64 / population.len() as f64,
        })
    }
}
