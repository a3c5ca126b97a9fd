//! Progress and result types for a solver run.

use std::time::Duration;

use serde::Serialize;

use super::puzzle::Puzzle;

// ============================================================================
// Progress Types
// ============================================================================

/// How the population of an outer-loop run was seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RestartSource {
    /// Fresh random population derived from the propagated puzzle.
    Random,
    /// The full best-of archive swapped in as the population.
    Archive,
}

/// Per-generation report passed to progress callbacks.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Generation index, counted across restarts.
    pub generation: usize,
    /// Outer-loop restart index.
    pub restart: usize,
    /// Fitness of the fittest member.
    pub best_fitness: u32,
    /// Fitness of the least fit member.
    pub worst_fitness: u32,
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Mutation rate (percent) used to breed this generation.
    pub mutation_rate: i32,
    /// Consecutive generations without a change in best fitness.
    pub stagnation: usize,
    /// Puzzles currently held in the best-of archive.
    pub archive_size: usize,
}

/// Fitness history for analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolverHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<u32>,
    /// Worst fitness per generation.
    pub worst_fitness: Vec<u32>,
    /// Mutation rate per generation.
    pub mutation_rate: Vec<i32>,
    /// Generation index at which each outer-loop run started, and its source.
    pub restarts: Vec<(usize, RestartSource)>,
}

impl SolverHistory {
    pub(crate) fn record(&mut self, report: &GenerationReport) {
        self.best_fitness.push(report.best_fitness);
        self.worst_fitness.push(report.worst_fitness);
        self.mutation_rate.push(report.mutation_rate);
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Reason the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Propagation alone completed the puzzle.
    SolvedByPropagation,
    /// The GA found a zero-fitness grid.
    Solved,
    /// Generation cap reached; the result is the best candidate seen.
    MaxGenerations,
}

/// Counts from constraint propagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropagationStats {
    /// Squares filled as naked singles.
    pub naked_singles: usize,
    /// Squares filled as hidden singles.
    pub hidden_singles: usize,
    /// Alternating naked/hidden rounds run until convergence.
    pub rounds: usize,
}

impl PropagationStats {
    pub fn filled(&self) -> usize {
        self.naked_singles + self.hidden_singles
    }
}

/// Statistics from a solver run.
#[derive(Debug, Clone, Serialize)]
pub struct SolveStats {
    /// Generations bred across all restarts.
    pub generations: usize,
    /// Outer-loop restarts after stagnation.
    pub restarts: usize,
    /// Time spent producing new generations.
    pub breeding_time: Duration,
    /// Generations per second of breeding time.
    pub generations_per_second: f64,
    /// Propagation counts.
    pub propagation: PropagationStats,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Final result of a solver run. Always carries a best-effort puzzle.
#[derive(Debug, Clone, Serialize)]
pub struct SolveResult {
    /// Best puzzle seen.
    pub best: Puzzle,
    /// Generation at which `best` was found, `None` if no generation ran.
    pub best_generation: Option<usize>,
    /// Puzzle after propagation, before the GA.
    pub propagated: Puzzle,
    /// Statistics from the run.
    pub stats: SolveStats,
    /// Per-generation history.
    pub history: SolverHistory,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        self.best.fitness == 0 && self.best.is_complete()
    }
}
