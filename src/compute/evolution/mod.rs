//! Genetic search over puzzles whose subgrids are always permutations.
//!
//! # Overview
//!
//! - **Random source** (`rng`): injectable randomness, forked per parallel task
//! - **Population** (`population`): random completion of every subgrid
//! - **Fitness** (`fitness`): row and column duplicate counting
//! - **Breeding** (`breed`): subgrid crossover, swap mutation, carry-over
//! - **Archive** (`archive`): best-of set used to seed restarts
//! - **Search** (`search`): the generation loop and stagnation control
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_sudoku::schema::{Puzzle, SolverConfig};
//! use genetic_sudoku::compute::evolution::SolverEngine;
//!
//! let puzzle = Puzzle::parse(&"-".repeat(81)).unwrap();
//! let mut engine = SolverEngine::new(SolverConfig::default()).unwrap();
//! let result = engine.solve_with_callback(&puzzle, |report| {
//!     println!("Generation {}: best {}", report.generation, report.best_fitness);
//! });
//!
//! println!("Best fitness: {}", result.best.fitness);
//! ```

mod archive;
mod breed;
mod fitness;
mod population;
mod rng;
mod search;

pub use archive::BestOfArchive;
pub use breed::{
    BreedingEngine, BreedingPlan, CrossoverMask, MAX_MUTABLE_PRESETS, MUTATION_RETRIES,
    MutationEngine, MutationOutcome, crossover, mutate, random_mask,
};
pub use fitness::{FitnessEvaluator, FitnessSummary, compare_fitness};
pub use population::{PopulationInitializer, subgrids_are_permutations};
pub use rng::{RandomSource, SolverRng};
pub use search::{SolverEngine, SolverError, SolverState, StagnationDecision};
