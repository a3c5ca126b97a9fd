//! Genetic Sudoku - constraint propagation followed by a genetic search.
//!
//! Naked and hidden singles are filled deterministically first. The
//! remaining squares are solved by a genetic algorithm whose individuals
//! keep every subgrid a permutation of 1..=9, so fitness only counts row
//! and column duplicates.
//!
//! # Architecture
//!
//! - `schema`: puzzle grid, configuration and result types
//! - `compute`: constraint propagation and the evolutionary solver
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_sudoku::{
//!     schema::{Puzzle, SolverConfig},
//!     compute::SolverEngine,
//! };
//!
//! let puzzle: Puzzle = "\
//!     53--7---- 6--195--- -98----6- \
//!     8---6---3 4--8-3--1 7---2---6 \
//!     -6----28- ---419--5 ----8--79"
//!     .parse()
//!     .unwrap();
//!
//! let mut engine = SolverEngine::new(SolverConfig::default()).unwrap();
//! let result = engine.solve(&puzzle);
//!
//! println!("{}", result.best);
//! println!("fitness {} after {} generations", result.best.fitness, result.stats.generations);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{ConstraintPropagator, SolverEngine, SolverError};
pub use schema::{Puzzle, PuzzleError, SolveResult, SolverConfig};
