//! Schema module - Grid, configuration and result types for the solver.

mod config;
pub mod layout;
mod puzzle;
mod solver;
mod square;

pub use config::*;
pub use puzzle::*;
pub use solver::*;
pub use square::*;
