//! Compute module - propagation and genetic search.

pub mod evolution;
mod propagate;

pub use evolution::{SolverEngine, SolverError};
pub use propagate::*;
