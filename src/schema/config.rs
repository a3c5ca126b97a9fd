//! Configuration for the genetic solver.

use serde::{Deserialize, Serialize};

/// How the next generation is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreedingMode {
    /// Subgrid crossover between breeder pairs, then probabilistic mutation.
    Crossover,
    /// Every offspring is a mutated copy of a breeder.
    MutateOnly,
}

/// Top-level solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Population size (POP).
    #[serde(default = "default_population")]
    pub population: usize,
    /// Generation cap across all restarts.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Fraction of the population selected as breeders. Clamped to [0, 1].
    #[serde(default = "default_selection")]
    pub selection: f64,
    /// Starting mutation rate in percent. Negative selects mutate-only mode.
    #[serde(default = "default_start_mutate")]
    pub start_mutate: i32,
    /// Carry the fittest (and a few lucky) members into the next generation.
    #[serde(default = "default_elitism")]
    pub elitism: bool,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population: default_population(),
            generations: default_generations(),
            selection: default_selection(),
            start_mutate: default_start_mutate(),
            elitism: default_elitism(),
            random_seed: None,
        }
    }
}

pub fn default_population() -> usize {
    1000
}
pub fn default_generations() -> usize {
    1000
}
pub fn default_selection() -> f64 {
    0.4
}
pub fn default_start_mutate() -> i32 {
    5
}
fn default_elitism() -> bool {
    true
}

/// Share of each generation copied into the best-of archive.
const ARCHIVE_FRACTION: f64 = 0.01;

/// Share of the non-breeding remainder carried over as elite.
const ELITE_FRACTION: f64 = 0.9;

impl SolverConfig {
    /// Selection fraction clamped to [0, 1]. NaN counts as 0.
    pub fn selection_fraction(&self) -> f64 {
        if self.selection.is_nan() {
            0.0
        } else {
            self.selection.clamp(0.0, 1.0)
        }
    }

    /// Number of breeders: `POP * selection`, at least 2 and at most POP.
    pub fn breeders(&self) -> usize {
        let raw = (self.population as f64 * self.selection_fraction()) as usize;
        raw.max(2).min(self.population)
    }

    /// Members carried over unchanged when breeders leave room.
    pub fn elite(&self) -> usize {
        let breeders = self.breeders();
        if breeders < self.population / 2 {
            ((self.population - 2 * breeders) as f64 * ELITE_FRACTION).round() as usize
        } else {
            0
        }
    }

    /// Random non-elite members carried over.
    pub fn lucky(&self) -> usize {
        let breeders = self.breeders();
        if breeders < self.population / 2 {
            self.population - 2 * breeders - self.elite()
        } else {
            0
        }
    }

    pub fn mode(&self) -> BreedingMode {
        if self.start_mutate < 0 {
            BreedingMode::MutateOnly
        } else {
            BreedingMode::Crossover
        }
    }

    /// Members of each generation appended to the archive (top 1%, rounded up).
    pub fn archive_take(&self) -> usize {
        (self.population as f64 * ARCHIVE_FRACTION).ceil() as usize
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population));
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("Generation cap must be positive")]
    NoGenerations,
}
