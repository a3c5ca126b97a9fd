//! Generation loop: breeding, stagnation control, restarts and best tracking.

use std::time::{Duration, Instant};

use crate::compute::propagate::ConstraintPropagator;
use crate::schema::{
    BreedingMode, ConfigError, GenerationReport, PropagationStats, Puzzle, RestartSource,
    SolveResult, SolveStats, SolverConfig, SolverHistory, StopReason,
};

use super::archive::BestOfArchive;
use super::breed::{BreedingEngine, BreedingPlan, MutationEngine};
use super::fitness::{FitnessEvaluator, FitnessSummary};
use super::population::PopulationInitializer;
use super::rng::SolverRng;

/// Stagnant generations before the mutation rate starts climbing.
const MUTATION_RAMP_AFTER: usize = 15;
/// Mutation rate increase per stagnant generation past the ramp.
const MUTATION_STEP: i32 = 5;
const MAX_MUTATION_RATE: i32 = 100;
/// Stagnant generations tolerated before a restart.
const STAGNATION_TOLERANCE: usize = 20;
/// Best fitness treated as one swap away from a solution.
const NEAR_SOLUTION_FITNESS: u32 = 2;
/// Tolerance granted while the best fitness sits at [`NEAR_SOLUTION_FITNESS`].
const NEAR_SOLUTION_TOLERANCE: usize = 50;

/// Solver errors.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// What the controller does after a generation has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnationDecision {
    /// Breed another generation from the current population.
    Continue,
    /// Abandon the population and reseed.
    Restart,
    /// Solved or out of generations.
    Terminate,
}

/// Mutable run state owned by the controller.
///
/// Counters reset at every restart; the generation counter and the best
/// puzzle persist for the whole run.
#[derive(Debug, Clone)]
pub struct SolverState {
    pub mutation_rate: i32,
    pub stagnation: usize,
    pub tolerance: usize,
    pub previous_best: u32,
    pub generation: usize,
    pub restart: usize,
    pub best: Option<(Puzzle, usize)>,
}

impl SolverState {
    pub fn new(start_mutate: i32) -> Self {
        Self {
            mutation_rate: start_mutate,
            stagnation: 0,
            tolerance: STAGNATION_TOLERANCE,
            previous_best: u32::MAX,
            generation: 0,
            restart: 0,
            best: None,
        }
    }

    /// Reset the per-run counters for a freshly seeded population.
    pub fn begin_run(&mut self, initial_best: u32, start_mutate: i32) {
        self.previous_best = initial_best;
        self.stagnation = 0;
        self.mutation_rate = start_mutate;
        self.tolerance = STAGNATION_TOLERANCE;
    }

    /// Update stagnation and mutation pressure from a generation's best.
    pub fn observe(&mut self, best_fitness: u32, start_mutate: i32) {
        if best_fitness == self.previous_best {
            self.stagnation += 1;
            if self.stagnation > MUTATION_RAMP_AFTER && self.mutation_rate < MAX_MUTATION_RATE {
                self.mutation_rate = (self.mutation_rate + MUTATION_STEP).min(MAX_MUTATION_RATE);
                self.tolerance = if best_fitness == NEAR_SOLUTION_FITNESS {
                    NEAR_SOLUTION_TOLERANCE
                } else {
                    STAGNATION_TOLERANCE
                };
                log::debug!(
                    "Stagnant for {} generations, mutation rate {}%, tolerance {}",
                    self.stagnation,
                    self.mutation_rate,
                    self.tolerance
                );
            }
        } else {
            self.stagnation = 0;
            self.mutation_rate = start_mutate;
        }
        self.previous_best = best_fitness;
    }

    /// Keep the fittest puzzle of a sorted generation if it is at least as
    /// good as the best seen. Ties move the record forward.
    pub fn record_best(&mut self, fittest: &Puzzle) -> bool {
        let improved = self
            .best
            .as_ref()
            .is_none_or(|(best, _)| fittest.fitness <= best.fitness);
        if improved {
            self.best = Some((fittest.clone(), self.generation));
        }
        improved
    }

    /// Decide what follows the generation just evaluated.
    ///
    /// Call after the generation counter has been advanced.
    pub fn decide(&self, best_fitness: u32, generation_cap: usize) -> StagnationDecision {
        if best_fitness == 0 || self.generation >= generation_cap {
            StagnationDecision::Terminate
        } else if self.stagnation >= self.tolerance {
            StagnationDecision::Restart
        } else {
            StagnationDecision::Continue
        }
    }
}

/// Generation producer selected by the configured mode.
#[derive(Debug, Clone)]
enum Reproduction {
    Crossover(BreedingEngine),
    MutateOnly(MutationEngine),
}

/// Genetic solver for one puzzle at a time.
pub struct SolverEngine {
    config: SolverConfig,
    rng: SolverRng,
    evaluator: FitnessEvaluator,
    propagator: ConstraintPropagator,
    reproduction: Reproduction,
}

impl SolverEngine {
    /// Create an engine. Fails only on an invalid configuration.
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let plan = BreedingPlan::from_config(&config);
        let reproduction = match config.mode() {
            BreedingMode::Crossover => Reproduction::Crossover(BreedingEngine::new(plan)),
            BreedingMode::MutateOnly => Reproduction::MutateOnly(MutationEngine::new(plan)),
        };

        log::info!(
            "Solver ready: population {}, breeders {}, elite {}, lucky {}, {:?}, seed {}",
            config.population,
            plan.breeders,
            plan.elite,
            plan.lucky,
            config.mode(),
            seed
        );

        Ok(Self {
            config,
            rng: SolverRng::new(seed),
            evaluator: FitnessEvaluator,
            propagator: ConstraintPropagator::new(),
            reproduction,
        })
    }

    /// Fill forced squares and score the result. Every solve starts from
    /// this puzzle.
    pub fn propagate(&self, puzzle: &Puzzle) -> (Puzzle, PropagationStats) {
        let mut propagated = puzzle.clone();
        let stats = self.propagator.propagate(&mut propagated);
        self.evaluator.score(&mut propagated);
        (propagated, stats)
    }

    /// Solve a puzzle without progress reporting.
    pub fn solve(&mut self, puzzle: &Puzzle) -> SolveResult {
        self.solve_with_callback(puzzle, |_| {})
    }

    /// Solve a puzzle, calling `callback` after every generation.
    ///
    /// Always returns the best puzzle seen; running out of generations is
    /// reported through [`StopReason::MaxGenerations`], not as an error.
    pub fn solve_with_callback<F>(&mut self, puzzle: &Puzzle, mut callback: F) -> SolveResult
    where
        F: FnMut(&GenerationReport),
    {
        let (propagated, propagation) = self.propagate(puzzle);

        log::info!(
            "Propagation filled {} squares ({} naked, {} hidden), {} blank remain",
            propagation.filled(),
            propagation.naked_singles,
            propagation.hidden_singles,
            propagated.blank_count()
        );

        if propagated.is_complete() && propagated.fitness == 0 {
            log::info!("Puzzle complete after filling singles");
            return SolveResult {
                best: propagated.clone(),
                best_generation: None,
                propagated,
                stats: SolveStats {
                    generations: 0,
                    restarts: 0,
                    breeding_time: Duration::ZERO,
                    generations_per_second: 0.0,
                    propagation,
                    stop_reason: StopReason::SolvedByPropagation,
                },
                history: SolverHistory::default(),
            };
        }

        let initializer = PopulationInitializer::new(propagated.clone());
        let start_mutate = self.config.start_mutate;
        let archive_take = self.config.archive_take();
        let mut archive = BestOfArchive::new(self.config.population);
        let mut state = SolverState::new(start_mutate);
        let mut history = SolverHistory::default();
        let mut breeding_time = Duration::ZERO;

        let stop_reason = loop {
            let (mut population, source) = if archive.is_full() {
                (archive.take(), RestartSource::Archive)
            } else {
                (
                    initializer.seed_population(self.config.population, &mut self.rng),
                    RestartSource::Random,
                )
            };
            log::info!(
                "Starting run {} at generation {} from {:?} population",
                state.restart,
                state.generation,
                source
            );
            history.restarts.push((state.generation, source));

            self.evaluator.evaluate_population(&mut population);
            let initial = FitnessSummary::of_sorted(&population).unwrap_or_default();
            state.begin_run(initial.best, start_mutate);

            let decision = loop {
                let started = Instant::now();
                population = self.next_generation(&population, state.mutation_rate);
                breeding_time += started.elapsed();

                self.evaluator.evaluate_population(&mut population);
                let summary = FitnessSummary::of_sorted(&population).unwrap_or_default();
                let mutation_rate = state.mutation_rate;

                state.observe(summary.best, start_mutate);
                if let Some(fittest) = population.first() {
                    state.record_best(fittest);
                }
                archive.record_generation(&population, archive_take);

                let report = GenerationReport {
                    generation: state.generation,
                    restart: state.restart,
                    best_fitness: summary.best,
                    worst_fitness: summary.worst,
                    mean_fitness: summary.mean,
                    mutation_rate,
                    stagnation: state.stagnation,
                    archive_size: archive.len(),
                };
                history.record(&report);
                callback(&report);

                state.generation += 1;
                match state.decide(summary.best, self.config.generations) {
                    StagnationDecision::Continue => {}
                    decision => break decision,
                }
            };

            if decision == StagnationDecision::Terminate {
                break if state.previous_best == 0 {
                    StopReason::Solved
                } else {
                    StopReason::MaxGenerations
                };
            }

            state.restart += 1;
            log::info!(
                "Restarting after {} stagnant generations at best fitness {} (archive {}/{})",
                state.stagnation,
                state.previous_best,
                archive.len(),
                archive.capacity()
            );
        };

        let (best, best_generation) = match state.best {
            Some((best, generation)) => (best, Some(generation)),
            None => (propagated.clone(), None),
        };

        let seconds = breeding_time.as_secs_f64();
        let generations_per_second = if seconds > 0.0 {
            state.generation as f64 / seconds
        } else {
            0.0
        };

        log::info!(
            "Stopped with {:?}: fitness {} at generation {:?}, {} generations, {} restarts",
            stop_reason,
            best.fitness,
            best_generation,
            state.generation,
            state.restart
        );

        SolveResult {
            best,
            best_generation,
            propagated,
            stats: SolveStats {
                generations: state.generation,
                restarts: state.restart,
                breeding_time,
                generations_per_second,
                propagation,
                stop_reason,
            },
            history,
        }
    }

    fn next_generation(&mut self, population: &[Puzzle], mutation_rate: i32) -> Vec<Puzzle> {
        match &self.reproduction {
            Reproduction::Crossover(engine) => {
                engine.next_generation(population, mutation_rate, &mut self.rng)
            }
            Reproduction::MutateOnly(engine) => engine.next_generation(population, &mut self.rng),
        }
    }
}
