//! Quick solver performance test

use genetic_sudoku::{
    SolverEngine,
    schema::{Puzzle, SolverConfig},
};
use std::time::Instant;

const MEDIUM: &str = "\
    --3-2-6-- 9--3-5--1 --18-64-- \
    --81-29-- 7-------8 --67-82-- \
    --26-95-- 8--2-3--9 --5-1-3--";

fn main() {
    let puzzle = Puzzle::parse(MEDIUM).unwrap();

    println!("=== Solver Performance Test ===\n");

    for pop_size in [100, 500, 1000, 2000] {
        println!("Population: {}", pop_size);

        let config = SolverConfig {
            population: pop_size,
            generations: 200,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = SolverEngine::new(config).unwrap();
        let result = engine.solve(&puzzle);
        let elapsed = start.elapsed();

        println!("  Stop reason:    {:?}", result.stats.stop_reason);
        println!("  Generations:    {}", result.stats.generations);
        println!("  Restarts:       {}", result.stats.restarts);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Gens/sec:       {:.1}", result.stats.generations_per_second);
        println!("  Best fitness:   {}", result.best.fitness);
        println!();
    }

    println!("=== Mode Comparison (population 1000) ===\n");

    for (label, start_mutate, elitism) in [
        ("crossover + elitism", 5, true),
        ("crossover", 5, false),
        ("mutate only", -1, true),
    ] {
        let config = SolverConfig {
            population: 1000,
            generations: 200,
            start_mutate,
            elitism,
            random_seed: Some(7),
            ..Default::default()
        };

        let mut engine = SolverEngine::new(config).unwrap();
        let result = engine.solve(&puzzle);

        println!(
            "  {:<22} fitness {:>3} at generation {:?}, {:.1} gens/s",
            label,
            result.best.fitness,
            result.best_generation,
            result.stats.generations_per_second
        );
    }
}
