//! Genetic Sudoku CLI - Solve a puzzle file with propagation and a GA.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use genetic_sudoku::{
    compute::SolverEngine,
    schema::{SolverConfig, load_puzzle},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() == 2 && args[1] == "--print-config" {
        print_default_config();
        return;
    }

    if args.len() < 2 || args.len() > 7 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let puzzle_path = PathBuf::from(&args[1]);
    let puzzle = load_puzzle(&puzzle_path).unwrap_or_else(|e| {
        eprintln!("Error loading puzzle: {}", e);
        std::process::exit(1);
    });

    let mut config = load_config(&puzzle_path);
    apply_args(&mut config, &args[2..]);

    println!("{:<25}{}", "Sudoku:", puzzle_path.display());
    println!("{:<25}{}", "population size:", config.population);
    println!("{:<25}{}", "number of generations:", config.generations);
    println!("{:<25}{}", "selection rate:", config.selection_fraction());
    println!("{:<25}{}", "mutation rate:", config.start_mutate as f64 / 100.0);
    if config.elitism {
        println!("{:<25}ON", "elitism:");
        println!("{:<25}{}", "breeders:", config.breeders());
        println!("{:<25}{}", "elite progressers:", config.elite());
        println!("{:<25}{}", "lucky progressers:", config.lucky());
    } else {
        println!("{:<25}OFF", "elitism:");
    }
    println!("{:<25}{:?}", "breeding mode:", config.mode());
    println!();

    println!("********Initial Configuration (9x9 grid)********");
    println!("{}", puzzle);

    let mut engine = SolverEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let (propagated, _) = engine.propagate(&puzzle);
    println!("********Filled In Predetermined Singles********");
    println!("{}", propagated);

    let mut last_restart = None;
    let result = engine.solve_with_callback(&puzzle, |report| {
        if last_restart != Some(report.restart) {
            println!("**********Restart Number: {}**********", report.restart);
            last_restart = Some(report.restart);
        }
        println!(
            "Generation{:>5}: best score ={:>3}, worst score ={:>3}",
            report.generation, report.best_fitness, report.worst_fitness
        );
    });

    if result.best_generation.is_none() {
        println!("**********Puzzle Complete After Filling Singles**********");
        println!("{}", result.best.render(true));
        return;
    }

    let millis = result.stats.breeding_time.as_millis();
    println!("************Best Solution************");
    println!("{}", result.best.render(true));
    println!(
        "Sudoku results: fitness {}, generation {}, {} msec, {:.1} iter/sec",
        result.best.fitness,
        result.best_generation.map_or(-1, |g| g as i64),
        millis,
        result.stats.generations_per_second
    );
    println!(
        "Stopped: {:?} after {} generations and {} restarts",
        result.stats.stop_reason, result.stats.generations, result.stats.restarts
    );
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <puzzle.txt> [population] [generations] [selection] [mutation] [elitism]",
        program
    );
    eprintln!();
    eprintln!("Solve a 9x9 Sudoku with constraint propagation and a genetic algorithm.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  puzzle.txt   81 cells, digits 1-9 or '-' for blank (default options below)");
    eprintln!("  population   Population size (1000)");
    eprintln!("  generations  Generation cap (1000)");
    eprintln!("  selection    Fraction of the population that breeds (0.4)");
    eprintln!("  mutation     Starting mutation rate as a fraction, negative for mutate-only (0.05)");
    eprintln!("  elitism      1 to carry elite members over, 0 to disable (1)");
    eprintln!();
    eprintln!("A <puzzle>.config.json beside the puzzle is loaded first.");
    eprintln!("Print the default configuration with --print-config.");
}

fn print_default_config() {
    match serde_json::to_string_pretty(&SolverConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read `<puzzle>.config.json` if present. Problems fall back to defaults.
fn load_config(puzzle_path: &Path) -> SolverConfig {
    let config_path = puzzle_path.with_extension("config.json");
    if !config_path.exists() {
        return SolverConfig::default();
    }

    let parsed = fs::read_to_string(&config_path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Ignoring {}: {}; using defaults",
                config_path.display(),
                e
            );
            SolverConfig::default()
        }
    }
}

/// Apply positional overrides. Malformed values keep the current setting.
fn apply_args(config: &mut SolverConfig, args: &[String]) {
    if let Some(arg) = args.first() {
        config.population = parse_or(arg, "population", config.population);
    }
    if let Some(arg) = args.get(1) {
        config.generations = parse_or(arg, "generations", config.generations);
    }
    if let Some(arg) = args.get(2) {
        config.selection = parse_or(arg, "selection", config.selection);
    }
    if let Some(arg) = args.get(3) {
        let fraction = parse_or(arg, "mutation", config.start_mutate as f64 / 100.0);
        config.start_mutate = (fraction * 100.0).round() as i32;
    }
    if let Some(arg) = args.get(4) {
        config.elitism = parse_or(arg, "elitism", u8::from(config.elitism)) != 0;
    }

    if config.population < 2 {
        log::warn!(
            "Population {} is too small, using {}",
            config.population,
            genetic_sudoku::schema::default_population()
        );
        config.population = genetic_sudoku::schema::default_population();
    }
    if config.generations == 0 {
        log::warn!(
            "Generation cap must be positive, using {}",
            genetic_sudoku::schema::default_generations()
        );
        config.generations = genetic_sudoku::schema::default_generations();
    }
}

fn parse_or<T>(arg: &str, name: &str, fallback: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    arg.parse().unwrap_or_else(|_| {
        log::warn!("Invalid {} '{}', using {}", name, arg, fallback);
        fallback
    })
}
