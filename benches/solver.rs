//! Benchmarks for fitness scoring and generation transitions.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use genetic_sudoku::{
    compute::{
        ConstraintPropagator,
        evolution::{
            BreedingEngine, BreedingPlan, FitnessEvaluator, MutationEngine, PopulationInitializer,
            SolverRng,
        },
    },
    schema::{Puzzle, SolverConfig},
};

const HARD: &str = "\
    8-------- --36----- -7--9-2-- \
    -5---7--- ----457-- ---1---3- \
    --1----68 --85---1- -9----4--";

fn template() -> Puzzle {
    let mut puzzle = Puzzle::parse(HARD).unwrap();
    ConstraintPropagator::new().propagate(&mut puzzle);
    puzzle
}

fn sorted_population(size: usize) -> Vec<Puzzle> {
    let mut rng = SolverRng::new(42);
    let mut population = PopulationInitializer::new(template()).seed_population(size, &mut rng);
    FitnessEvaluator.evaluate_population(&mut population);
    population
}

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_population");

    for size in [100, 1000, 5000] {
        let mut population = sorted_population(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                FitnessEvaluator.evaluate_population(black_box(&mut population));
            });
        });
    }

    group.finish();
}

fn bench_breeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_generation");

    for size in [100, 1000, 5000] {
        let config = SolverConfig {
            population: size,
            ..Default::default()
        };
        let plan = BreedingPlan::from_config(&config);
        let population = sorted_population(size);
        let crossover = BreedingEngine::new(plan);
        let mutation = MutationEngine::new(plan);
        let mut rng = SolverRng::new(7);

        group.bench_with_input(BenchmarkId::new("crossover", size), &size, |b, _| {
            b.iter(|| crossover.next_generation(black_box(&population), 5, &mut rng));
        });
        group.bench_with_input(BenchmarkId::new("mutate_only", size), &size, |b, _| {
            b.iter(|| mutation.next_generation(black_box(&population), &mut rng));
        });
    }

    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let puzzle = Puzzle::parse(HARD).unwrap();
    let propagator = ConstraintPropagator::new();

    c.bench_function("propagate", |b| {
        b.iter(|| {
            let mut p = puzzle.clone();
            propagator.propagate(black_box(&mut p))
        });
    });
}

criterion_group!(benches, bench_fitness, bench_breeding, bench_propagation);
criterion_main!(benches);
