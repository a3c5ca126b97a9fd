//! Producing the next generation: subgrid crossover, mutation and carry-over.
//!
//! Both operators exchange or swap values strictly inside a subgrid, so
//! every subgrid stays a permutation of the symbol set.

use rayon::prelude::*;

use crate::schema::layout::{CELLS, DIM, subgrid_cells, subgrid_of};
use crate::schema::{Puzzle, SolverConfig};

use super::rng::RandomSource;

/// Attempts to find two swappable squares before giving up.
pub const MUTATION_RETRIES: usize = 100;

/// A subgrid with more presets than this has fewer than two free squares.
pub const MAX_MUTABLE_PRESETS: u8 = 7;

/// Per-subgrid crossover mask: `true` exchanges that subgrid.
pub type CrossoverMask = [bool; DIM];

/// What a single mutation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Values of the two cells were swapped.
    Swapped(usize, usize),
    /// The chosen subgrid has fewer than two free squares.
    SubgridLocked(usize),
    /// No free pair was hit within [`MUTATION_RETRIES`] draws.
    RetriesExhausted(usize),
}

/// Swap two random non-preset values inside one random subgrid.
///
/// Skips without error when the subgrid is locked or no pair is found in
/// time. Preset squares are never modified.
pub fn mutate<R: RandomSource>(puzzle: &mut Puzzle, rng: &mut R) -> MutationOutcome {
    let subgrid = subgrid_of(rng.index(CELLS));
    if puzzle.subgrid_preset_counts[subgrid] > MAX_MUTABLE_PRESETS {
        return MutationOutcome::SubgridLocked(subgrid);
    }

    let cells = subgrid_cells(subgrid);
    for _ in 0..MUTATION_RETRIES {
        let a = cells[rng.index(DIM)];
        let b = cells[rng.index(DIM)];
        if a != b && !puzzle.square(a).preset && !puzzle.square(b).preset {
            puzzle.swap_values(a, b);
            return MutationOutcome::Swapped(a, b);
        }
    }

    MutationOutcome::RetriesExhausted(subgrid)
}

/// Draw a fair coin per subgrid.
pub fn random_mask<R: RandomSource>(rng: &mut R) -> CrossoverMask {
    std::array::from_fn(|_| rng.coin())
}

/// Exchange every masked subgrid between two puzzles in place.
///
/// Whole subgrids move, so values are only relocated and both puzzles keep
/// their per-subgrid permutations.
pub fn crossover(first: &mut Puzzle, second: &mut Puzzle, mask: &CrossoverMask) {
    for (subgrid, _) in mask.iter().enumerate().filter(|(_, swap)| **swap) {
        for index in subgrid_cells(subgrid) {
            std::mem::swap(first.square_mut(index), second.square_mut(index));
        }
    }
}

/// Sizes that shape one generation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreedingPlan {
    pub population: usize,
    pub breeders: usize,
    pub elitism: bool,
    pub elite: usize,
    pub lucky: usize,
}

impl BreedingPlan {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            population: config.population,
            breeders: config.breeders(),
            elitism: config.elitism,
            elite: config.elite(),
            lucky: config.lucky(),
        }
    }

    /// Copy the top breeders of a sorted population and shuffle them.
    fn breeding_pool<R: RandomSource>(&self, population: &[Puzzle], rng: &mut R) -> Vec<Puzzle> {
        let mut pool: Vec<Puzzle> = population
            .iter()
            .take(self.breeders.max(1))
            .cloned()
            .collect();
        rng.shuffle(&mut pool);
        pool
    }

    /// Append elite and lucky parents, then top up with the fittest parents
    /// if any slots remain.
    fn carry_over<R: RandomSource>(
        &self,
        next: &mut Vec<Puzzle>,
        parents: &[Puzzle],
        rng: &mut R,
    ) {
        if self.elitism {
            next.extend(parents.iter().take(self.elite).cloned());
            for _ in 0..self.lucky {
                let l = rng.index_outside_band(parents.len(), self.elite);
                next.push(parents[l].clone());
            }
        }

        let mut i = 0;
        while next.len() < self.population {
            next.push(parents[i % parents.len()].clone());
            i += 1;
        }
    }
}

/// Crossover mode: breeder pairs exchange subgrids.
#[derive(Debug, Clone)]
pub struct BreedingEngine {
    plan: BreedingPlan,
}

impl BreedingEngine {
    pub fn new(plan: BreedingPlan) -> Self {
        Self { plan }
    }

    /// Pairs `(current, previous)` of breeder pool indices.
    ///
    /// The first breeder pairs with the last one in range; every other
    /// breeder pairs with its predecessor. Indices wrap when the pool is
    /// smaller than the iteration bound.
    pub fn pairs(&self, pool_size: usize) -> Vec<(usize, usize)> {
        let half = self.plan.population / 2;
        let i_max = if self.plan.elitism {
            self.plan.breeders.min(half)
        } else {
            half
        }
        .max(1);

        std::iter::once((0, (i_max - 1) % pool_size))
            .chain((1..i_max).map(|i| (i % pool_size, (i - 1) % pool_size)))
            .collect()
    }

    /// Breed the next generation from a population sorted by fitness.
    pub fn next_generation<R>(
        &self,
        population: &[Puzzle],
        mutation_rate: i32,
        rng: &mut R,
    ) -> Vec<Puzzle>
    where
        R: RandomSource + Send,
    {
        let pool = self.plan.breeding_pool(population, rng);
        let tasks: Vec<((usize, usize), R)> = self
            .pairs(pool.len())
            .into_iter()
            .map(|pair| (pair, rng.fork()))
            .collect();

        let offspring: Vec<[Puzzle; 2]> = tasks
            .into_par_iter()
            .map(|((current, previous), mut task_rng)| {
                let mut first = pool[current].clone();
                let mut second = pool[previous].clone();

                let mask = random_mask(&mut task_rng);
                crossover(&mut first, &mut second, &mask);

                if task_rng.chance_percent(mutation_rate) {
                    mutate(&mut second, &mut task_rng);
                }
                if task_rng.chance_percent(mutation_rate) {
                    mutate(&mut first, &mut task_rng);
                }
                [first, second]
            })
            .collect();

        let mut next: Vec<Puzzle> = Vec::with_capacity(self.plan.population);
        next.extend(offspring.into_iter().flatten());
        self.plan.carry_over(&mut next, population, rng);
        next
    }
}

/// Mutate-only mode: offspring are mutated copies of breeders.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    plan: BreedingPlan,
}

impl MutationEngine {
    pub fn new(plan: BreedingPlan) -> Self {
        Self { plan }
    }

    /// Number of mutated offspring per generation.
    pub fn offspring_count(&self) -> usize {
        if self.plan.elitism {
            (2 * self.plan.breeders).min(self.plan.population)
        } else {
            self.plan.population
        }
    }

    /// Produce the next generation from a population sorted by fitness.
    ///
    /// The breeder pool is visited cyclically; each slot gets its own
    /// mutated copy.
    pub fn next_generation<R>(&self, population: &[Puzzle], rng: &mut R) -> Vec<Puzzle>
    where
        R: RandomSource + Send,
    {
        let pool = self.plan.breeding_pool(population, rng);
        let tasks: Vec<(usize, R)> = (0..self.offspring_count())
            .map(|i| (i % pool.len(), rng.fork()))
            .collect();

        let offspring: Vec<Puzzle> = tasks
            .into_par_iter()
            .map(|(b, mut task_rng)| {
                let mut child = pool[b].clone();
                mutate(&mut child, &mut task_rng);
                child
            })
            .collect();

        let mut next = Vec::with_capacity(self.plan.population);
        next.extend(offspring);
        self.plan.carry_over(&mut next, population, rng);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::FitnessEvaluator;
    use crate::compute::evolution::population::{PopulationInitializer, subgrids_are_permutations};
    use crate::compute::evolution::rng::SolverRng;
    use crate::compute::evolution::rng::testing::SequenceRng;
    use crate::compute::propagate::ConstraintPropagator;
    use proptest::prelude::*;

    const SOLVED: &str = "\
        534678912 672195348 198342567 \
        859761423 426853791 713924856 \
        961537284 287419635 345286179";

    // Propagation leaves most of this one blank.
    const PUZZLE: &str = "\
        8-------- --36----- -7--9-2-- \
        -5---7--- ----457-- ---1---3- \
        --1----68 --85---1- -9----4--";

    fn initializer() -> PopulationInitializer {
        let mut puzzle = Puzzle::parse(PUZZLE).unwrap();
        ConstraintPropagator::new().propagate(&mut puzzle);
        PopulationInitializer::new(puzzle)
    }

    /// Blank template: nothing preset, so every mutation can fire.
    fn open_initializer() -> PopulationInitializer {
        PopulationInitializer::new(Puzzle::blank())
    }

    fn sorted_population(size: usize, seed: u64) -> Vec<Puzzle> {
        let mut rng = SolverRng::new(seed);
        let mut population = initializer().seed_population(size, &mut rng);
        FitnessEvaluator.evaluate_population(&mut population);
        population
    }

    fn value_multiset(puzzles: &[&Puzzle]) -> Vec<Option<u8>> {
        let mut values: Vec<Option<u8>> = puzzles
            .iter()
            .flat_map(|p| p.squares().iter().map(|s| s.value))
            .collect();
        values.sort_unstable();
        values
    }

    fn open_population(size: usize, seed: u64) -> Vec<Puzzle> {
        open_initializer().seed_population(size, &mut SolverRng::new(seed))
    }

    fn swapped(puzzle: &Puzzle, a: usize, b: usize) -> Puzzle {
        let mut puzzle = puzzle.clone();
        puzzle.swap_values(a, b);
        puzzle
    }

    /// Cells whose values differ between two puzzles.
    fn differing_cells(a: &Puzzle, b: &Puzzle) -> Vec<usize> {
        (0..CELLS).filter(|&i| a.value(i) != b.value(i)).collect()
    }

    fn plan(population: usize, selection: f64, elitism: bool) -> BreedingPlan {
        BreedingPlan::from_config(&SolverConfig {
            population,
            selection,
            elitism,
            ..Default::default()
        })
    }

    /// Solved grid with its top row disturbed: columns 0-4 each hold a
    /// duplicate, fitness 5.
    fn top_row_disturbed() -> Puzzle {
        let mut puzzle = Puzzle::parse(SOLVED).unwrap();
        puzzle.swap_values(0, 1);
        puzzle.swap_values(1, 2);
        puzzle.swap_values(3, 4);
        puzzle
    }

    /// Same disturbance on the bottom row, fitness 5.
    fn bottom_row_disturbed() -> Puzzle {
        let mut puzzle = Puzzle::parse(SOLVED).unwrap();
        puzzle.swap_values(72, 73);
        puzzle.swap_values(73, 74);
        puzzle.swap_values(75, 76);
        puzzle
    }

    #[test]
    fn test_full_mask_swaps_wholesale() {
        let mut a = top_row_disturbed();
        let mut b = bottom_row_disturbed();
        FitnessEvaluator.score(&mut a);
        FitnessEvaluator.score(&mut b);
        assert_eq!((a.fitness, b.fitness), (5, 5));
        assert!(!a.same_values(&b));
        let (orig_a, orig_b) = (a.clone(), b.clone());

        crossover(&mut a, &mut b, &[true; DIM]);
        assert!(a.same_values(&orig_b));
        assert!(b.same_values(&orig_a));

        FitnessEvaluator.score(&mut a);
        FitnessEvaluator.score(&mut b);
        assert_eq!(a.fitness, orig_b.fitness);
        assert_eq!(b.fitness, orig_a.fitness);
    }

    #[test]
    fn test_empty_mask_is_identity() {
        let init = open_initializer();
        let mut rng = SolverRng::new(6);
        let mut a = init.random_member(&mut rng);
        let mut b = init.random_member(&mut rng);
        let (orig_a, orig_b) = (a.clone(), b.clone());

        crossover(&mut a, &mut b, &[false; DIM]);
        assert!(a.same_values(&orig_a));
        assert!(b.same_values(&orig_b));
    }

    #[test]
    fn test_partial_mask_moves_only_masked_subgrids() {
        let init = open_initializer();
        let mut rng = SolverRng::new(8);
        let mut a = init.random_member(&mut rng);
        let mut b = init.random_member(&mut rng);
        let (orig_a, orig_b) = (a.clone(), b.clone());

        let mut mask = [false; DIM];
        mask[4] = true;
        crossover(&mut a, &mut b, &mask);

        for g in 0..DIM {
            if g == 4 {
                assert_eq!(a.subgrid_values(g), orig_b.subgrid_values(g));
                assert_eq!(b.subgrid_values(g), orig_a.subgrid_values(g));
            } else {
                assert_eq!(a.subgrid_values(g), orig_a.subgrid_values(g));
                assert_eq!(b.subgrid_values(g), orig_b.subgrid_values(g));
            }
        }
    }

    #[test]
    fn test_mutate_skips_locked_subgrid() {
        let solved = Puzzle::parse(
            "534678912672195348198342567859761423426853791713924856961537284287419635345286179",
        )
        .unwrap();
        let mut puzzle = solved.clone();
        puzzle.subgrid_preset_counts = puzzle.count_subgrid_presets();

        let outcome = mutate(&mut puzzle, &mut SolverRng::new(1));
        assert!(matches!(outcome, MutationOutcome::SubgridLocked(_)));
        assert!(puzzle.same_values(&solved));
    }

    #[test]
    fn test_mutate_swaps_scripted_cells() {
        let mut puzzle = open_initializer().random_member(&mut SolverRng::new(2));
        let before = puzzle.clone();

        // Cell 40 selects subgrid 4; positions 0 and 8 are cells 30 and 50.
        let mut rng = SequenceRng::new(&[40, 0, 8], &[]);
        assert_eq!(mutate(&mut puzzle, &mut rng), MutationOutcome::Swapped(30, 50));
        assert_eq!(puzzle.value(30), before.value(50));
        assert_eq!(puzzle.value(50), before.value(30));
    }

    #[test]
    fn test_mutate_gives_up_after_retries() {
        let mut puzzle = open_initializer().random_member(&mut SolverRng::new(4));
        let before = puzzle.clone();

        // Every draw after the cell picks position 0 twice: never a pair.
        let mut rng = SequenceRng::new(&[0], &[]);
        assert_eq!(
            mutate(&mut puzzle, &mut rng),
            MutationOutcome::RetriesExhausted(0)
        );
        assert!(puzzle.same_values(&before));
    }

    #[test]
    fn test_pairs_layout() {
        let engine = BreedingEngine::new(plan(20, 0.2, true));
        // breeders = 4, i_max = min(4, 10) = 4
        assert_eq!(engine.pairs(4), vec![(0, 3), (1, 0), (2, 1), (3, 2)]);

        // Without elitism i_max is POP / 2 and indices wrap over the pool.
        let engine = BreedingEngine::new(plan(20, 0.2, false));
        let pairs = engine.pairs(4);
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[0], (0, 1));
        assert_eq!(pairs[5], (1, 0));
        assert!(pairs.iter().all(|&(a, b)| a < 4 && b < 4));
    }

    #[test]
    fn test_breeding_keeps_population_size() {
        for (size, selection, elitism) in [
            (40, 0.4, true),
            (40, 0.6, true),
            (41, 0.6, true),
            (40, 0.1, false),
            (7, 0.0, true),
        ] {
            let population = sorted_population(size, 3);
            let engine = BreedingEngine::new(plan(size, selection, elitism));
            let next = engine.next_generation(&population, 50, &mut SolverRng::new(1));
            assert_eq!(next.len(), size, "size {} selection {}", size, selection);
            assert!(next.iter().all(subgrids_are_permutations));
        }
    }

    #[test]
    fn test_elites_carried_over_unchanged() {
        let population = sorted_population(50, 12);
        let plan = plan(50, 0.2, true);
        assert_eq!((plan.breeders, plan.elite, plan.lucky), (10, 27, 3));

        let engine = BreedingEngine::new(plan);
        let next = engine.next_generation(&population, 100, &mut SolverRng::new(3));

        let offspring = 2 * plan.breeders;
        for e in 0..plan.elite {
            assert!(next[offspring + e].same_values(&population[e]));
        }
        for lucky in &next[offspring + plan.elite..] {
            assert!(
                population[plan.elite..]
                    .iter()
                    .any(|p| p.same_values(lucky))
            );
        }
    }

    #[test]
    fn test_mutation_engine_sizes() {
        let population = sorted_population(30, 21);

        let engine = MutationEngine::new(plan(30, 0.2, true));
        assert_eq!(engine.offspring_count(), 12);
        let next = engine.next_generation(&population, &mut SolverRng::new(2));
        assert_eq!(next.len(), 30);
        assert!(next.iter().all(subgrids_are_permutations));

        let engine = MutationEngine::new(plan(30, 0.2, false));
        assert_eq!(engine.offspring_count(), 30);
        let next = engine.next_generation(&population, &mut SolverRng::new(2));
        assert_eq!(next.len(), 30);
    }

    #[test]
    fn test_crossover_pairs_follow_shuffled_pool() {
        let population = open_population(8, 31);
        let plan = plan(8, 0.5, true);
        assert_eq!((plan.breeders, plan.elite, plan.lucky), (4, 0, 0));

        // Shuffle draws 1, 0, 0: the pool becomes [p3, p2, p0, p1]. Every
        // later coin is heads, so each pair swaps all nine subgrids.
        let mut rng = SequenceRng::new(&[1, 0, 0], &[]);
        let next = BreedingEngine::new(plan).next_generation(&population, 0, &mut rng);
        let pool = [&population[3], &population[2], &population[0], &population[1]];

        assert_eq!(next.len(), 8);
        assert!(next[0].same_values(pool[3]));
        assert!(next[1].same_values(pool[0]));
        for i in 1..4 {
            assert!(next[2 * i].same_values(pool[i - 1]), "slot {}", 2 * i);
            assert!(next[2 * i + 1].same_values(pool[i]), "slot {}", 2 * i + 1);
        }
    }

    #[test]
    fn test_crossover_mask_applies_per_subgrid() {
        let population = open_population(8, 32);
        let mut coins = vec![false; DIM];
        coins[0] = true;

        // Identity shuffle, then every pair swaps subgrid 0 only.
        let mut rng = SequenceRng::new(&[3, 2, 1], &coins);
        let next =
            BreedingEngine::new(plan(8, 0.5, true)).next_generation(&population, 0, &mut rng);

        let pairs = [(0, 3), (1, 0), (2, 1), (3, 2)];
        for (slot, &(current, previous)) in pairs.iter().enumerate() {
            let first = &next[2 * slot];
            let second = &next[2 * slot + 1];
            assert_eq!(first.subgrid_values(0), population[previous].subgrid_values(0));
            assert_eq!(second.subgrid_values(0), population[current].subgrid_values(0));
            for g in 1..DIM {
                assert_eq!(first.subgrid_values(g), population[current].subgrid_values(g));
                assert_eq!(second.subgrid_values(g), population[previous].subgrid_values(g));
            }
        }
    }

    #[test]
    fn test_mutation_rate_gates_offspring_mutation() {
        let population = open_population(8, 33);
        let engine = BreedingEngine::new(plan(8, 0.5, true));
        let pairs = [(0, 3), (1, 0), (2, 1), (3, 2)];

        // Identity shuffle; each task then rolls 0 on the mutation chance,
        // swaps cells 30 and 50 of the second child, rolls 0 again and
        // swaps cells 31 and 49 of the first child.
        let script = [3, 2, 1, 0, 40, 0, 8, 0, 40, 1, 7];

        let unmutated = engine.next_generation(&population, 0, &mut SequenceRng::new(&script, &[]));
        let mutated = engine.next_generation(&population, 100, &mut SequenceRng::new(&script, &[]));

        for (slot, &(current, previous)) in pairs.iter().enumerate() {
            assert!(unmutated[2 * slot].same_values(&population[previous]));
            assert!(unmutated[2 * slot + 1].same_values(&population[current]));

            let first = swapped(&population[previous], 31, 49);
            let second = swapped(&population[current], 30, 50);
            assert!(mutated[2 * slot].same_values(&first));
            assert!(mutated[2 * slot + 1].same_values(&second));
            assert_eq!(differing_cells(&mutated[2 * slot], &unmutated[2 * slot]), vec![31, 49]);
            assert_eq!(
                differing_cells(&mutated[2 * slot + 1], &unmutated[2 * slot + 1]),
                vec![30, 50]
            );
        }
    }

    #[test]
    fn test_mutate_only_children_swap_once() {
        let population = open_population(6, 34);
        let engine = MutationEngine::new(plan(6, 0.5, true));
        assert_eq!(engine.offspring_count(), 6);

        // Identity shuffle over three breeders, then each task swaps cells
        // 30 and 50 of its copy.
        let mut rng = SequenceRng::new(&[2, 1, 40, 0, 8], &[]);
        let next = engine.next_generation(&population, &mut rng);

        assert_eq!(next.len(), 6);
        for (i, child) in next.iter().enumerate() {
            let parent = &population[i % 3];
            assert!(child.same_values(&swapped(parent, 30, 50)), "child {}", i);

            let changed = differing_cells(child, parent);
            assert_eq!(changed, vec![30, 50]);
            assert_eq!(subgrid_of(changed[0]), subgrid_of(changed[1]));
        }
    }

    #[test]
    fn test_mutate_only_children_differ_by_one_swap() {
        let population = open_population(6, 35);
        let next =
            MutationEngine::new(plan(6, 0.5, true)).next_generation(&population, &mut SolverRng::new(8));

        for child in &next {
            // Some breeder differs from the child by one swap within a subgrid.
            let parent_found = population[..3].iter().any(|parent| {
                let changed = differing_cells(child, parent);
                changed.len() == 2
                    && subgrid_of(changed[0]) == subgrid_of(changed[1])
                    && swapped(parent, changed[0], changed[1]).same_values(child)
            });
            assert!(parent_found);
        }
    }

    proptest! {
        #[test]
        fn prop_crossover_conserves_values(seed in any::<u64>()) {
            let init = initializer();
            let mut rng = SolverRng::new(seed);
            let mut a = init.random_member(&mut rng);
            let mut b = init.random_member(&mut rng);
            let before = value_multiset(&[&a, &b]);

            let mask = random_mask(&mut rng);
            crossover(&mut a, &mut b, &mask);

            prop_assert_eq!(value_multiset(&[&a, &b]), before);
            prop_assert!(subgrids_are_permutations(&a));
            prop_assert!(subgrids_are_permutations(&b));
        }

        #[test]
        fn prop_mutation_never_touches_presets(seed in any::<u64>(), rounds in 1usize..200) {
            let init = initializer();
            let mut rng = SolverRng::new(seed);
            let template = init.template().clone();
            let mut puzzle = init.random_member(&mut rng);

            for _ in 0..rounds {
                mutate(&mut puzzle, &mut rng);
            }

            for index in 0..CELLS {
                let square = template.square(index);
                if square.preset {
                    prop_assert_eq!(puzzle.value(index), square.value);
                }
            }
            prop_assert!(subgrids_are_permutations(&puzzle));
        }

        #[test]
        fn prop_generation_size_invariant(
            seed in any::<u64>(),
            size in 4usize..60,
            selection in 0.0f64..1.0,
            elitism in any::<bool>(),
            mutate_only in any::<bool>(),
        ) {
            let population = sorted_population(size, seed);
            let plan = plan(size, selection, elitism);
            let mut rng = SolverRng::new(seed);

            let next = if mutate_only {
                MutationEngine::new(plan).next_generation(&population, &mut rng)
            } else {
                BreedingEngine::new(plan).next_generation(&population, 20, &mut rng)
            };
            prop_assert_eq!(next.len(), size);
        }
    }
}
