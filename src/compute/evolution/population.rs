//! Initial population generation.

use crate::schema::Puzzle;
use crate::schema::layout::{DIM, subgrid_cells};

use super::rng::RandomSource;

/// Seeds populations from the propagated puzzle.
///
/// Every produced puzzle keeps the presets of the template and fills the
/// remaining squares of each subgrid with a random permutation of the
/// symbols that subgrid is missing. Subgrids are therefore duplicate-free
/// and all fitness violations live in rows and columns.
#[derive(Debug, Clone)]
pub struct PopulationInitializer {
    template: Puzzle,
}

impl PopulationInitializer {
    /// Create from the propagated puzzle.
    pub fn new(template: Puzzle) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &Puzzle {
        &self.template
    }

    /// Produce `size` independent puzzles.
    pub fn seed_population<R: RandomSource>(&self, size: usize, rng: &mut R) -> Vec<Puzzle> {
        (0..size).map(|_| self.random_member(rng)).collect()
    }

    /// One puzzle with every subgrid completed to a permutation.
    pub fn random_member<R: RandomSource>(&self, rng: &mut R) -> Puzzle {
        let mut puzzle = self.template.clone();
        for g in 0..DIM {
            fill_subgrid(&mut puzzle, g, rng);
        }
        puzzle
    }
}

/// Fill the blank squares of a subgrid with a shuffle of its missing symbols.
fn fill_subgrid<R: RandomSource>(puzzle: &mut Puzzle, subgrid: usize, rng: &mut R) {
    let cells = subgrid_cells(subgrid);

    let mut present = [false; DIM];
    for v in puzzle.subgrid_values(subgrid).into_iter().flatten() {
        present[(v - 1) as usize] = true;
    }
    let mut missing: Vec<u8> = (1..=DIM as u8)
        .filter(|v| !present[(v - 1) as usize])
        .collect();
    rng.shuffle(&mut missing);

    for index in cells {
        if puzzle.square(index).is_blank()
            && let Some(v) = missing.pop()
        {
            puzzle.set_value(index, Some(v));
        }
    }
}

/// True if every subgrid holds each symbol exactly once.
pub fn subgrids_are_permutations(puzzle: &Puzzle) -> bool {
    (0..DIM).all(|g| {
        let mut seen = [false; DIM];
        puzzle.subgrid_values(g).into_iter().all(|v| match v {
            Some(v) if !seen[(v - 1) as usize] => {
                seen[(v - 1) as usize] = true;
                true
            }
            _ => false,
        })
    })
}
