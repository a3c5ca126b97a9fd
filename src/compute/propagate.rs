//! Deterministic single filling run once before the genetic search.
//!
//! Naked singles are squares with exactly one remaining candidate. Hidden
//! singles are symbols with exactly one legal square in a row, column or
//! subgrid. Filled squares are marked preset so the GA never touches them.

use crate::schema::layout::{CELLS, DIM, col_cells, peers, row_cells, subgrid_cells};
use crate::schema::{CandidateSet, PropagationStats, Puzzle};

/// Where a symbol can go within one group of nine squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinglePosition {
    /// No blank square in the group accepts the symbol.
    NoPosition,
    /// Exactly one square accepts it (linear cell index).
    UniquePosition(usize),
    /// More than one square accepts it, or the group already holds it.
    Ambiguous,
}

/// Fills naked and hidden singles until a fixpoint is reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintPropagator;

impl ConstraintPropagator {
    pub fn new() -> Self {
        Self
    }

    /// Run naked and hidden passes alternately until neither changes the
    /// puzzle, then cache the preset count of every subgrid.
    pub fn propagate(&self, puzzle: &mut Puzzle) -> PropagationStats {
        let mut stats = PropagationStats::default();

        loop {
            let naked = self.fill_naked_singles(puzzle);
            let hidden = self.fill_hidden_singles(puzzle);
            stats.naked_singles += naked;
            stats.hidden_singles += hidden;
            stats.rounds += 1;

            if naked == 0 && hidden == 0 {
                break;
            }
        }

        puzzle.subgrid_preset_counts = puzzle.count_subgrid_presets();

        log::debug!(
            "Propagation converged after {} rounds: {} naked, {} hidden singles",
            stats.rounds,
            stats.naked_singles,
            stats.hidden_singles
        );

        stats
    }

    /// Recompute every square's candidate set from scratch.
    ///
    /// A symbol present anywhere in a blank square's row, column or subgrid
    /// is not a candidate. Filled squares have no candidates.
    pub fn evaluate_candidates(&self, puzzle: &mut Puzzle) {
        for index in 0..CELLS {
            let possible = if puzzle.square(index).is_blank() {
                let mut set = CandidateSet::full();
                for peer in peers(index) {
                    if let Some(v) = puzzle.value(peer) {
                        set.remove(v);
                    }
                }
                set
            } else {
                CandidateSet::empty()
            };
            puzzle.square_mut(index).possible = possible;
        }
    }

    /// Fill every blank square that has a single candidate, rescanning until
    /// a scan fills nothing. Returns the number of squares filled.
    pub fn fill_naked_singles(&self, puzzle: &mut Puzzle) -> usize {
        let mut filled = 0;

        loop {
            self.evaluate_candidates(puzzle);
            let mut changed = false;

            for index in 0..CELLS {
                let square = puzzle.square(index);
                if !square.is_blank() {
                    continue;
                }
                if let Some(symbol) = square.possible.single()
                    && can_place(puzzle, index, symbol)
                {
                    puzzle.square_mut(index).fix(symbol);
                    filled += 1;
                    changed = true;
                }
            }

            if !changed {
                return filled;
            }
        }
    }

    /// Fill every symbol that has exactly one legal square in some row,
    /// column or subgrid, rescanning until a scan fills nothing. Returns the
    /// number of squares filled.
    pub fn fill_hidden_singles(&self, puzzle: &mut Puzzle) -> usize {
        let mut filled = 0;

        loop {
            self.evaluate_candidates(puzzle);
            let mut changed = false;

            for symbol in 1..=DIM as u8 {
                let groups = (0..DIM)
                    .map(row_cells)
                    .chain((0..DIM).map(col_cells))
                    .chain((0..DIM).map(subgrid_cells));

                for cells in groups {
                    if let SinglePosition::UniquePosition(index) =
                        find_single_position(puzzle, &cells, symbol)
                        && can_place(puzzle, index, symbol)
                    {
                        puzzle.square_mut(index).fix(symbol);
                        filled += 1;
                        changed = true;
                    }
                }
            }

            if !changed {
                return filled;
            }
        }
    }
}

/// Count the squares of a group that could hold `symbol`.
///
/// Stops early as soon as a second legal square is seen or the symbol is
/// found already placed in the group.
pub fn find_single_position(puzzle: &Puzzle, cells: &[usize; DIM], symbol: u8) -> SinglePosition {
    let mut position = SinglePosition::NoPosition;

    for &index in cells {
        let square = puzzle.square(index);
        match square.value {
            Some(v) if v == symbol => return SinglePosition::Ambiguous,
            Some(_) => {}
            None if square.possible.contains(symbol) => {
                if position != SinglePosition::NoPosition {
                    return SinglePosition::Ambiguous;
                }
                position = SinglePosition::UniquePosition(index);
            }
            None => {}
        }
    }

    position
}

/// Candidate sets go stale within a scan; recheck peers before filling.
fn can_place(puzzle: &Puzzle, index: usize, symbol: u8) -> bool {
    peers(index).all(|peer| puzzle.value(peer) != Some(symbol))
}
