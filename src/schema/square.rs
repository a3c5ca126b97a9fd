//! Single-cell model: value, preset flag and candidate set.

use serde::{Deserialize, Serialize};

use super::layout::DIM;

/// Set of candidate symbols (1-9) stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidateSet(u16);

impl CandidateSet {
    const FULL: u16 = (1 << DIM) - 1;

    /// Set containing every symbol.
    pub const fn full() -> Self {
        Self(Self::FULL)
    }

    /// Set containing no symbol.
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    fn bit(symbol: u8) -> u16 {
        debug_assert!((1..=DIM as u8).contains(&symbol));
        1 << (symbol - 1)
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.0 & Self::bit(symbol) != 0
    }

    pub fn insert(&mut self, symbol: u8) {
        self.0 |= Self::bit(symbol);
    }

    pub fn remove(&mut self, symbol: u8) {
        self.0 &= !Self::bit(symbol);
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The only remaining symbol, if exactly one is left.
    pub fn single(&self) -> Option<u8> {
        (self.len() == 1).then(|| self.0.trailing_zeros() as u8 + 1)
    }

    /// Iterate symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=DIM as u8).filter(move |&s| self.contains(s))
    }
}

/// One square of the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Square {
    /// Symbol in the square, `None` when blank.
    pub value: Option<u8>,
    /// Fixed by the input puzzle or by propagation. Never changed by the GA.
    pub preset: bool,
    /// Remaining candidates. Only meaningful during propagation.
    pub possible: CandidateSet,
}

impl Square {
    /// A blank square with every symbol still possible.
    pub fn blank() -> Self {
        Self {
            value: None,
            preset: false,
            possible: CandidateSet::full(),
        }
    }

    /// A square fixed to `symbol` by the input puzzle.
    pub fn given(symbol: u8) -> Self {
        Self {
            value: Some(symbol),
            preset: true,
            possible: CandidateSet::empty(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_none()
    }

    /// Fix the square to `symbol` and mark it preset.
    pub fn fix(&mut self, symbol: u8) {
        self.value = Some(symbol);
        self.preset = true;
        self.possible = CandidateSet::empty();
    }

    /// Character used in the puzzle code and console rendering.
    pub fn symbol_char(&self) -> char {
        match self.value {
            Some(v) => char::from(b'0' + v),
            None => '-',
        }
    }
}
