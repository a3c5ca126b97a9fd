//! The 81-cell puzzle grid, its text format and console rendering.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::layout::{CELLS, DIM, SUBDIM, col_cells, row_cells, subgrid_cells};
use super::square::Square;

/// Marker for an empty cell in the puzzle text format.
pub const BLANK: char = '-';

/// A 9x9 puzzle.
///
/// Each puzzle is an independent value; populations hold disjoint copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    squares: [Square; CELLS],
    /// Duplicate count over rows and columns. Lower is better, 0 is solved.
    pub fitness: u32,
    /// Preset squares per subgrid, cached once propagation has converged.
    pub subgrid_preset_counts: [u8; DIM],
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::blank()
    }
}

impl Puzzle {
    /// A puzzle with every square blank.
    pub fn blank() -> Self {
        Self {
            squares: [Square::blank(); CELLS],
            fitness: 0,
            subgrid_preset_counts: [0; DIM],
        }
    }

    /// Build a puzzle from 81 squares.
    pub fn from_squares(squares: [Square; CELLS]) -> Self {
        Self {
            squares,
            fitness: 0,
            subgrid_preset_counts: [0; DIM],
        }
    }

    /// Parse the text format (see [`FromStr`]).
    pub fn parse(code: &str) -> Result<Self, PuzzleError> {
        code.parse()
    }

    pub fn squares(&self) -> &[Square; CELLS] {
        &self.squares
    }

    pub fn square(&self, index: usize) -> &Square {
        &self.squares[index]
    }

    pub fn square_mut(&mut self, index: usize) -> &mut Square {
        &mut self.squares[index]
    }

    pub fn value(&self, index: usize) -> Option<u8> {
        self.squares[index].value
    }

    /// Set the value of a non-preset square. Returns `false` for presets.
    pub fn set_value(&mut self, index: usize, value: Option<u8>) -> bool {
        let square = &mut self.squares[index];
        if square.preset {
            return false;
        }
        square.value = value;
        true
    }

    /// Swap the values of two squares, leaving preset flags untouched.
    pub fn swap_values(&mut self, a: usize, b: usize) {
        let tmp = self.squares[a].value;
        self.squares[a].value = self.squares[b].value;
        self.squares[b].value = tmp;
    }

    fn values_at(&self, cells: [usize; DIM]) -> [Option<u8>; DIM] {
        cells.map(|i| self.squares[i].value)
    }

    pub fn row_values(&self, row: usize) -> [Option<u8>; DIM] {
        self.values_at(row_cells(row))
    }

    pub fn col_values(&self, col: usize) -> [Option<u8>; DIM] {
        self.values_at(col_cells(col))
    }

    pub fn subgrid_values(&self, subgrid: usize) -> [Option<u8>; DIM] {
        self.values_at(subgrid_cells(subgrid))
    }

    /// True if no square is blank.
    pub fn is_complete(&self) -> bool {
        self.squares.iter().all(|s| s.value.is_some())
    }

    pub fn blank_count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_blank()).count()
    }

    pub fn preset_count(&self) -> usize {
        self.squares.iter().filter(|s| s.preset).count()
    }

    /// Count preset squares in each subgrid.
    pub fn count_subgrid_presets(&self) -> [u8; DIM] {
        std::array::from_fn(|g| {
            subgrid_cells(g)
                .iter()
                .filter(|&&i| self.squares[i].preset)
                .count() as u8
        })
    }

    /// Compare cell values only (ignores fitness and caches).
    pub fn same_values(&self, other: &Puzzle) -> bool {
        self.squares
            .iter()
            .zip(other.squares.iter())
            .all(|(a, b)| a.value == b.value)
    }

    /// 81-character code: digits for filled cells, `-` for blanks.
    pub fn to_code(&self) -> String {
        self.squares.iter().map(Square::symbol_char).collect()
    }

    /// Render the grid for the console.
    ///
    /// Subgrids are separated by blank columns and rows. With
    /// `mark_duplicates`, each row is followed by one `*` per duplicate and a
    /// final line marks every column that contains a duplicate.
    pub fn render(&self, mark_duplicates: bool) -> String {
        let mut out = String::new();

        for row in 0..DIM {
            for (col, value) in self.row_values(row).iter().enumerate() {
                out.push(value.map_or(BLANK, |v| char::from(b'0' + v)));
                if (col + 1) % SUBDIM == 0 {
                    out.push_str("  ");
                }
            }
            if mark_duplicates {
                let dupes = duplicate_count(&self.row_values(row));
                out.extend(std::iter::repeat_n('*', dupes as usize));
            }
            out.push('\n');
            if (row + 1) % SUBDIM == 0 {
                out.push('\n');
            }
        }

        if mark_duplicates {
            for col in 0..DIM {
                let marker = if duplicate_count(&self.col_values(col)) > 0 {
                    '*'
                } else {
                    ' '
                };
                out.push(marker);
                if (col + 1) % SUBDIM == 0 {
                    out.push_str("  ");
                }
            }
            out.push('\n');
        }

        out
    }
}

/// Count duplicates in a group of nine values.
///
/// The first occurrence of each symbol is free; every later occurrence of the
/// same symbol counts once. Blanks are ignored.
pub fn duplicate_count(values: &[Option<u8>]) -> u32 {
    let mut seen = 0u16;
    let mut duplicates = 0;

    for value in values.iter().flatten() {
        let bit = 1u16 << (value - 1);
        if seen & bit != 0 {
            duplicates += 1;
        } else {
            seen |= bit;
        }
    }

    duplicates
}

impl FromStr for Puzzle {
    type Err = PuzzleError;

    /// Parse a whitespace-insensitive stream of exactly 81 tokens.
    ///
    /// Each non-whitespace character is one token: a digit 1-9 becomes a
    /// preset square, `-` a blank square.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut squares = [Square::blank(); CELLS];
        let mut count = 0;

        for token in s.chars().filter(|c| !c.is_whitespace()) {
            let square = match token {
                '1'..='9' => Square::given(token as u8 - b'0'),
                BLANK => Square::blank(),
                _ => {
                    return Err(PuzzleError::InvalidToken {
                        token,
                        position: count,
                    });
                }
            };
            if count < CELLS {
                squares[count] = square;
            }
            count += 1;
        }

        if count != CELLS {
            return Err(PuzzleError::WrongCellCount { found: count });
        }

        Ok(Self::from_squares(squares))
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl Serialize for Puzzle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Puzzle", 2)?;
        state.serialize_field("cells", &self.to_code())?;
        state.serialize_field("fitness", &self.fitness)?;
        state.end()
    }
}

/// Load a puzzle from a `.txt` file.
pub fn load_puzzle<P: AsRef<Path>>(path: P) -> Result<Puzzle, PuzzleError> {
    let path = path.as_ref();
    if path.extension().is_none_or(|e| e != "txt") {
        return Err(PuzzleError::UnsupportedExtension(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    content.parse()
}

/// Errors reading or parsing a puzzle. All of these are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("Failed to read puzzle: {0}")]
    Io(#[from] std::io::Error),
    #[error("Puzzle file must have a .txt extension: {0}")]
    UnsupportedExtension(String),
    #[error("Expected 81 cells, found {found}")]
    WrongCellCount { found: usize },
    #[error("Invalid token '{token}' at cell {position}")]
    InvalidToken { token: char, position: usize },
}
