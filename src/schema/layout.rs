//! Index mapping for the 9x9 grid.
//!
//! Cells are stored row-major. Subgrids are numbered row-major as well, so
//! subgrid `g` covers rows `3 * (g / 3)..3 * (g / 3) + 3` and columns
//! `3 * (g % 3)..3 * (g % 3) + 3`.

/// Side length of the grid.
pub const DIM: usize = 9;

/// Side length of a subgrid.
pub const SUBDIM: usize = 3;

/// Total number of cells.
pub const CELLS: usize = DIM * DIM;

/// Linear index of the cell at `(row, col)`.
#[inline]
pub const fn cell_index(row: usize, col: usize) -> usize {
    row * DIM + col
}

/// Row containing a linear index.
#[inline]
pub const fn row_of(index: usize) -> usize {
    index / DIM
}

/// Column containing a linear index.
#[inline]
pub const fn col_of(index: usize) -> usize {
    index % DIM
}

/// Subgrid containing a linear index.
#[inline]
pub const fn subgrid_of(index: usize) -> usize {
    (row_of(index) / SUBDIM) * SUBDIM + col_of(index) / SUBDIM
}

/// Linear index of the top-left cell of a subgrid.
#[inline]
pub const fn subgrid_origin(subgrid: usize) -> usize {
    cell_index((subgrid / SUBDIM) * SUBDIM, (subgrid % SUBDIM) * SUBDIM)
}

/// Cells of a row, left to right.
pub fn row_cells(row: usize) -> [usize; DIM] {
    std::array::from_fn(|i| cell_index(row, i))
}

/// Cells of a column, top to bottom.
pub fn col_cells(col: usize) -> [usize; DIM] {
    std::array::from_fn(|i| cell_index(i, col))
}

/// Cells of a subgrid, row-major within the subgrid.
pub fn subgrid_cells(subgrid: usize) -> [usize; DIM] {
    let origin = subgrid_origin(subgrid);
    std::array::from_fn(|i| origin + (i / SUBDIM) * DIM + i % SUBDIM)
}

/// All cells sharing a row, column or subgrid with `index` (excluding it).
pub fn peers(index: usize) -> impl Iterator<Item = usize> {
    let row = row_cells(row_of(index));
    let col = col_cells(col_of(index));
    let sub = subgrid_cells(subgrid_of(index));
    let (r, c) = (row_of(index), col_of(index));

    row.into_iter()
        .chain(col)
        // Subgrid cells sharing the row or column are already covered.
        .chain(
            sub.into_iter()
                .filter(move |&i| row_of(i) != r && col_of(i) != c),
        )
        .filter(move |&i| i != index)
}
