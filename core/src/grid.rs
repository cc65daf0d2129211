//! Dense two-dimensional storage shared by every battlefield layer.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, Direction};

/// Reasons a grid could not be assembled from caller-provided rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// A row did not hold as many cells as the first row.
    #[error("row {row} holds {found} cells but the grid expects {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Number of cells held by the first row.
        expected: u32,
        /// Number of cells held by the offending row.
        found: u32,
    },
    /// The provided rows exceed the addressable coordinate range.
    #[error("grid dimensions exceed the addressable coordinate range")]
    TooLarge,
    /// Serialized cells did not fill the announced dimensions exactly.
    #[error("grid of {rows}x{columns} needs {expected} cells but holds {found}")]
    CellCountMismatch {
        /// Announced number of rows.
        rows: u32,
        /// Announced number of columns.
        columns: u32,
        /// Cells required by the dimensions.
        expected: u64,
        /// Cells actually provided.
        found: u64,
    },
}

/// Rectangular mapping from cell coordinates to values of type `T`.
///
/// Values are stored densely in row-major order. The dimensions are fixed at
/// construction, so every row always holds the same number of cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Grid<T> {
    rows: u32,
    columns: u32,
    cells: Vec<T>,
}

/// Unchecked wire form of a grid, validated before it becomes a `Grid`.
#[derive(Deserialize)]
struct RawGrid<T> {
    rows: u32,
    columns: u32,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        let expected = u64::from(raw.rows) * u64::from(raw.columns);
        let found = u64::try_from(raw.cells.len()).unwrap_or(u64::MAX);
        if found != expected {
            return Err(GridError::CellCountMismatch {
                rows: raw.rows,
                columns: raw.columns,
                expected,
                found,
            });
        }

        Ok(Self {
            rows: raw.rows,
            columns: raw.columns,
            cells: raw.cells,
        })
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid where every cell holds a copy of `value`.
    #[must_use]
    pub fn filled(rows: u32, columns: u32, value: T) -> Self {
        Self {
            rows,
            columns,
            cells: vec![value; cell_count(rows, columns)],
        }
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a grid where every cell holds `T::default()`.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        Self::filled(rows, columns, T::default())
    }
}

impl<T> Grid<T> {
    /// Assembles a grid from explicit rows, rejecting rows of unequal length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        let width = rows.first().map_or(0, Vec::len);
        let column_count = u32::try_from(width).map_err(|_| GridError::TooLarge)?;

        let mut cells = Vec::with_capacity(cell_count(row_count, column_count));
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: u32::try_from(index).map_err(|_| GridError::TooLarge)?,
                    expected: column_count,
                    found: u32::try_from(row.len()).unwrap_or(u32::MAX),
                });
            }
            cells.extend(row);
        }

        Ok(Self {
            rows: row_count,
            columns: column_count,
            cells,
        })
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Returns the value stored at `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> &T {
        let index = self.expect_index(cell);
        &self.cells[index]
    }

    /// Returns a mutable reference to the value stored at `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn get_mut(&mut self, cell: CellCoord) -> &mut T {
        let index = self.expect_index(cell);
        &mut self.cells[index]
    }

    /// Replaces the value stored at `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn set(&mut self, cell: CellCoord, value: T) {
        *self.get_mut(cell) = value;
    }

    /// Neighbouring cell one step away in `direction`, if it lies inside the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|candidate| self.in_bounds(*candidate))
    }

    /// Lazily enumerates every coordinate of the grid in row-major order.
    ///
    /// The returned iterator is finite and may be cloned to restart the walk.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.rows, self.columns)
    }

    /// Iterates over the stored values in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Iterates mutably over the stored values in row-major order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.cells.iter_mut()
    }

    /// Iterates over coordinates paired with their values in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (CellCoord, &T)> {
        self.coordinates().zip(self.cells.iter())
    }

    /// Builds a grid of identical dimensions by transforming every value.
    #[must_use]
    pub fn map<U, F>(&self, transform: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            rows: self.rows,
            columns: self.columns,
            cells: self.cells.iter().map(transform).collect(),
        }
    }

    fn expect_index(&self, cell: CellCoord) -> usize {
        assert!(
            self.in_bounds(cell),
            "cell ({}, {}) lies outside the {}x{} grid",
            cell.row(),
            cell.column(),
            self.rows,
            self.columns
        );
        let row = cell.row() as usize;
        let column = cell.column() as usize;
        row * self.columns as usize + column
    }
}

impl Grid<bool> {
    /// Number of cells set to `true`.
    #[must_use]
    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|value| **value).count()
    }

    /// Coordinates of every cell set to `true`, in row-major order.
    pub fn marked(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.enumerate().filter_map(|(cell, value)| value.then_some(cell))
    }
}

impl<T> Index<CellCoord> for Grid<T> {
    type Output = T;

    fn index(&self, cell: CellCoord) -> &Self::Output {
        self.get(cell)
    }
}

impl<T> IndexMut<CellCoord> for Grid<T> {
    fn index_mut(&mut self, cell: CellCoord) -> &mut Self::Output {
        self.get_mut(cell)
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (cell, value) in self.enumerate() {
            if cell.column() > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
            if cell.column() + 1 == self.columns {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

/// Row-major walk over every coordinate of a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinates {
    columns: u32,
    total: u64,
    cursor: u64,
}

impl Coordinates {
    fn new(rows: u32, columns: u32) -> Self {
        Self {
            columns,
            total: u64::from(rows) * u64::from(columns),
            cursor: 0,
        }
    }
}

impl Iterator for Coordinates {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.total {
            return None;
        }

        let columns = u64::from(self.columns);
        let row = u32::try_from(self.cursor / columns).ok()?;
        let column = u32::try_from(self.cursor % columns).ok()?;
        self.cursor += 1;
        Some(CellCoord::new(row, column))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.total - self.cursor).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Coordinates {}

fn cell_count(rows: u32, columns: u32) -> usize {
    let count = u64::from(rows) * u64::from(columns);
    usize::try_from(count).unwrap_or(usize::MAX)
}
