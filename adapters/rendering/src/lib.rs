#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering of the battlefield for console adapters.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use beatback_core::{CellCoord, Grid};
use beatback_world::Battlefield;

/// Width of a single rendered cell between separators.
const CELL_WIDTH: usize = 3;

/// Highlighted squares drawn on top of the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Destinations the selected unit can move to.
    Move(Grid<bool>),
    /// Squares the selected unit can attack.
    Attack(Grid<bool>),
}

impl Overlay {
    /// Character prefixed to every highlighted cell.
    #[must_use]
    pub const fn marker(&self) -> char {
        match self {
            Self::Move(_) => '.',
            Self::Attack(_) => '*',
        }
    }

    /// Mask of highlighted squares.
    #[must_use]
    pub const fn mask(&self) -> &Grid<bool> {
        match self {
            Self::Move(mask) | Self::Attack(mask) => mask,
        }
    }

    fn highlights(&self, cell: CellCoord) -> bool {
        let mask = self.mask();
        mask.in_bounds(cell) && mask[cell]
    }
}

/// Renders the battlefield, optionally highlighting an overlay, into a string.
///
/// The layout is a column-index header followed by one boxed row per
/// battlefield row. Units are drawn over terrain.
#[must_use]
pub fn render_field(field: &Battlefield, overlay: Option<&Overlay>) -> String {
    FieldView { field, overlay }.to_string()
}

/// Writes the rendered battlefield to `writer` and flushes it.
pub fn write_field<W: Write>(
    writer: &mut W,
    field: &Battlefield,
    overlay: Option<&Overlay>,
) -> AnyResult<()> {
    write!(writer, "{}", FieldView { field, overlay }).context("failed to draw battlefield")?;
    writer.flush().context("failed to flush battlefield output")?;
    Ok(())
}

struct FieldView<'a> {
    field: &'a Battlefield,
    overlay: Option<&'a Overlay>,
}

impl FieldView<'_> {
    fn separator(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("  ")?;
        for _ in 0..self.field.width() {
            f.write_str("+---")?;
        }
        f.write_str("+\n")
    }

    fn cell(&self, f: &mut fmt::Formatter<'_>, cell: CellCoord) -> fmt::Result {
        let mut width = CELL_WIDTH;
        if let Some(overlay) = self.overlay.filter(|overlay| overlay.highlights(cell)) {
            write!(f, "{}", overlay.marker())?;
            width -= 1;
        }

        let mut buffer = [0; 4];
        let symbol = match self.field.unit(cell) {
            Some(unit) => &*unit.symbol().encode_utf8(&mut buffer),
            None => self.field.terrain(cell).symbol(),
        };
        write!(f, "{symbol:>width$}")
    }
}

impl fmt::Display for FieldView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\n  ")?;
        for column in 0..self.field.width() {
            write!(f, "{column:>3} ")?;
        }
        f.write_str("\n")?;

        self.separator(f)?;
        for row in 0..self.field.height() {
            write!(f, "{row:>2}")?;
            for column in 0..self.field.width() {
                f.write_str("|")?;
                self.cell(f, CellCoord::new(row, column))?;
            }
            f.write_str("|\n")?;
            self.separator(f)?;
        }
        f.write_str("\n")
    }
}
