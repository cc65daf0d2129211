//! Loader for whitespace-separated battle map files.
//!
//! A map starts with the terrain and unit entry counts, followed by that many
//! `row column code` terrain entries and then unit entries.
//!
//! Unit codes choose their side by letter case: `B` is a player bee and `b`
//! an enemy bee. Older maps that relied on the unit kind alone, where only
//! soldiers and tanks belonged to the player, must lower-case their enemy
//! entries to load the same way.

use std::{fs, io, path::Path, path::PathBuf, str::SplitWhitespace};

use beatback_core::{CellCoord, TerrainKind, UnitKind};
use beatback_world::Battlefield;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons a map could not be loaded.
#[derive(Debug, Error)]
pub(crate) enum MapError {
    /// The map file could not be read.
    #[error("failed to read map file {}", path.display())]
    Io {
        /// Path of the map file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The map ended before every announced entry was read.
    #[error("map ended while reading {expected}")]
    UnexpectedEnd {
        /// Description of the missing value.
        expected: &'static str,
    },
    /// A numeric field did not hold a non-negative integer.
    #[error("expected {expected} but found `{token}`")]
    InvalidNumber {
        /// Description of the expected value.
        expected: &'static str,
        /// Offending token.
        token: String,
    },
    /// An entry code was not a single character.
    #[error("expected a single-letter code but found `{token}`")]
    InvalidCode {
        /// Offending token.
        token: String,
    },
    /// An entry addressed a cell outside the battlefield.
    #[error("map entry at {cell} lies outside the {rows}x{columns} battlefield")]
    OutOfBounds {
        /// Cell named by the entry.
        cell: CellCoord,
        /// Battlefield height.
        rows: u32,
        /// Battlefield width.
        columns: u32,
    },
}

/// Reads and parses the map stored at `path`.
pub(crate) fn load_map(path: &Path, rows: u32, columns: u32) -> Result<Battlefield, MapError> {
    let source = fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_map(&source, rows, columns)
}

/// Builds a battlefield of the given size from map text.
///
/// Terrain codes other than `M`, `O` and `F` install plain terrain. Unit
/// codes select the side by letter case; unknown unit codes are skipped.
pub(crate) fn parse_map(source: &str, rows: u32, columns: u32) -> Result<Battlefield, MapError> {
    let mut tokens = Tokens(source.split_whitespace());
    let terrain_count = tokens.number("terrain count")?;
    let unit_count = tokens.number("unit count")?;
    let mut field = Battlefield::new(rows, columns);

    for _ in 0..terrain_count {
        let (cell, code) = tokens.entry(&field)?;
        field.set_terrain(cell, TerrainKind::from_map_code(code));
    }

    for _ in 0..unit_count {
        let (cell, code) = tokens.entry(&field)?;
        match UnitKind::from_map_code(code) {
            Some((kind, side)) => field.set_unit(cell, kind, side),
            None => warn!(%cell, %code, "skipping unknown unit code"),
        }
    }

    debug!(terrain_count, unit_count, "map loaded");
    Ok(field)
}

struct Tokens<'a>(SplitWhitespace<'a>);

impl<'a> Tokens<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, MapError> {
        self.0.next().ok_or(MapError::UnexpectedEnd { expected })
    }

    fn number(&mut self, expected: &'static str) -> Result<u32, MapError> {
        let token = self.next(expected)?;
        token.parse().map_err(|_| MapError::InvalidNumber {
            expected,
            token: token.to_owned(),
        })
    }

    fn entry(&mut self, field: &Battlefield) -> Result<(CellCoord, char), MapError> {
        let row = self.number("entry row")?;
        let column = self.number("entry column")?;
        let token = self.next("entry code")?;

        let mut chars = token.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(code), None) => code,
            _ => {
                return Err(MapError::InvalidCode {
                    token: token.to_owned(),
                })
            }
        };

        let cell = CellCoord::new(row, column);
        if !field.in_bounds(cell) {
            return Err(MapError::OutOfBounds {
                cell,
                rows: field.height(),
                columns: field.width(),
            });
        }
        Ok((cell, code))
    }
}
