#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes which cells a unit can reach with its movement budget.

use beatback_core::{CellCoord, Direction, Grid, Locomotion, TerrainKind};
use beatback_world::Battlefield;
use tracing::trace;

/// Cost assigned to cells a mover can never enter within a normal budget.
pub const IMPASSABLE_COST: i32 = 100;

/// Cost of entering a passable cell.
const STEP_COST: i32 = 1;

/// Marks every cell reachable from `origin` without the cumulative entry cost
/// exceeding `movement_points`.
///
/// The frontier is an unordered list scanned linearly for the entry with the
/// most remaining points; ties resolve to the entry added first. Neighbours
/// are expanded north, south, east, west. Revisiting a frontier cell only
/// ever raises its remaining points. The cost at `origin` itself is ignored.
///
/// # Panics
///
/// Panics when `origin` lies outside `costs`.
#[must_use]
pub fn search_reachable(
    costs: &Grid<i32>,
    origin: CellCoord,
    movement_points: i32,
) -> Grid<bool> {
    assert!(
        costs.in_bounds(origin),
        "search origin {origin} lies outside the {}x{} cost grid",
        costs.rows(),
        costs.columns()
    );

    let mut reachable = Grid::filled(costs.rows(), costs.columns(), false);
    let mut frontier = Vec::new();
    if movement_points >= 0 {
        frontier.push(FrontierEntry {
            cell: origin,
            points: movement_points,
        });
    }

    while let Some(current) = take_richest(&mut frontier) {
        reachable.set(current.cell, true);

        for direction in Direction::SEARCH_ORDER {
            let Some(neighbor) = costs.neighbor(current.cell, direction) else {
                continue;
            };
            if reachable[neighbor] {
                continue;
            }

            let remaining = current.points.saturating_sub(costs[neighbor]);
            if remaining < 0 {
                continue;
            }

            match frontier.iter_mut().find(|entry| entry.cell == neighbor) {
                Some(entry) => entry.points = entry.points.max(remaining),
                None => frontier.push(FrontierEntry {
                    cell: neighbor,
                    points: remaining,
                }),
            }
        }
    }

    trace!(%origin, movement_points, reached = reachable.count_true(), "reachability search");
    reachable
}

/// Builds the entry-cost grid for the unit standing on `mover`.
///
/// The mover's own cell costs 0. Empty plain costs 1, as does empty ocean for
/// amphibious movers. Every other cell costs [`IMPASSABLE_COST`].
///
/// # Panics
///
/// Panics when no unit occupies `mover`.
#[must_use]
pub fn movement_costs(field: &Battlefield, mover: CellCoord) -> Grid<i32> {
    let locomotion = field
        .unit(mover)
        .map(|unit| unit.profile().locomotion)
        .unwrap_or_else(|| panic!("no unit to move at {mover}"));

    let mut costs = Grid::filled(field.height(), field.width(), IMPASSABLE_COST);
    for (cell, terrain) in field.terrains().enumerate() {
        let cost = if cell == mover {
            0
        } else if field.unit(cell).is_some() {
            IMPASSABLE_COST
        } else {
            entry_cost(*terrain, locomotion)
        };
        costs.set(cell, cost);
    }
    costs
}

/// Cells the unit standing on `mover` can move to this turn.
///
/// # Panics
///
/// Panics when no unit occupies `mover`.
#[must_use]
pub fn reachable_for(field: &Battlefield, mover: CellCoord) -> Grid<bool> {
    let costs = movement_costs(field, mover);
    let movement_points = field.unit(mover).map_or(0, |unit| unit.movement_points());
    search_reachable(&costs, mover, movement_points)
}

const fn entry_cost(terrain: TerrainKind, locomotion: Locomotion) -> i32 {
    match (terrain, locomotion) {
        (TerrainKind::Plain, _) | (TerrainKind::Ocean, Locomotion::Amphibious) => STEP_COST,
        _ => IMPASSABLE_COST,
    }
}

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    cell: CellCoord,
    points: i32,
}

fn take_richest(frontier: &mut Vec<FrontierEntry>) -> Option<FrontierEntry> {
    let mut best: Option<(usize, i32)> = None;
    for (index, entry) in frontier.iter().enumerate() {
        match best {
            Some((_, points)) if points >= entry.points => {}
            _ => best = Some((index, entry.points)),
        }
    }
    best.map(|(index, _)| frontier.remove(index))
}
