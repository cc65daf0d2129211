#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves the squares a unit may attack from its position.
//!
//! Every function returns a fresh mask sized to the battlefield. Masks are
//! snapshots: any later move or attack may invalidate them.

use beatback_core::{AttackPattern, CellCoord, Direction, Grid};
use beatback_world::{query, Battlefield};

/// Distance covered by a leap attack.
const LEAP_DISTANCE: u32 = 2;

/// The four orthogonal neighbours of `origin` that lie on the battlefield.
///
/// Terrain and occupancy are ignored.
///
/// # Panics
///
/// Panics when `origin` lies outside the battlefield.
#[must_use]
pub fn close_attackable(field: &Battlefield, origin: CellCoord) -> Grid<bool> {
    ring_at(field, origin, 1)
}

/// Straight lines from `origin` in each orthogonal direction, each ending at
/// the first cell holding a unit or non-plain terrain.
///
/// The blocking cell is itself attackable.
///
/// # Panics
///
/// Panics when `origin` lies outside the battlefield.
#[must_use]
pub fn far_attackable(field: &Battlefield, origin: CellCoord) -> Grid<bool> {
    let mut mask = empty_mask(field, origin);

    for direction in Direction::SEARCH_ORDER {
        let mut cursor = origin;
        while let Some(next) = field.terrains().neighbor(cursor, direction) {
            mask.set(next, true);
            if query::blocks_line_of_sight(field, next) {
                break;
            }
            cursor = next;
        }
    }

    mask
}

/// The four cells exactly two steps from `origin` along each axis.
///
/// Nothing in between blocks the leap.
///
/// # Panics
///
/// Panics when `origin` lies outside the battlefield.
#[must_use]
pub fn leap_attackable(field: &Battlefield, origin: CellCoord) -> Grid<bool> {
    ring_at(field, origin, LEAP_DISTANCE)
}

/// Attack mask for the unit standing on `attacker`, chosen by its attack pattern.
///
/// # Panics
///
/// Panics when no unit occupies `attacker`.
#[must_use]
pub fn attackable_for(field: &Battlefield, attacker: CellCoord) -> Grid<bool> {
    let pattern = field
        .unit(attacker)
        .map(|unit| unit.profile().attack_pattern)
        .unwrap_or_else(|| panic!("no attacking unit at {attacker}"));

    match pattern {
        AttackPattern::Close => close_attackable(field, attacker),
        AttackPattern::Far => far_attackable(field, attacker),
        AttackPattern::Leap => leap_attackable(field, attacker),
    }
}

fn ring_at(field: &Battlefield, origin: CellCoord, distance: u32) -> Grid<bool> {
    let mut mask = empty_mask(field, origin);
    let cells = Direction::SEARCH_ORDER
        .into_iter()
        .filter_map(|direction| origin.step_by(direction, distance))
        .filter(|cell| field.in_bounds(*cell));
    for cell in cells {
        mask.set(cell, true);
    }
    mask
}

fn empty_mask(field: &Battlefield, origin: CellCoord) -> Grid<bool> {
    assert!(field.in_bounds(origin), "attack origin {origin} is off the field");
    Grid::filled(field.height(), field.width(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatback_core::{Side, TerrainKind, UnitKind};

    fn cell(row: u32, column: u32) -> CellCoord {
        CellCoord::new(row, column)
    }

    fn marked(mask: &Grid<bool>) -> Vec<CellCoord> {
        mask.marked().collect()
    }

    #[test]
    fn close_attack_covers_in_bounds_neighbours() {
        let field = Battlefield::new(3, 3);

        assert_eq!(
            marked(&close_attackable(&field, cell(1, 1))),
            vec![cell(0, 1), cell(1, 0), cell(1, 2), cell(2, 1)]
        );
        assert_eq!(
            marked(&close_attackable(&field, cell(0, 0))),
            vec![cell(0, 1), cell(1, 0)]
        );
    }

    #[test]
    fn close_attack_ignores_terrain() {
        let mut field = Battlefield::new(1, 2);
        field.set_terrain(cell(0, 1), TerrainKind::Mountain);

        assert_eq!(marked(&close_attackable(&field, cell(0, 0))), vec![cell(0, 1)]);
    }

    #[test]
    fn far_attack_stops_at_first_obstacle_inclusive() {
        let mut field = Battlefield::new(1, 6);
        field.set_terrain(cell(0, 3), TerrainKind::Forest);
        field.set_unit(cell(0, 0), UnitKind::Tank, Side::Player);

        assert_eq!(
            marked(&far_attackable(&field, cell(0, 0))),
            vec![cell(0, 1), cell(0, 2), cell(0, 3)]
        );
    }

    #[test]
    fn far_attack_is_blocked_by_units_of_either_side() {
        let mut field = Battlefield::new(5, 1);
        field.set_unit(cell(2, 0), UnitKind::Flighter, Side::Enemy);
        field.set_unit(cell(1, 0), UnitKind::Soldier, Side::Enemy);
        field.set_unit(cell(3, 0), UnitKind::Soldier, Side::Player);

        assert_eq!(
            marked(&far_attackable(&field, cell(2, 0))),
            vec![cell(1, 0), cell(3, 0)]
        );
    }

    #[test]
    fn far_attack_never_marks_origin() {
        let field = Battlefield::new(3, 3);

        let mask = far_attackable(&field, cell(1, 1));

        assert!(!mask[cell(1, 1)]);
        assert_eq!(mask.count_true(), 4);
    }

    #[test]
    fn leap_attack_jumps_over_obstacles() {
        let mut field = Battlefield::new(5, 5);
        field.set_terrain(cell(1, 2), TerrainKind::Mountain);
        field.set_unit(cell(2, 1), UnitKind::Tank, Side::Player);

        assert_eq!(
            marked(&leap_attackable(&field, cell(2, 2))),
            vec![cell(0, 2), cell(2, 0), cell(2, 4), cell(4, 2)]
        );
        assert_eq!(
            marked(&leap_attackable(&field, cell(0, 1))),
            vec![cell(0, 3), cell(2, 1)]
        );
    }

    #[test]
    fn attackable_for_dispatches_on_pattern() {
        let mut field = Battlefield::new(1, 5);
        field.set_unit(cell(0, 0), UnitKind::Hydraulisk, Side::Enemy);
        field.set_unit(cell(0, 4), UnitKind::Tank, Side::Player);

        assert_eq!(marked(&attackable_for(&field, cell(0, 0))), vec![cell(0, 2)]);
        assert_eq!(
            marked(&attackable_for(&field, cell(0, 4))),
            vec![cell(0, 0), cell(0, 1), cell(0, 2), cell(0, 3)]
        );
    }

    #[test]
    #[should_panic(expected = "off the field")]
    fn origin_outside_field_panics() {
        let field = Battlefield::new(2, 2);
        let _ = close_attackable(&field, cell(5, 5));
    }
}
