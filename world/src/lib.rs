#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for Beatback.

mod combat;

use beatback_core::{
    Activity, CellCoord, Command, Event, Grid, Health, Side, TerrainKind, UnitKind, UnitProfile,
};
use tracing::{debug, info};

/// A single combatant owned by the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    kind: UnitKind,
    side: Side,
    cell: CellCoord,
    health: Health,
    has_moved: bool,
    has_attacked: bool,
}

impl Unit {
    fn new(kind: UnitKind, side: Side, cell: CellCoord) -> Self {
        Self {
            kind,
            side,
            cell,
            health: kind.profile().starting_health,
            has_moved: false,
            has_attacked: false,
        }
    }

    /// Kind of the unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Side the unit fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Cell the unit occupies. Always equals the battlefield cell holding it.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Statistics shared by every unit of this kind.
    #[must_use]
    pub const fn profile(&self) -> UnitProfile {
        self.kind.profile()
    }

    /// Movement points available for a single move action.
    #[must_use]
    pub const fn movement_points(&self) -> i32 {
        self.kind.profile().movement_points
    }

    /// Damage dealt by a single attack.
    #[must_use]
    pub const fn attack_power(&self) -> u32 {
        self.kind.profile().attack_power
    }

    /// Display symbol reflecting kind and side.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.kind.symbol(self.side)
    }

    /// Reports whether the unit still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Reports whether the unit moved this turn.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Reports whether the unit attacked this turn.
    #[must_use]
    pub const fn has_attacked(&self) -> bool {
        self.has_attacked
    }

    /// Per-turn progress derived from the move and attack flags.
    #[must_use]
    pub const fn activity(&self) -> Activity {
        Activity::from_flags(self.has_moved, self.has_attacked)
    }

    fn receive_damage(&mut self, amount: u32) -> Health {
        self.health = self.health.damaged(amount);
        self.health
    }
}

/// Represents the authoritative battlefield: co-indexed unit and terrain layers.
///
/// The battlefield exclusively owns every live [`Unit`]. Each cell holds at
/// most one unit, and a unit's stored cell always matches the cell holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Battlefield {
    units: Grid<Option<Unit>>,
    terrains: Grid<TerrainKind>,
}

impl Battlefield {
    /// Creates an all-plain battlefield without units.
    #[must_use]
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            units: Grid::new(height, width),
            terrains: Grid::new(height, width),
        }
    }

    /// Number of rows on the battlefield.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.units.rows()
    }

    /// Number of columns on the battlefield.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.units.columns()
    }

    /// Reports whether the cell lies on the battlefield.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        self.units.in_bounds(cell)
    }

    /// Unit occupying `cell`, if any.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    #[must_use]
    pub fn unit(&self, cell: CellCoord) -> Option<&Unit> {
        self.units.get(cell).as_ref()
    }

    /// Creates a fresh unit at `cell`, replacing any current occupant.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    pub fn set_unit(&mut self, cell: CellCoord, kind: UnitKind, side: Side) {
        self.units.set(cell, Some(Unit::new(kind, side, cell)));
    }

    /// Removes and returns the unit occupying `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    pub fn remove_unit(&mut self, cell: CellCoord) -> Option<Unit> {
        self.units.get_mut(cell).take()
    }

    /// Terrain covering `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> TerrainKind {
        *self.terrains.get(cell)
    }

    /// Overwrites the terrain covering `cell`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    pub fn set_terrain(&mut self, cell: CellCoord, terrain: TerrainKind) {
        self.terrains.set(cell, terrain);
    }

    /// Read-only access to the terrain layer.
    #[must_use]
    pub const fn terrains(&self) -> &Grid<TerrainKind> {
        &self.terrains
    }

    /// Iterates over every live unit in row-major order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().flatten()
    }

    /// Number of live units fighting for `side`.
    #[must_use]
    pub fn count_units(&self, side: Side) -> usize {
        self.units().filter(|unit| unit.side == side).count()
    }

    /// Moves the unit at `from` onto the empty cell `to`.
    ///
    /// Returns `false` without touching any state when `to` is occupied.
    ///
    /// # Panics
    ///
    /// Panics when either cell lies outside the battlefield or when no unit
    /// occupies `from`.
    pub fn move_unit(&mut self, from: CellCoord, to: CellCoord) -> bool {
        assert!(self.in_bounds(from), "move source {from} is off the field");
        assert!(self.in_bounds(to), "move destination {to} is off the field");

        if self.units.get(to).is_some() {
            return false;
        }

        let mut unit = self
            .units
            .get_mut(from)
            .take()
            .unwrap_or_else(|| panic!("no unit to move at {from}"));
        unit.cell = to;
        self.units.set(to, Some(unit));
        debug!(%from, %to, "unit moved");
        true
    }

    /// Resolves an attack by the unit at `attacker` against the square `target`.
    ///
    /// Damage, knockback, terrain destruction and removal of fallen units are
    /// all applied before returning. Outcomes are reflected in the battlefield
    /// state; the return value only confirms that the attack was resolved.
    ///
    /// # Panics
    ///
    /// Panics when either cell lies outside the battlefield or when no unit
    /// occupies `attacker`.
    pub fn attack_unit(&mut self, attacker: CellCoord, target: CellCoord) -> bool {
        let mut events = Vec::new();
        combat::resolve_attack(self, attacker, target, &mut events);
        true
    }

    /// Clears the per-turn flags of every unit fighting for `side`.
    pub fn begin_turn(&mut self, side: Side) {
        for unit in self.units_mut().filter(|unit| unit.side == side) {
            unit.has_moved = false;
            unit.has_attacked = false;
        }
    }

    /// Records that the unit at `cell` moved this turn.
    ///
    /// # Panics
    ///
    /// Panics when no unit occupies `cell`.
    pub fn mark_moved(&mut self, cell: CellCoord) {
        self.expect_unit_mut(cell).has_moved = true;
    }

    /// Records that the unit at `cell` attacked this turn.
    ///
    /// # Panics
    ///
    /// Panics when no unit occupies `cell`.
    pub fn mark_attacked(&mut self, cell: CellCoord) {
        self.expect_unit_mut(cell).has_attacked = true;
    }

    /// Spends every remaining action of the unit at `cell`.
    ///
    /// # Panics
    ///
    /// Panics when no unit occupies `cell`.
    pub fn mark_exhausted(&mut self, cell: CellCoord) {
        let unit = self.expect_unit_mut(cell);
        unit.has_moved = true;
        unit.has_attacked = true;
    }

    fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut().flatten()
    }

    fn expect_unit_mut(&mut self, cell: CellCoord) -> &mut Unit {
        self.units
            .get_mut(cell)
            .as_mut()
            .unwrap_or_else(|| panic!("no unit at {cell}"))
    }
}

/// Applies the provided command to the battlefield, mutating state deterministically.
///
/// # Panics
///
/// Panics when the command references cells outside the battlefield, or a
/// unit that does not exist for commands acting on a unit.
pub fn apply(field: &mut Battlefield, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceUnit { cell, kind, side } => {
            field.set_unit(cell, kind, side);
            out_events.push(Event::UnitPlaced { cell, kind, side });
        }
        Command::SetTerrain { cell, terrain } => {
            let previous = field.terrain(cell);
            field.set_terrain(cell, terrain);
            if previous != terrain {
                out_events.push(Event::TerrainChanged {
                    cell,
                    from: previous,
                    to: terrain,
                });
            }
        }
        Command::BeginTurn { side } => {
            field.begin_turn(side);
            info!(?side, "turn began");
            out_events.push(Event::TurnBegan { side });
        }
        Command::MoveUnit { from, to } => {
            if from == to {
                field.mark_moved(from);
                return;
            }

            if field.move_unit(from, to) {
                field.mark_moved(to);
                out_events.push(Event::UnitMoved { from, to });
            } else {
                debug!(%from, %to, "move rejected, destination occupied");
                out_events.push(Event::MoveRejected { from, to });
            }
        }
        Command::AttackUnit { attacker, target } => {
            field.mark_attacked(attacker);
            combat::resolve_attack(field, attacker, target, out_events);
        }
        Command::SkipUnit { cell } => {
            field.mark_exhausted(cell);
            out_events.push(Event::UnitSkipped { cell });
        }
    }
}

/// Query functions that provide read-only access to the battlefield state.
pub mod query {
    use beatback_core::{CellCoord, Grid, Side, TerrainKind};

    use super::{Battlefield, Unit};

    /// Cells holding units fighting for `side`, in row-major order.
    #[must_use]
    pub fn units_of(field: &Battlefield, side: Side) -> Vec<CellCoord> {
        field
            .units()
            .filter(|unit| unit.side() == side)
            .map(Unit::cell)
            .collect()
    }

    /// Mask of every occupied cell.
    #[must_use]
    pub fn occupancy(field: &Battlefield) -> Grid<bool> {
        field.units.map(Option::is_some)
    }

    /// Reports whether `cell` stops a straight-line attack: any unit or non-plain terrain.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    #[must_use]
    pub fn blocks_line_of_sight(field: &Battlefield, cell: CellCoord) -> bool {
        field.terrain(cell) != TerrainKind::Plain || field.unit(cell).is_some()
    }

    /// Reports whether `cell` holds a unit fighting for `side`.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the battlefield.
    #[must_use]
    pub fn holds_side(field: &Battlefield, cell: CellCoord, side: Side) -> bool {
        field.unit(cell).is_some_and(|unit| unit.side() == side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: u32, column: u32) -> CellCoord {
        CellCoord::new(row, column)
    }

    #[test]
    fn new_battlefield_is_empty_plain() {
        let field = Battlefield::new(3, 4);

        assert_eq!(field.height(), 3);
        assert_eq!(field.width(), 4);
        assert_eq!(field.units().count(), 0);
        assert!(field.terrains().iter().all(|t| *t == TerrainKind::Plain));
    }

    #[test]
    fn set_unit_replaces_existing_occupant() {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        field.set_unit(cell(0, 0), UnitKind::Tank, Side::Enemy);

        let unit = field.unit(cell(0, 0)).expect("unit placed");
        assert_eq!(unit.kind(), UnitKind::Tank);
        assert_eq!(unit.side(), Side::Enemy);
        assert_eq!(unit.health(), Health::new(3));
        assert_eq!(field.units().count(), 1);
    }

    #[test]
    fn move_unit_relocates_and_updates_cell() {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);

        assert!(field.move_unit(cell(0, 0), cell(1, 1)));

        assert!(field.unit(cell(0, 0)).is_none());
        let unit = field.unit(cell(1, 1)).expect("unit moved");
        assert_eq!(unit.cell(), cell(1, 1));
    }

    #[test]
    fn move_unit_onto_occupied_cell_changes_nothing() {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        field.set_unit(cell(0, 1), UnitKind::Bee, Side::Enemy);
        let before = field.clone();

        assert!(!field.move_unit(cell(0, 0), cell(0, 1)));
        assert_eq!(field, before);
    }

    #[test]
    #[should_panic(expected = "no unit to move")]
    fn move_unit_without_unit_panics() {
        let mut field = Battlefield::new(2, 2);
        let _ = field.move_unit(cell(0, 0), cell(1, 1));
    }

    #[test]
    #[should_panic(expected = "off the field")]
    fn move_unit_off_field_panics() {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        let _ = field.move_unit(cell(0, 0), cell(0, 2));
    }

    #[test]
    fn begin_turn_resets_only_that_side() {
        let mut field = Battlefield::new(1, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        field.set_unit(cell(0, 1), UnitKind::Bee, Side::Enemy);
        field.mark_exhausted(cell(0, 0));
        field.mark_exhausted(cell(0, 1));

        field.begin_turn(Side::Player);

        assert_eq!(
            field.unit(cell(0, 0)).map(Unit::activity),
            Some(Activity::Fresh)
        );
        assert_eq!(
            field.unit(cell(0, 1)).map(Unit::activity),
            Some(Activity::Exhausted)
        );
    }

    #[test]
    fn apply_move_marks_unit_moved() {
        let mut field = Battlefield::new(2, 2);
        let mut events = Vec::new();
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);

        apply(
            &mut field,
            Command::MoveUnit {
                from: cell(0, 0),
                to: cell(1, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitMoved {
                from: cell(0, 0),
                to: cell(1, 0),
            }]
        );
        assert_eq!(
            field.unit(cell(1, 0)).map(Unit::activity),
            Some(Activity::Moved)
        );
    }

    #[test]
    fn apply_move_in_place_holds_position() {
        let mut field = Battlefield::new(1, 1);
        let mut events = Vec::new();
        field.set_unit(cell(0, 0), UnitKind::Tank, Side::Player);

        apply(
            &mut field,
            Command::MoveUnit {
                from: cell(0, 0),
                to: cell(0, 0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(field.unit(cell(0, 0)).is_some_and(Unit::has_moved));
    }

    #[test]
    fn apply_rejected_move_reports_and_leaves_flags() {
        let mut field = Battlefield::new(1, 2);
        let mut events = Vec::new();
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        field.set_unit(cell(0, 1), UnitKind::Soldier, Side::Player);

        apply(
            &mut field,
            Command::MoveUnit {
                from: cell(0, 0),
                to: cell(0, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                from: cell(0, 0),
                to: cell(0, 1),
            }]
        );
        assert!(!field.unit(cell(0, 0)).is_some_and(Unit::has_moved));
    }

    #[test]
    fn apply_set_terrain_reports_only_changes() {
        let mut field = Battlefield::new(1, 1);
        let mut events = Vec::new();

        apply(
            &mut field,
            Command::SetTerrain {
                cell: cell(0, 0),
                terrain: TerrainKind::Plain,
            },
            &mut events,
        );
        apply(
            &mut field,
            Command::SetTerrain {
                cell: cell(0, 0),
                terrain: TerrainKind::Ocean,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TerrainChanged {
                cell: cell(0, 0),
                from: TerrainKind::Plain,
                to: TerrainKind::Ocean,
            }]
        );
    }

    #[test]
    fn query_lists_units_in_row_major_order() {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(1, 0), UnitKind::Bee, Side::Enemy);
        field.set_unit(cell(0, 1), UnitKind::Bee, Side::Enemy);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);

        assert_eq!(
            query::units_of(&field, Side::Enemy),
            vec![cell(0, 1), cell(1, 0)]
        );
        assert_eq!(query::occupancy(&field).count_true(), 3);
        assert!(query::holds_side(&field, cell(0, 0), Side::Player));
        assert!(!query::holds_side(&field, cell(1, 1), Side::Player));
    }
}
