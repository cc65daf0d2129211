#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn policy: which units may still act and whether the battle is over.

use beatback_core::{Action, CellCoord, GameOutcome, Side};
use beatback_world::{Battlefield, Unit};

/// Actions the unit may still take this turn, in menu order.
///
/// Skip is always offered.
#[must_use]
pub fn available_actions(unit: &Unit) -> Vec<Action> {
    let mut actions = Vec::with_capacity(3);
    if !unit.has_moved() {
        actions.push(Action::Move);
    }
    if !unit.has_attacked() {
        actions.push(Action::Attack);
    }
    actions.push(Action::Skip);
    actions
}

/// Reports whether the unit has not yet both moved and attacked.
#[must_use]
pub fn is_actionable(unit: &Unit) -> bool {
    unit.activity().is_actionable()
}

/// Cells of every actionable unit fighting for `side`, in row-major order.
#[must_use]
pub fn actionable_units(field: &Battlefield, side: Side) -> Vec<CellCoord> {
    field
        .units()
        .filter(|unit| unit.side() == side && is_actionable(unit))
        .map(Unit::cell)
        .collect()
}

/// Result of the battle once one side has no units left.
///
/// A field without enemies counts as a victory even when the player has no
/// units either.
#[must_use]
pub fn outcome(field: &Battlefield) -> Option<GameOutcome> {
    if field.count_units(Side::Enemy) == 0 {
        Some(GameOutcome::Victory)
    } else if field.count_units(Side::Player) == 0 {
        Some(GameOutcome::Defeat)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatback_core::UnitKind;

    fn cell(row: u32, column: u32) -> CellCoord {
        CellCoord::new(row, column)
    }

    fn skirmish() -> Battlefield {
        let mut field = Battlefield::new(2, 2);
        field.set_unit(cell(0, 0), UnitKind::Soldier, Side::Player);
        field.set_unit(cell(0, 1), UnitKind::Tank, Side::Player);
        field.set_unit(cell(1, 1), UnitKind::Bee, Side::Enemy);
        field
    }

    #[test]
    fn fresh_unit_offers_every_action() {
        let field = skirmish();
        let unit = field.unit(cell(0, 0)).expect("soldier placed");

        assert_eq!(
            available_actions(unit),
            vec![Action::Move, Action::Attack, Action::Skip]
        );
    }

    #[test]
    fn spent_actions_leave_the_menu() {
        let mut field = skirmish();
        field.mark_moved(cell(0, 0));
        field.mark_attacked(cell(0, 1));

        assert_eq!(
            available_actions(field.unit(cell(0, 0)).expect("soldier")),
            vec![Action::Attack, Action::Skip]
        );
        assert_eq!(
            available_actions(field.unit(cell(0, 1)).expect("tank")),
            vec![Action::Move, Action::Skip]
        );
    }

    #[test]
    fn exhausted_units_are_not_actionable() {
        let mut field = skirmish();
        field.mark_moved(cell(0, 0));
        field.mark_attacked(cell(0, 0));

        assert!(!is_actionable(field.unit(cell(0, 0)).expect("soldier")));
        assert_eq!(actionable_units(&field, Side::Player), vec![cell(0, 1)]);
        assert_eq!(actionable_units(&field, Side::Enemy), vec![cell(1, 1)]);
    }

    #[test]
    fn new_turn_restores_actionability() {
        let mut field = skirmish();
        field.mark_exhausted(cell(0, 0));
        field.mark_exhausted(cell(0, 1));
        assert!(actionable_units(&field, Side::Player).is_empty());

        field.begin_turn(Side::Player);

        assert_eq!(
            actionable_units(&field, Side::Player),
            vec![cell(0, 0), cell(0, 1)]
        );
    }

    #[test]
    fn outcome_tracks_surviving_sides() {
        let mut field = skirmish();
        assert_eq!(outcome(&field), None);

        drop(field.remove_unit(cell(1, 1)));
        assert_eq!(outcome(&field), Some(GameOutcome::Victory));

        field.set_unit(cell(1, 1), UnitKind::Bee, Side::Enemy);
        drop(field.remove_unit(cell(0, 0)));
        drop(field.remove_unit(cell(0, 1)));
        assert_eq!(outcome(&field), Some(GameOutcome::Defeat));
    }

    #[test]
    fn empty_field_counts_as_victory() {
        assert_eq!(outcome(&Battlefield::new(1, 1)), Some(GameOutcome::Victory));
    }
}
