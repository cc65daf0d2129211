#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy policy that plays the enemy side's turn.

use beatback_core::{CellCoord, Command, Event, Side};
use beatback_system_reachability::reachable_for;
use beatback_system_targeting::attackable_for;
use beatback_world::{self as world, query, Battlefield};
use tracing::{debug, info};

/// Enemy policy that reuses a scratch buffer of opposing unit positions.
#[derive(Debug, Default)]
pub struct EnemyAi {
    opponents: Vec<CellCoord>,
}

impl EnemyAi {
    /// Creates a new enemy policy with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Proposes moving the unit at `cell` to the reachable cell closest to
    /// any opposing unit.
    ///
    /// Distance is Manhattan distance to the nearest opponent; ties resolve
    /// to the first cell in row-major order. Returns `None` when no opponent
    /// remains or when the best cell is the one the unit already occupies.
    ///
    /// # Panics
    ///
    /// Panics when no unit occupies `cell`.
    #[must_use]
    pub fn plan_move(&mut self, field: &Battlefield, cell: CellCoord) -> Option<Command> {
        let to = self.destination(field, cell)?;
        (to != cell).then_some(Command::MoveUnit { from: cell, to })
    }

    /// Proposes attacking the first opposing unit, in row-major order, inside
    /// the attack pattern of the unit at `cell`.
    ///
    /// # Panics
    ///
    /// Panics when no unit occupies `cell`.
    #[must_use]
    pub fn plan_attack(&self, field: &Battlefield, cell: CellCoord) -> Option<Command> {
        let opponent = side_at(field, cell).opponent();
        attackable_for(field, cell)
            .marked()
            .find(|target| query::holds_side(field, *target, opponent))
            .map(|target| Command::AttackUnit {
                attacker: cell,
                target,
            })
    }

    /// Plays one full enemy phase.
    ///
    /// Enemy flags are reset first. Every enemy unit, visited in row-major
    /// order of its position at the start of the phase, that is still present
    /// and has not moved then moves, attacks, and is marked exhausted.
    pub fn play_enemy_phase(&mut self, field: &mut Battlefield, out_events: &mut Vec<Event>) {
        world::apply(field, Command::BeginTurn { side: Side::Enemy }, out_events);

        let roster = query::units_of(field, Side::Enemy);
        info!(units = roster.len(), "enemy phase");

        for cell in roster {
            let ready = field
                .unit(cell)
                .is_some_and(|unit| unit.side() == Side::Enemy && !unit.has_moved());
            if !ready {
                continue;
            }

            let position = self.destination(field, cell).unwrap_or(cell);
            debug!(from = %cell, to = %position, "enemy moves");
            world::apply(
                field,
                Command::MoveUnit {
                    from: cell,
                    to: position,
                },
                out_events,
            );

            if let Some(attack) = self.plan_attack(field, position) {
                debug!(?attack, "enemy attacks");
                world::apply(field, attack, out_events);
            }

            if field.unit(position).is_some() {
                field.mark_exhausted(position);
            }
        }
    }

    fn destination(&mut self, field: &Battlefield, cell: CellCoord) -> Option<CellCoord> {
        let opponent = side_at(field, cell).opponent();
        self.opponents.clear();
        self.opponents.extend(
            field
                .units()
                .filter(|unit| unit.side() == opponent)
                .map(|unit| unit.cell()),
        );
        if self.opponents.is_empty() {
            return None;
        }

        let opponents = &self.opponents;
        reachable_for(field, cell).marked().min_by_key(|candidate| {
            opponents
                .iter()
                .map(|target| candidate.manhattan_distance(*target))
                .min()
                .unwrap_or(u32::MAX)
        })
    }
}

fn side_at(field: &Battlefield, cell: CellCoord) -> Side {
    field
        .unit(cell)
        .map(|unit| unit.side())
        .unwrap_or_else(|| panic!("no unit to plan for at {cell}"))
}
