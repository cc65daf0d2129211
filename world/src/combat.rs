//! Attack resolution: damage, knockback, terrain destruction and cleanup.

use beatback_core::{CellCoord, Direction, Event, Locomotion, StrikeKind, TerrainKind};
use tracing::debug;

use crate::Battlefield;

/// Damage that destroys any unit outright.
const DROWNING_DAMAGE: u32 = 999;
/// Damage dealt by knockback collisions with units or mountains.
const COLLISION_DAMAGE: u32 = 1;

/// Resolves a full attack, including the removal of every fallen unit.
///
/// Knockback runs immediately after the initial damage and before cleanup,
/// so a target reduced to zero hit points is still pushed and still
/// interacts with the terrain it is pushed into before it is removed.
pub(crate) fn resolve_attack(
    field: &mut Battlefield,
    attacker: CellCoord,
    target: CellCoord,
    out: &mut Vec<Event>,
) {
    assert!(field.in_bounds(target), "attack target {target} is off the field");
    let profile = field
        .unit(attacker)
        .map(|unit| unit.profile())
        .unwrap_or_else(|| panic!("no attacking unit at {attacker}"));
    let occupied = field.unit(target).is_some();

    debug!(%attacker, %target, strike = ?profile.strike, "resolving attack");

    match profile.strike {
        StrikeKind::Melee => {
            if occupied {
                damage(field, target, profile.attack_power, out);
            }
        }
        StrikeKind::Heavy => {
            if !occupied && field.terrain(target) == TerrainKind::Mountain {
                level(field, target, out);
            }
            if occupied {
                damage(field, target, profile.attack_power, out);
                knock_back(field, attacker, target, out);
            }
        }
    }

    remove_fallen(field, out);
}

fn knock_back(
    field: &mut Battlefield,
    attacker: CellCoord,
    target: CellCoord,
    out: &mut Vec<Event>,
) {
    let Some(direction) = Direction::between(attacker, target) else {
        return;
    };
    let Some(landing) = field.units.neighbor(target, direction) else {
        return;
    };

    if field.unit(landing).is_some() {
        damage(field, target, COLLISION_DAMAGE, out);
        damage(field, landing, COLLISION_DAMAGE, out);
        return;
    }

    let locomotion = match field.unit(target) {
        Some(unit) => unit.profile().locomotion,
        None => return,
    };

    match (field.terrain(landing), locomotion) {
        (TerrainKind::Plain, _) => push(field, target, landing, out),
        (TerrainKind::Mountain, _) => {
            damage(field, target, COLLISION_DAMAGE, out);
            level(field, landing, out);
        }
        (TerrainKind::Ocean, Locomotion::Ground) => {
            damage(field, target, DROWNING_DAMAGE, out);
        }
        (TerrainKind::Ocean, Locomotion::Amphibious) => push(field, target, landing, out),
        (TerrainKind::Forest, Locomotion::Ground) => push(field, target, landing, out),
        (TerrainKind::Forest, Locomotion::Amphibious) => {}
    }
}

fn push(field: &mut Battlefield, from: CellCoord, to: CellCoord, out: &mut Vec<Event>) {
    if field.move_unit(from, to) {
        debug!(%from, %to, "unit knocked back");
        out.push(Event::UnitKnockedBack { from, to });
    }
}

fn damage(field: &mut Battlefield, cell: CellCoord, amount: u32, out: &mut Vec<Event>) {
    let Some(unit) = field.units.get_mut(cell).as_mut() else {
        return;
    };
    let remaining = unit.receive_damage(amount);
    debug!(%cell, amount, remaining = remaining.get(), "unit damaged");
    out.push(Event::UnitDamaged {
        cell,
        amount,
        remaining,
    });
}

fn level(field: &mut Battlefield, cell: CellCoord, out: &mut Vec<Event>) {
    field.set_terrain(cell, TerrainKind::Plain);
    debug!(%cell, "mountain levelled");
    out.push(Event::TerrainChanged {
        cell,
        from: TerrainKind::Mountain,
        to: TerrainKind::Plain,
    });
}

fn remove_fallen(field: &mut Battlefield, out: &mut Vec<Event>) {
    for cell in field.units.coordinates() {
        let fallen = field.unit(cell).is_some_and(|unit| !unit.is_alive());
        if !fallen {
            continue;
        }

        if let Some(unit) = field.remove_unit(cell) {
            debug!(%cell, kind = ?unit.kind(), side = ?unit.side(), "unit destroyed");
            out.push(Event::UnitDestroyed {
                cell,
                kind: unit.kind(),
                side: unit.side(),
            });
        }
    }
}
