#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Beatback tactical engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative battlefield, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the battlefield executes
//! those commands via its `apply` entry point, and then reports [`Event`]
//! values describing what actually happened. Systems query immutable
//! snapshots such as [`Grid`] masks and respond exclusively with new commands.

mod grid;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use grid::{Coordinates, Grid, GridError};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Beatback.";

/// Location of a single battlefield cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Cell one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are checked by the grid that owns the coordinate space.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.step_by(direction, 1)
    }

    /// Cell `distance` steps away in `direction`.
    #[must_use]
    pub fn step_by(self, direction: Direction, distance: u32) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::North => (self.row.checked_sub(distance)?, self.column),
            Direction::South => (self.row.checked_add(distance)?, self.column),
            Direction::East => (self.row, self.column.checked_add(distance)?),
            Direction::West => (self.row, self.column.checked_sub(distance)?),
        };
        Some(CellCoord::new(row, column))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Cardinal directions on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing row indices.
    South,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Fixed order in which searches expand and scan neighbouring cells.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Axis-aligned direction leading from `from` toward `to`.
    ///
    /// Returns `None` when the cells coincide or do not share a row or column.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        if from.column() == to.column() {
            if to.row() < from.row() {
                return Some(Direction::North);
            }
            if to.row() > from.row() {
                return Some(Direction::South);
            }
            return None;
        }

        if from.row() == to.row() {
            if to.column() > from.column() {
                return Some(Direction::East);
            }
            return Some(Direction::West);
        }

        None
    }
}

/// Terrain occupying a battlefield cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open ground; the only terrain that never blocks line of sight.
    #[default]
    Plain,
    /// Raised ground that heavy attacks and knockback collisions level to plain.
    Mountain,
    /// Water that drowns ground units pushed into it.
    Ocean,
    /// Woodland that ground units may be pushed into.
    Forest,
}

impl TerrainKind {
    /// Two-character glyph used when printing the battlefield.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Plain => "  ",
            Self::Mountain => "/\\",
            Self::Ocean => "~~",
            Self::Forest => "^^",
        }
    }

    /// Terrain denoted by a map-file letter. Unknown letters denote plain.
    #[must_use]
    pub const fn from_map_code(code: char) -> Self {
        match code {
            'M' | 'm' => Self::Mountain,
            'O' | 'o' => Self::Ocean,
            'F' | 'f' => Self::Forest,
            _ => Self::Plain,
        }
    }
}

/// Allegiance of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Units controlled by the human player.
    Player,
    /// Units controlled by the automated opponent.
    Enemy,
}

impl Side {
    /// The side opposing this one.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Shape of the squares a unit may attack from its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    /// The four orthogonally adjacent squares.
    Close,
    /// Straight lines in the four directions, each ending at the first obstacle.
    Far,
    /// The four squares exactly two steps away orthogonally.
    Leap,
}

/// How an attack affects its target beyond plain damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeKind {
    /// Damage only.
    Melee,
    /// Damage plus knockback; levels mountains on empty target squares.
    Heavy,
}

/// How a unit interacts with water and woodland.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locomotion {
    /// Drowns in ocean and may be pushed into forest.
    Ground,
    /// Crosses ocean and is not pushed into forest.
    Amphibious,
}

/// Static statistics shared by every unit of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitProfile {
    /// Movement points available for a single move action.
    pub movement_points: i32,
    /// Damage dealt by a single attack.
    pub attack_power: u32,
    /// Hit points a freshly placed unit starts with.
    pub starting_health: Health,
    /// Squares the unit may attack.
    pub attack_pattern: AttackPattern,
    /// Side effects of the unit's attacks.
    pub strike: StrikeKind,
    /// Terrain interaction class.
    pub locomotion: Locomotion,
}

/// Kinds of combatants that may occupy the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Basic ground infantry.
    Soldier,
    /// Armoured ranged unit whose shots knock targets back.
    Tank,
    /// Small flying melee unit.
    Bee,
    /// Fast flying ranged unit.
    Flighter,
    /// Amphibious unit that strikes by leaping over adjacent squares.
    Hydraulisk,
}

impl UnitKind {
    /// Every unit kind in declaration order.
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Soldier,
        UnitKind::Tank,
        UnitKind::Bee,
        UnitKind::Flighter,
        UnitKind::Hydraulisk,
    ];

    /// Statistics shared by every unit of this kind.
    #[must_use]
    pub const fn profile(self) -> UnitProfile {
        match self {
            Self::Soldier => UnitProfile {
                movement_points: 3,
                attack_power: 1,
                starting_health: Health::new(2),
                attack_pattern: AttackPattern::Close,
                strike: StrikeKind::Melee,
                locomotion: Locomotion::Ground,
            },
            Self::Tank => UnitProfile {
                movement_points: 2,
                attack_power: 1,
                starting_health: Health::new(3),
                attack_pattern: AttackPattern::Far,
                strike: StrikeKind::Heavy,
                locomotion: Locomotion::Ground,
            },
            Self::Bee => UnitProfile {
                movement_points: 3,
                attack_power: 1,
                starting_health: Health::new(2),
                attack_pattern: AttackPattern::Close,
                strike: StrikeKind::Melee,
                locomotion: Locomotion::Amphibious,
            },
            Self::Flighter => UnitProfile {
                movement_points: 4,
                attack_power: 1,
                starting_health: Health::new(2),
                attack_pattern: AttackPattern::Far,
                strike: StrikeKind::Melee,
                locomotion: Locomotion::Amphibious,
            },
            Self::Hydraulisk => UnitProfile {
                movement_points: 2,
                attack_power: 2,
                starting_health: Health::new(3),
                attack_pattern: AttackPattern::Leap,
                strike: StrikeKind::Melee,
                locomotion: Locomotion::Amphibious,
            },
        }
    }

    /// Upper-case map letter identifying the kind.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Soldier => 'S',
            Self::Tank => 'T',
            Self::Bee => 'B',
            Self::Flighter => 'F',
            Self::Hydraulisk => 'H',
        }
    }

    /// Display symbol: upper case for the player, lower case for the enemy.
    #[must_use]
    pub const fn symbol(self, side: Side) -> char {
        let code = self.code();
        match side {
            Side::Player => code,
            Side::Enemy => code.to_ascii_lowercase(),
        }
    }

    /// Kind and side denoted by a map-file letter; the letter case selects the side.
    #[must_use]
    pub fn from_map_code(code: char) -> Option<(Self, Side)> {
        let side = if code.is_ascii_uppercase() {
            Side::Player
        } else {
            Side::Enemy
        };
        let upper = code.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == upper)
            .map(|kind| (kind, side))
    }
}

/// Remaining hit points of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Health left after absorbing `amount` damage, never dropping below zero.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Per-turn progress of a single unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Neither moved nor attacked this turn.
    Fresh,
    /// Moved but has not attacked.
    Moved,
    /// Attacked but has not moved.
    Attacked,
    /// Both moved and attacked; no actions remain.
    Exhausted,
}

impl Activity {
    /// Derives the activity from the two per-turn flags.
    #[must_use]
    pub const fn from_flags(has_moved: bool, has_attacked: bool) -> Self {
        match (has_moved, has_attacked) {
            (false, false) => Self::Fresh,
            (true, false) => Self::Moved,
            (false, true) => Self::Attacked,
            (true, true) => Self::Exhausted,
        }
    }

    /// Reports whether the unit may still act this turn.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// Choices offered to the player for a selected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Relocate within the unit's movement budget.
    Move,
    /// Strike a square within the unit's attack pattern.
    Attack,
    /// Give up every remaining action this turn.
    Skip,
}

impl Action {
    /// Menu label shown to the player.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Attack => "Attack",
            Self::Skip => "Skip",
        }
    }
}

/// Final result of a battle from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// Every enemy unit was destroyed.
    Victory,
    /// Every player unit was destroyed.
    Defeat,
}

/// Commands that express all permissible battlefield mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Places a fresh unit, replacing any current occupant of the cell.
    PlaceUnit {
        /// Cell receiving the unit.
        cell: CellCoord,
        /// Kind of unit to create.
        kind: UnitKind,
        /// Side the unit fights for.
        side: Side,
    },
    /// Overwrites the terrain of a cell.
    SetTerrain {
        /// Cell whose terrain changes.
        cell: CellCoord,
        /// Terrain to install.
        terrain: TerrainKind,
    },
    /// Clears the per-turn flags of every unit on a side.
    BeginTurn {
        /// Side whose turn starts.
        side: Side,
    },
    /// Moves the unit at `from` to the empty cell `to`.
    MoveUnit {
        /// Cell currently holding the unit.
        from: CellCoord,
        /// Destination cell.
        to: CellCoord,
    },
    /// Resolves an attack by the unit at `attacker` against `target`.
    AttackUnit {
        /// Cell holding the attacking unit.
        attacker: CellCoord,
        /// Square being attacked.
        target: CellCoord,
    },
    /// Spends every remaining action of the unit at `cell`.
    SkipUnit {
        /// Cell holding the unit.
        cell: CellCoord,
    },
}

/// Events reported by the battlefield after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A unit was placed onto the battlefield.
    UnitPlaced {
        /// Cell that received the unit.
        cell: CellCoord,
        /// Kind of the new unit.
        kind: UnitKind,
        /// Side of the new unit.
        side: Side,
    },
    /// A cell's terrain changed.
    TerrainChanged {
        /// Cell whose terrain changed.
        cell: CellCoord,
        /// Terrain before the change.
        from: TerrainKind,
        /// Terrain after the change.
        to: TerrainKind,
    },
    /// A side's turn started and its units became fresh.
    TurnBegan {
        /// Side whose turn started.
        side: Side,
    },
    /// A unit moved between two cells.
    UnitMoved {
        /// Cell the unit left.
        from: CellCoord,
        /// Cell the unit now occupies.
        to: CellCoord,
    },
    /// A move was refused because the destination is occupied.
    MoveRejected {
        /// Cell holding the unit that tried to move.
        from: CellCoord,
        /// Occupied destination.
        to: CellCoord,
    },
    /// A unit lost hit points.
    UnitDamaged {
        /// Cell holding the damaged unit.
        cell: CellCoord,
        /// Damage applied.
        amount: u32,
        /// Hit points left afterwards.
        remaining: Health,
    },
    /// A unit was pushed one cell by a heavy attack.
    UnitKnockedBack {
        /// Cell the unit was pushed out of.
        from: CellCoord,
        /// Cell the unit was pushed into.
        to: CellCoord,
    },
    /// A unit with no hit points left was removed.
    UnitDestroyed {
        /// Cell the unit occupied.
        cell: CellCoord,
        /// Kind of the destroyed unit.
        kind: UnitKind,
        /// Side of the destroyed unit.
        side: Side,
    },
    /// A unit gave up its remaining actions.
    UnitSkipped {
        /// Cell holding the unit.
        cell: CellCoord,
    },
}
