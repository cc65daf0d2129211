//! Interactive battle loop driven by whitespace-separated player input.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use beatback_core::{Action, CellCoord, Command, Event, GameOutcome, Grid, Side};
use beatback_rendering::{write_field, Overlay};
use beatback_system_enemy_ai::EnemyAi;
use beatback_system_reachability::reachable_for;
use beatback_system_targeting::attackable_for;
use beatback_system_turn as turn;
use beatback_world::{self as world, Battlefield};
use thiserror::Error;
use tracing::{debug, info};

/// Token that finishes the player phase early.
const END_PHASE: &str = "end";

/// Reasons an interactive session stopped abnormally.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    /// Player input could not be read.
    #[error("failed to read player input")]
    Input(#[source] io::Error),
    /// Prompts or reports could not be written.
    #[error("failed to write session output")]
    Output(#[from] io::Error),
    /// The battlefield could not be drawn.
    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

/// One battle between the player and the enemy policy.
pub(crate) struct Session<R, W> {
    field: Battlefield,
    input: TokenReader<R>,
    output: W,
    enemy: EnemyAi,
    events: Vec<Event>,
}

enum Reply {
    Cell(CellCoord),
    EndPhase,
    Invalid,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a session playing on `field`.
    pub(crate) fn new(field: Battlefield, input: R, output: W) -> Self {
        Self {
            field,
            input: TokenReader::new(input),
            output,
            enemy: EnemyAi::new(),
            events: Vec::new(),
        }
    }

    /// Current battlefield.
    pub(crate) fn field(&self) -> &Battlefield {
        &self.field
    }

    /// Plays rounds until one side is wiped out or the input runs dry.
    ///
    /// Returns `None` when the input ended before the battle was decided.
    pub(crate) fn run(&mut self) -> Result<Option<GameOutcome>, SessionError> {
        loop {
            if let Some(outcome) = turn::outcome(&self.field) {
                self.announce(outcome)?;
                return Ok(Some(outcome));
            }

            if !self.player_phase()? {
                info!("player input exhausted");
                return Ok(None);
            }

            self.enemy.play_enemy_phase(&mut self.field, &mut self.events);
            self.report_events()?;
        }
    }

    /// Returns `false` when the input ended mid-phase.
    fn player_phase(&mut self) -> Result<bool, SessionError> {
        self.apply(Command::BeginTurn { side: Side::Player })?;

        while !turn::actionable_units(&self.field, Side::Player).is_empty() {
            write_field(&mut self.output, &self.field, None)?;

            let cell = match self.select_unit()? {
                Some(Reply::Cell(cell)) => cell,
                Some(_) => return Ok(true),
                None => return Ok(false),
            };
            let Some(action) = self.select_action(cell)? else {
                return Ok(false);
            };

            let completed = match action {
                Action::Move => self.perform_move(cell)?,
                Action::Attack => self.perform_attack(cell)?,
                Action::Skip => {
                    self.apply(Command::SkipUnit { cell })?;
                    true
                }
            };
            if !completed {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Yields either an actionable player unit or the end-of-phase request.
    fn select_unit(&mut self) -> Result<Option<Reply>, SessionError> {
        loop {
            writeln!(
                self.output,
                "Please select a unit (or `{END_PHASE}` to end your turn):"
            )?;
            let cell = match self.read_cell()? {
                Some(Reply::Cell(cell)) => cell,
                Some(Reply::Invalid) => {
                    writeln!(self.output, "Invalid coordinates!")?;
                    continue;
                }
                other => return Ok(other),
            };

            let unit = self.field.in_bounds(cell).then(|| self.field.unit(cell)).flatten();
            match unit {
                None => writeln!(self.output, "No unit at {cell}!")?,
                Some(unit) if unit.side() != Side::Player => {
                    writeln!(self.output, "Unit at {cell} is an enemy!")?;
                }
                Some(unit) if !turn::is_actionable(unit) => {
                    writeln!(self.output, "Unit at {cell} has no actions left!")?;
                }
                Some(_) => return Ok(Some(Reply::Cell(cell))),
            }
        }
    }

    fn select_action(&mut self, cell: CellCoord) -> Result<Option<Action>, SessionError> {
        let mut actions = self
            .field
            .unit(cell)
            .map(turn::available_actions)
            .unwrap_or_default();
        if attackable_for(&self.field, cell).count_true() == 0 {
            actions.retain(|action| *action != Action::Attack);
        }
        let menu = actions
            .iter()
            .enumerate()
            .map(|(index, action)| format!("{}. {}", index + 1, action.label()))
            .collect::<Vec<_>>()
            .join(" ");

        loop {
            writeln!(self.output, "{menu}")?;
            writeln!(self.output, "Select your action:")?;
            let Some(token) = self.next_token()? else {
                return Ok(None);
            };
            let choice = token
                .parse::<usize>()
                .ok()
                .and_then(|choice| choice.checked_sub(1))
                .and_then(|index| actions.get(index));
            match choice {
                Some(action) => return Ok(Some(*action)),
                None => writeln!(self.output, "Invalid action!")?,
            }
        }
    }

    fn perform_move(&mut self, from: CellCoord) -> Result<bool, SessionError> {
        let overlay = Overlay::Move(reachable_for(&self.field, from));
        write_field(&mut self.output, &self.field, Some(&overlay))?;

        let prompt = "Please enter your destination:";
        let rejection = "Not a valid destination";
        let Some(to) = self.choose_square(overlay.mask(), prompt, rejection)? else {
            return Ok(false);
        };
        self.apply(Command::MoveUnit { from, to })?;
        Ok(true)
    }

    fn perform_attack(&mut self, attacker: CellCoord) -> Result<bool, SessionError> {
        let overlay = Overlay::Attack(attackable_for(&self.field, attacker));
        write_field(&mut self.output, &self.field, Some(&overlay))?;

        let prompt = "Please enter your target:";
        let rejection = "Not a valid target";
        let Some(target) = self.choose_square(overlay.mask(), prompt, rejection)? else {
            return Ok(false);
        };
        self.apply(Command::AttackUnit { attacker, target })?;
        Ok(true)
    }

    fn choose_square(
        &mut self,
        mask: &Grid<bool>,
        prompt: &str,
        rejection: &str,
    ) -> Result<Option<CellCoord>, SessionError> {
        loop {
            writeln!(self.output, "{prompt}")?;
            match self.read_cell()? {
                Some(Reply::Cell(cell)) if mask.in_bounds(cell) && mask[cell] => {
                    return Ok(Some(cell));
                }
                Some(_) => writeln!(self.output, "{rejection}")?,
                None => return Ok(None),
            }
        }
    }

    fn read_cell(&mut self) -> Result<Option<Reply>, SessionError> {
        let Some(first) = self.next_token()? else {
            return Ok(None);
        };
        if first == END_PHASE {
            return Ok(Some(Reply::EndPhase));
        }
        let Some(second) = self.next_token()? else {
            return Ok(None);
        };

        let reply = match (first.parse(), second.parse()) {
            (Ok(row), Ok(column)) => Reply::Cell(CellCoord::new(row, column)),
            _ => Reply::Invalid,
        };
        Ok(Some(reply))
    }

    fn next_token(&mut self) -> Result<Option<String>, SessionError> {
        self.output.flush()?;
        self.input.next_token().map_err(SessionError::Input)
    }

    fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        debug!(?command, "player command");
        world::apply(&mut self.field, command, &mut self.events);
        self.report_events()
    }

    fn report_events(&mut self) -> Result<(), SessionError> {
        for event in self.events.drain(..) {
            if let Some(line) = describe(&event) {
                writeln!(self.output, "{line}")?;
            }
        }
        Ok(())
    }

    fn announce(&mut self, outcome: GameOutcome) -> Result<(), SessionError> {
        info!(?outcome, "battle decided");
        write_field(&mut self.output, &self.field, None)?;
        let line = match outcome {
            GameOutcome::Victory => "You win!",
            GameOutcome::Defeat => "You lose!",
        };
        writeln!(self.output, "{line}")?;
        self.output.flush()?;
        Ok(())
    }
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TurnBegan { side: Side::Player } => "Your turn.".to_owned(),
        Event::TurnBegan { side: Side::Enemy } => "Enemy turn.".to_owned(),
        Event::UnitMoved { from, to } => format!("Unit moved from {from} to {to}."),
        Event::MoveRejected { to, .. } => format!("Destination {to} is occupied."),
        Event::UnitDamaged {
            cell,
            amount,
            remaining,
        } => format!(
            "Unit at {cell} took {amount} damage, {} hp left.",
            remaining.get()
        ),
        Event::UnitKnockedBack { from, to } => format!("Unit knocked back from {from} to {to}."),
        Event::UnitDestroyed { cell, kind, side } => {
            format!("Unit {} at {cell} was destroyed.", kind.symbol(*side))
        }
        Event::TerrainChanged { cell, to, .. } => format!("Terrain at {cell} is now {to:?}."),
        Event::UnitPlaced { .. } | Event::UnitSkipped { .. } => return None,
    };
    Some(line)
}

/// Splits buffered input into whitespace-separated tokens across lines.
struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
    }
}
