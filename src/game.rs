//! Game state machine: pairs two players, owns the turn order and decides the
//! winner.
//!
//! ```text
//! Setup ──start_game──▶ InProgress ──last ship sunk──▶ Finished
//!   │                        │
//!   └───────cancel_game──────┴──────────────────────────▶ Cancelled
//! ```

use core::fmt;
use std::time::SystemTime;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::common::{BoardError, ErrorKind};
use crate::player::{Player, PlayerId};
use crate::ship::{Orientation, ShipType};
use crate::shot::Shot;

/// Generated unique game identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl core::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Players are placing ships.
    Setup,
    InProgress,
    Finished,
    Cancelled,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Finished | GameState::Cancelled)
    }
}

/// Which of the two players, fixed at construction. `First` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// Errors returned by game-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("game is not in progress (state: {0:?})")]
    NotInProgress(GameState),
    #[error("setup is closed (state: {0:?})")]
    SetupClosed(GameState),
    #[error("game is already over (state: {0:?})")]
    GameOver(GameState),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Board(e) => e.kind(),
            GameError::NotInProgress(_) | GameError::SetupClosed(_) | GameError::GameOver(_) => {
                ErrorKind::IllegalState
            }
        }
    }
}

/// A two-player match.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    player1: Player,
    player2: Player,
    current: Seat,
    winner: Option<Seat>,
    state: GameState,
    created_at: SystemTime,
    started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,
    turn_count: u32,
}

impl Game {
    /// Create a game in setup between two freshly created players.
    pub fn new(player1_name: impl Into<String>, player2_name: impl Into<String>) -> Self {
        Self::from_players(Player::new(player1_name), Player::new(player2_name))
    }

    pub fn from_players(player1: Player, player2: Player) -> Self {
        Self {
            id: GameId::new(),
            player1,
            player2,
            current: Seat::First,
            winner: None,
            state: GameState::Setup,
            created_at: SystemTime::now(),
            started_at: None,
            finished_at: None,
            turn_count: 0,
        }
    }

    fn require_setup(&self) -> Result<(), GameError> {
        if self.state != GameState::Setup {
            return Err(GameError::SetupClosed(self.state));
        }
        Ok(())
    }

    /// Place the seat's ship of `ship_type`, creating it first unless an
    /// earlier rejected attempt left it on the board unplaced.
    ///
    /// `Ok(false)` means the geometry was rejected and the ship stays
    /// unplaced, ready for another attempt.
    pub fn place_ship(
        &mut self,
        seat: Seat,
        ship_type: ShipType,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<bool, GameError> {
        self.require_setup()?;
        let board = self.player_mut(seat).board_mut();
        let ship = match board.ship_by_type(ship_type) {
            Some(ship) if !ship.is_placed() => ship.id(),
            _ => board.create_ship(ship_type)?,
        };
        Ok(board.place_ship(ship, x, y, orientation)?)
    }

    /// Fill the seat's board with a random full fleet and mark the player
    /// ready. Does not start the game.
    pub fn random_place_ships<R: Rng>(&mut self, seat: Seat, rng: &mut R) -> Result<(), GameError> {
        self.require_setup()?;
        let player = self.player_mut(seat);
        player.board_mut().randomly_place_all_ships(rng)?;
        player.set_ready(true);
        debug!("game {}: {} placed a random fleet", self.id, self.player(seat).name());
        Ok(())
    }

    /// Mark the seat ready and try to start. Returns whether the game started.
    pub fn set_player_ready(&mut self, seat: Seat) -> Result<bool, GameError> {
        self.require_setup()?;
        self.player_mut(seat).set_ready(true);
        Ok(self.start_game())
    }

    /// Move from setup to play once both players are ready. The first seat
    /// keeps the move.
    pub fn start_game(&mut self) -> bool {
        if self.state != GameState::Setup || !self.player1.is_ready() || !self.player2.is_ready() {
            return false;
        }
        self.state = GameState::InProgress;
        self.started_at = Some(SystemTime::now());
        info!(
            "game {} started: {} vs {}",
            self.id,
            self.player1.name(),
            self.player2.name()
        );
        true
    }

    /// Fire the current player's shot at the opponent's board.
    ///
    /// The turn passes to the other player after every accepted shot, the
    /// game-ending one included; a finished game accepts no further shots so
    /// the final switch has no effect.
    pub fn process_shot(&mut self, x: usize, y: usize) -> Result<Shot, GameError> {
        if self.state != GameState::InProgress {
            return Err(GameError::NotInProgress(self.state));
        }
        let shooter = self.current;
        let opponent = self.player_mut(shooter.other());
        let shot = opponent.board_mut().receive_shot(x, y)?;
        let sunk = shot.sunk_ship().is_some();
        if sunk {
            opponent.ship_sunk();
        }
        let opponent_lost = opponent.has_lost();
        self.player_mut(shooter).record_shot(shot.result().is_hit());
        debug!(
            "game {}: {} fired at ({x}, {y}): {:?}",
            self.id,
            self.player(shooter).name(),
            shot.result()
        );
        if sunk && opponent_lost {
            self.end_game(shooter);
        }
        self.switch_turn();
        Ok(shot)
    }

    fn switch_turn(&mut self) {
        self.current = self.current.other();
        self.turn_count += 1;
    }

    fn end_game(&mut self, winner: Seat) {
        self.winner = Some(winner);
        self.state = GameState::Finished;
        self.finished_at = Some(SystemTime::now());
        info!(
            "game {} finished after {} shots, winner {}",
            self.id,
            self.turn_count + 1,
            self.player(winner).name()
        );
    }

    /// Abandon the game from any non-terminal state.
    pub fn cancel_game(&mut self) -> Result<(), GameError> {
        if self.state.is_terminal() {
            return Err(GameError::GameOver(self.state));
        }
        self.state = GameState::Cancelled;
        self.finished_at = Some(SystemTime::now());
        info!("game {} cancelled", self.id);
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn player(&self, seat: Seat) -> &Player {
        match seat {
            Seat::First => &self.player1,
            Seat::Second => &self.player2,
        }
    }

    pub(crate) fn player_mut(&mut self, seat: Seat) -> &mut Player {
        match seat {
            Seat::First => &mut self.player1,
            Seat::Second => &mut self.player2,
        }
    }

    pub fn player1(&self) -> &Player {
        &self.player1
    }

    pub fn player2(&self) -> &Player {
        &self.player2
    }

    /// Seat of the player with `id`, if they are part of this game.
    pub fn seat_of(&self, id: PlayerId) -> Option<Seat> {
        if self.player1.id() == id {
            Some(Seat::First)
        } else if self.player2.id() == id {
            Some(Seat::Second)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, seat: Seat) -> &Player {
        self.player(seat.other())
    }

    pub fn current_seat(&self) -> Seat {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    pub fn winner_seat(&self) -> Option<Seat> {
        self.winner
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|seat| self.player(seat))
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }
}
