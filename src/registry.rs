//! In-memory registry of games keyed by generated id.
//!
//! Every game sits behind its own mutex: the whole of an operation on one game
//! (turn check, shot, turn switch) runs inside a single critical section,
//! while operations on different games never wait for each other. The outer
//! map lock is only held long enough to clone a handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::common::ErrorKind;
use crate::domain::{BoardView, GameSummary};
use crate::game::{Game, GameError, GameId, GameState, Seat};
use crate::player::PlayerId;
use crate::ship::{Orientation, ShipType};
use crate::shot::Shot;

/// Shared handle to one game.
pub type GameHandle = Arc<Mutex<Game>>;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("player {player} is not in game {game}")]
    PlayerNotInGame { game: GameId, player: PlayerId },
    #[error("not player {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("registry lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::GameNotFound(_) | RegistryError::PlayerNotInGame { .. } => {
                ErrorKind::NotFound
            }
            RegistryError::NotYourTurn(_) => ErrorKind::IllegalState,
            RegistryError::Game(e) => e.kind(),
            RegistryError::LockPoisoned => ErrorKind::ConfigurationFault,
        }
    }
}

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, GameHandle>>,
    players: RwLock<HashMap<PlayerId, GameId>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a game between two new players.
    pub fn create_game(
        &self,
        player1_name: &str,
        player2_name: &str,
    ) -> Result<GameSummary, RegistryError> {
        let game = Game::new(player1_name, player2_name);
        let id = game.id();
        let summary = GameSummary::from(&game);
        {
            let mut players = self.players.write().map_err(|_| RegistryError::LockPoisoned)?;
            players.insert(summary.player1.id, id);
            players.insert(summary.player2.id, id);
        }
        self.games
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?
            .insert(id, Arc::new(Mutex::new(game)));
        info!("created game {id}: {player1_name} vs {player2_name}");
        Ok(summary)
    }

    /// Handle to the game with `id`, if registered.
    pub fn game(&self, id: GameId) -> Option<GameHandle> {
        self.games.read().ok()?.get(&id).cloned()
    }

    /// Game a player was created for.
    pub fn game_of_player(&self, player: PlayerId) -> Option<GameId> {
        self.players.read().ok()?.get(&player).copied()
    }

    /// Run `f` with exclusive access to one game.
    pub fn with_game<T>(
        &self,
        id: GameId,
        f: impl FnOnce(&mut Game) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let handle = self
            .games
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::GameNotFound(id))?;
        let mut game = handle.lock().map_err(|_| RegistryError::LockPoisoned)?;
        f(&mut game)
    }

    fn seat(game: &Game, player: PlayerId) -> Result<Seat, RegistryError> {
        game.seat_of(player).ok_or(RegistryError::PlayerNotInGame {
            game: game.id(),
            player,
        })
    }

    pub fn summary(&self, id: GameId) -> Result<GameSummary, RegistryError> {
        self.with_game(id, |game| Ok(GameSummary::from(&*game)))
    }

    /// The player's own board and their view of the opponent's board.
    pub fn board_views(
        &self,
        id: GameId,
        player: PlayerId,
    ) -> Result<(BoardView, BoardView), RegistryError> {
        self.with_game(id, |game| {
            let seat = Self::seat(game, player)?;
            Ok((
                BoardView::owner(game.player(seat).board()),
                BoardView::target(game.opponent_of(seat).board()),
            ))
        })
    }

    pub fn place_ship(
        &self,
        id: GameId,
        player: PlayerId,
        ship_type: ShipType,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<bool, RegistryError> {
        self.with_game(id, |game| {
            let seat = Self::seat(game, player)?;
            Ok(game.place_ship(seat, ship_type, x, y, orientation)?)
        })
    }

    /// Random full-fleet placement using the thread-local generator. Marks the
    /// player ready.
    pub fn random_place_ships(&self, id: GameId, player: PlayerId) -> Result<(), RegistryError> {
        self.random_place_ships_with(id, player, &mut rand::rng())
    }

    /// Random full-fleet placement, reproducible when `seed` is given.
    pub fn random_place_ships_seeded(
        &self,
        id: GameId,
        player: PlayerId,
        seed: Option<u64>,
    ) -> Result<(), RegistryError> {
        match seed {
            Some(seed) => {
                self.random_place_ships_with(id, player, &mut SmallRng::seed_from_u64(seed))
            }
            None => self.random_place_ships(id, player),
        }
    }

    pub fn random_place_ships_with<R: Rng>(
        &self,
        id: GameId,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<(), RegistryError> {
        self.with_game(id, |game| {
            let seat = Self::seat(game, player)?;
            Ok(game.random_place_ships(seat, rng)?)
        })
    }

    /// Mark a player ready; returns whether this started the game.
    pub fn set_player_ready(&self, id: GameId, player: PlayerId) -> Result<bool, RegistryError> {
        self.with_game(id, |game| {
            let seat = Self::seat(game, player)?;
            Ok(game.set_player_ready(seat)?)
        })
    }

    /// Fire a shot on behalf of `player`, who must hold the move.
    pub fn fire_shot(
        &self,
        id: GameId,
        player: PlayerId,
        x: usize,
        y: usize,
    ) -> Result<Shot, RegistryError> {
        self.with_game(id, |game| {
            let seat = Self::seat(game, player)?;
            if game.state() != GameState::InProgress {
                return Err(GameError::NotInProgress(game.state()).into());
            }
            if game.current_seat() != seat {
                warn!("game {id}: rejected out-of-turn shot from {player}");
                return Err(RegistryError::NotYourTurn(player));
            }
            Ok(game.process_shot(x, y)?)
        })
    }

    pub fn cancel_game(&self, id: GameId) -> Result<(), RegistryError> {
        self.with_game(id, |game| Ok(game.cancel_game()?))
    }

    /// Summaries of every registered game, oldest first.
    pub fn games(&self) -> Result<Vec<GameSummary>, RegistryError> {
        let handles: Vec<GameHandle> = self
            .games
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?
            .values()
            .cloned()
            .collect();
        let mut summaries = handles
            .iter()
            .map(|handle| {
                let game = handle.lock().map_err(|_| RegistryError::LockPoisoned)?;
                Ok(GameSummary::from(&*game))
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        summaries.sort_by_key(|s| s.created_at);
        Ok(summaries)
    }

    pub fn len(&self) -> usize {
        self.games.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
