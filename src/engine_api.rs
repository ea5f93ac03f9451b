use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::ErrorKind;
use crate::domain::{BoardView, GameSummary};
use crate::game::GameId;
use crate::player::PlayerId;
use crate::registry::{GameRegistry, RegistryError};
use crate::ship::{Orientation, ShipType};
use crate::shot::Shot;

/// Error reported by a remote peer, carrying the engine's error kind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Engine error kind behind an `anyhow` error, whether it was raised locally
/// or reported by a peer.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<RegistryError>() {
        return Some(e.kind());
    }
    err.downcast_ref::<RemoteError>().map(|e| e.kind)
}

/// The registry's operation surface, implemented locally by [`GameRegistry`]
/// and remotely by [`Stub`](crate::Stub).
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn create_game(&self, player1: &str, player2: &str) -> anyhow::Result<GameSummary>;
    async fn game(&self, game: GameId) -> anyhow::Result<Option<GameSummary>>;
    async fn games(&self) -> anyhow::Result<Vec<GameSummary>>;
    async fn place_ship(
        &self,
        game: GameId,
        player: PlayerId,
        ship_type: ShipType,
        x: u8,
        y: u8,
        orientation: Orientation,
    ) -> anyhow::Result<bool>;
    /// Place a random full fleet for `player`; a `seed` makes the layout
    /// reproducible.
    async fn random_placement(
        &self,
        game: GameId,
        player: PlayerId,
        seed: Option<u64>,
    ) -> anyhow::Result<()>;
    async fn set_ready(&self, game: GameId, player: PlayerId) -> anyhow::Result<bool>;
    async fn fire_shot(&self, game: GameId, player: PlayerId, x: u8, y: u8)
        -> anyhow::Result<Shot>;
    async fn cancel_game(&self, game: GameId) -> anyhow::Result<()>;
    async fn boards(&self, game: GameId, player: PlayerId)
        -> anyhow::Result<(BoardView, BoardView)>;
}

#[async_trait]
impl GameApi for GameRegistry {
    async fn create_game(&self, player1: &str, player2: &str) -> anyhow::Result<GameSummary> {
        Ok(GameRegistry::create_game(self, player1, player2)?)
    }

    async fn game(&self, game: GameId) -> anyhow::Result<Option<GameSummary>> {
        match self.summary(game) {
            Ok(summary) => Ok(Some(summary)),
            Err(RegistryError::GameNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn games(&self) -> anyhow::Result<Vec<GameSummary>> {
        Ok(GameRegistry::games(self)?)
    }

    async fn place_ship(
        &self,
        game: GameId,
        player: PlayerId,
        ship_type: ShipType,
        x: u8,
        y: u8,
        orientation: Orientation,
    ) -> anyhow::Result<bool> {
        Ok(GameRegistry::place_ship(
            self,
            game,
            player,
            ship_type,
            x.into(),
            y.into(),
            orientation,
        )?)
    }

    async fn random_placement(
        &self,
        game: GameId,
        player: PlayerId,
        seed: Option<u64>,
    ) -> anyhow::Result<()> {
        Ok(self.random_place_ships_seeded(game, player, seed)?)
    }

    async fn set_ready(&self, game: GameId, player: PlayerId) -> anyhow::Result<bool> {
        Ok(self.set_player_ready(game, player)?)
    }

    async fn fire_shot(
        &self,
        game: GameId,
        player: PlayerId,
        x: u8,
        y: u8,
    ) -> anyhow::Result<Shot> {
        Ok(GameRegistry::fire_shot(self, game, player, x.into(), y.into())?)
    }

    async fn cancel_game(&self, game: GameId) -> anyhow::Result<()> {
        Ok(GameRegistry::cancel_game(self, game)?)
    }

    async fn boards(
        &self,
        game: GameId,
        player: PlayerId,
    ) -> anyhow::Result<(BoardView, BoardView)> {
        Ok(self.board_views(game, player)?)
    }
}
