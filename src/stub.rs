//! Client side of the protocol: a [`GameApi`] that forwards every call to a
//! remote [`Skeleton`](crate::Skeleton).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::ErrorKind;
use crate::domain::{BoardView, GameSummary};
use crate::engine_api::{GameApi, RemoteError};
use crate::game::GameId;
use crate::player::PlayerId;
use crate::protocol::{Message, Request, Response, PROTOCOL_VERSION};
use crate::ship::{Orientation, ShipType};
use crate::shot::Shot;
use crate::transport::Transport;

pub struct Stub<T: Transport> {
    transport: Mutex<T>,
    next_seq: AtomicU64,
    handshaken: AtomicBool,
}

impl<T: Transport> Stub<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            next_seq: AtomicU64::new(0),
            handshaken: AtomicBool::new(false),
        }
    }

    async fn handshake(transport: &mut T) -> anyhow::Result<()> {
        transport
            .send(Message::Handshake {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match transport.recv().await? {
            Message::HandshakeAck { version } if version == PROTOCOL_VERSION => Ok(()),
            Message::HandshakeAck { version } => Err(anyhow!(
                "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow!("Expected HandshakeAck, got {:?}", other)),
        }
    }

    /// Send one request and wait for its response. The transport lock is held
    /// for the round trip so responses cannot interleave.
    async fn call(&self, body: Request) -> anyhow::Result<Response> {
        let mut transport = self.transport.lock().await;
        if !self.handshaken.load(Ordering::SeqCst) {
            Self::handshake(&mut *transport).await?;
            self.handshaken.store(true, Ordering::SeqCst);
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        transport.send(Message::Request { seq, body }).await?;
        match transport.recv().await? {
            Message::Response { seq: resp_seq, .. } if resp_seq != seq => Err(anyhow!(
                "Sequence mismatch: expected {}, got {}",
                seq,
                resp_seq
            )),
            Message::Response {
                body: Response::Error { kind, message },
                ..
            } => Err(RemoteError { kind, message }.into()),
            Message::Response { body, .. } => Ok(body),
            other => Err(anyhow!("Expected Response, got {:?}", other)),
        }
    }
}

fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("Unexpected response: {:?}", response)
}

#[async_trait]
impl<T: Transport> GameApi for Stub<T> {
    async fn create_game(&self, player1: &str, player2: &str) -> anyhow::Result<GameSummary> {
        let request = Request::CreateGame {
            player1: player1.to_string(),
            player2: player2.to_string(),
        };
        match self.call(request).await? {
            Response::Game(summary) => Ok(summary),
            other => Err(unexpected(other)),
        }
    }

    async fn game(&self, game: GameId) -> anyhow::Result<Option<GameSummary>> {
        match self.call(Request::GetGame { game }).await {
            Ok(Response::Game(summary)) => Ok(Some(summary)),
            Ok(other) => Err(unexpected(other)),
            Err(e) => {
                let not_found = e
                    .downcast_ref::<RemoteError>()
                    .is_some_and(|remote| remote.kind == ErrorKind::NotFound);
                if not_found {
                    Ok(None)
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn games(&self) -> anyhow::Result<Vec<GameSummary>> {
        match self.call(Request::ListGames).await? {
            Response::Games(games) => Ok(games),
            other => Err(unexpected(other)),
        }
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
        let request = Request::PlaceShip {
            game,
            player,
            ship_type,
            x,
            y,
            orientation,
        };
        match self.call(request).await? {
            Response::Placed(placed) => Ok(placed),
            other => Err(unexpected(other)),
        }
    }

    async fn random_placement(
        &self,
        game: GameId,
        player: PlayerId,
        seed: Option<u64>,
    ) -> anyhow::Result<()> {
        match self.call(Request::RandomPlacement { game, player, seed }).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn set_ready(&self, game: GameId, player: PlayerId) -> anyhow::Result<bool> {
        match self.call(Request::Ready { game, player }).await? {
            Response::Ready { started } => Ok(started),
            other => Err(unexpected(other)),
        }
    }

    async fn fire_shot(
        &self,
        game: GameId,
        player: PlayerId,
        x: u8,
        y: u8,
    ) -> anyhow::Result<Shot> {
        match self.call(Request::FireShot { game, player, x, y }).await? {
            Response::Shot(shot) => Ok(shot),
            other => Err(unexpected(other)),
        }
    }

    async fn cancel_game(&self, game: GameId) -> anyhow::Result<()> {
        match self.call(Request::CancelGame { game }).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn boards(
        &self,
        game: GameId,
        player: PlayerId,
    ) -> anyhow::Result<(BoardView, BoardView)> {
        match self.call(Request::Boards { game, player }).await? {
            Response::Boards { own, target } => Ok((own, target)),
            other => Err(unexpected(other)),
        }
    }
}
