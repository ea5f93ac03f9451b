//! Wire messages for driving a [`GameRegistry`](crate::GameRegistry) over a
//! [`Transport`](crate::transport::Transport).

use serde::{Deserialize, Serialize};

use crate::common::ErrorKind;
use crate::domain::{BoardView, GameSummary};
use crate::game::GameId;
use crate::player::PlayerId;
use crate::ship::{Orientation, ShipType};
use crate::shot::Shot;

/// Current protocol version. Peers must match exactly.
pub const PROTOCOL_VERSION: u16 = 1;

/// Operations a client can ask the server to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    CreateGame {
        player1: String,
        player2: String,
    },
    GetGame {
        game: GameId,
    },
    ListGames,
    PlaceShip {
        game: GameId,
        player: PlayerId,
        ship_type: ShipType,
        x: u8,
        y: u8,
        orientation: Orientation,
    },
    RandomPlacement {
        game: GameId,
        player: PlayerId,
        seed: Option<u64>,
    },
    Ready {
        game: GameId,
        player: PlayerId,
    },
    FireShot {
        game: GameId,
        player: PlayerId,
        x: u8,
        y: u8,
    },
    CancelGame {
        game: GameId,
    },
    Boards {
        game: GameId,
        player: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Game(GameSummary),
    Games(Vec<GameSummary>),
    Placed(bool),
    Ready { started: bool },
    Shot(Shot),
    Boards { own: BoardView, target: BoardView },
    Ack,
    Error { kind: ErrorKind, message: String },
}

/// Frames exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Opens a session (sent by the client).
    Handshake { version: u16 },
    HandshakeAck { version: u16 },
    /// Client request; the response echoes `seq`.
    Request { seq: u64, body: Request },
    Response { seq: u64, body: Response },
}
