//! Game-state engine for two-player naval combat on a hidden 10×10 grid.
//!
//! The core (`cell` → `ship` → `board` → `player` → `game`) is synchronous and
//! free of I/O. [`GameRegistry`] keeps many games in memory behind per-game
//! locks; with the `net` feature the same surface is served over TCP.

mod board;
mod cell;
mod common;
mod config;
pub mod domain;
mod game;
mod logging;
mod player;
mod registry;
mod ship;
mod shot;

#[cfg(feature = "net")]
pub mod engine_api;
#[cfg(feature = "net")]
pub mod protocol;
#[cfg(feature = "net")]
pub mod skeleton;
#[cfg(feature = "net")]
pub mod stub;
#[cfg(feature = "net")]
pub mod transport;

pub use board::*;
pub use cell::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use logging::{init_logging, BroadsideLogger};
pub use player::*;
pub use registry::*;
pub use ship::*;
pub use shot::*;

#[cfg(feature = "net")]
pub use engine_api::{error_kind, GameApi, RemoteError};
#[cfg(feature = "net")]
pub use protocol::{Message, Request, Response, PROTOCOL_VERSION};
#[cfg(feature = "net")]
pub use skeleton::{handle_request, serve, Skeleton};
#[cfg(feature = "net")]
pub use stub::Stub;
#[cfg(feature = "net")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, ConnectionClosed, Transport};
