//! Common types shared across the engine: shot results, error kinds and
//! board-level errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ship::ShipType;

/// Outcome of a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotResult {
    /// Shot struck a ship segment that was still afloat.
    Hit,
    /// Shot landed in open water.
    Miss,
    /// Shot struck the last intact segment of a ship.
    Sunk,
}

impl ShotResult {
    /// `true` for anything other than a miss.
    pub fn is_hit(self) -> bool {
        !matches!(self, ShotResult::Miss)
    }
}

/// Coarse classification of every error the engine can produce.
///
/// Outer layers map these to their own response conventions without having to
/// match on concrete error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown game, or player not part of the game.
    NotFound,
    /// Bad coordinates, duplicate ship type, repeated shot.
    InvalidArgument,
    /// Operation not allowed in the current state.
    IllegalState,
    /// Internal invariant violated; not caused by the caller.
    ConfigurationFault,
}

/// Errors returned by board, cell and ship operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("coordinates ({x}, {y}) are out of bounds")]
    OutOfBounds { x: usize, y: usize },
    #[error("cell ({x}, {y}) has already been shot at")]
    AlreadyShot { x: usize, y: usize },
    #[error("a ship of type {0} has already been added")]
    DuplicateShipType(ShipType),
    #[error("all ships have already been added to the board")]
    CapacityExceeded,
    #[error("ship does not belong to this board")]
    UnknownShip,
    #[error("{0} has already been placed")]
    ShipAlreadyPlaced(ShipType),
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },
    #[error("could not place {0} after {1} attempts")]
    PlacementExhausted(ShipType, usize),
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::OutOfBounds { .. }
            | BoardError::AlreadyShot { .. }
            | BoardError::DuplicateShipType(_)
            | BoardError::UnknownShip => ErrorKind::InvalidArgument,
            BoardError::CapacityExceeded
            | BoardError::ShipAlreadyPlaced(_)
            | BoardError::CellOccupied { .. } => ErrorKind::IllegalState,
            BoardError::PlacementExhausted(..) => ErrorKind::ConfigurationFault,
        }
    }
}
