use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::common::ShotResult;
use crate::ship::ShipType;

/// Immutable record of one shot and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    x: usize,
    y: usize,
    result: ShotResult,
    timestamp: SystemTime,
    sunk_ship: Option<ShipType>,
}

impl Shot {
    pub(crate) fn new(x: usize, y: usize, result: ShotResult) -> Self {
        Self {
            x,
            y,
            result,
            timestamp: SystemTime::now(),
            sunk_ship: None,
        }
    }

    pub(crate) fn sunk(x: usize, y: usize, ship: ShipType) -> Self {
        Self {
            sunk_ship: Some(ship),
            ..Self::new(x, y, ShotResult::Sunk)
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn result(&self) -> ShotResult {
        self.result
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The ship this shot sank; only present when the result is
    /// [`ShotResult::Sunk`].
    pub fn sunk_ship(&self) -> Option<ShipType> {
        self.sunk_ship
    }
}
