use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;
use crate::config::MAX_SHIPS;

/// Generated unique player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl core::str::FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Running shot statistics for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub shots_missed: u32,
    pub ships_remaining: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            shots_fired: 0,
            shots_hit: 0,
            shots_missed: 0,
            ships_remaining: MAX_SHIPS as u32,
        }
    }
}

impl PlayerStats {
    /// Hit percentage; zero before the first shot.
    pub fn accuracy(&self) -> f64 {
        if self.shots_fired == 0 {
            return 0.0;
        }
        f64::from(self.shots_hit) / f64::from(self.shots_fired) * 100.0
    }
}

/// A participant: identity, exclusively-owned board, readiness and stats.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    board: Board,
    ready: bool,
    stats: PlayerStats,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            board: Board::new(),
            ready: false,
            stats: PlayerStats::default(),
        }
    }

    /// Count a shot this player fired.
    pub fn record_shot(&mut self, hit: bool) {
        self.stats.shots_fired += 1;
        if hit {
            self.stats.shots_hit += 1;
        } else {
            self.stats.shots_missed += 1;
        }
    }

    /// One of this player's ships went down.
    pub fn ship_sunk(&mut self) {
        self.stats.ships_remaining = self.stats.ships_remaining.saturating_sub(1);
    }

    pub fn has_lost(&self) -> bool {
        self.stats.ships_remaining == 0
    }

    pub fn accuracy(&self) -> f64 {
        self.stats.accuracy()
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }
}
