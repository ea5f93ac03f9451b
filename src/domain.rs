//! Serializable read-only views of engine state, handed to collaborators
//! outside the per-game lock.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::CellState;
use crate::game::{Game, GameId, GameState};
use crate::player::{Player, PlayerId, PlayerStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
    pub ships_placed: usize,
    pub stats: PlayerStats,
    pub accuracy: f64,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        PlayerSummary {
            id: player.id(),
            name: player.name().to_string(),
            ready: player.is_ready(),
            ships_placed: player.board().ships().iter().filter(|s| s.is_placed()).count(),
            stats: player.stats(),
            accuracy: player.accuracy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub state: GameState,
    pub player1: PlayerSummary,
    pub player2: PlayerSummary,
    pub current_player: PlayerId,
    pub winner: Option<PlayerId>,
    pub turn_count: u32,
    pub created_at: SystemTime,
    pub started_at: Option<SystemTime>,
    pub finished_at: Option<SystemTime>,
}

impl From<&Game> for GameSummary {
    fn from(game: &Game) -> Self {
        GameSummary {
            id: game.id(),
            state: game.state(),
            player1: PlayerSummary::from(game.player1()),
            player2: PlayerSummary::from(game.player2()),
            current_player: game.current_player().id(),
            winner: game.winner().map(Player::id),
            turn_count: game.turn_count(),
            created_at: game.created_at(),
            started_at: game.started_at(),
            finished_at: game.finished_at(),
        }
    }
}

/// What one cell looks like to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    /// Open water, or an intact ship the viewer may not see.
    Unknown,
    Ship,
    Hit,
    Miss,
}

/// Grid snapshot, rows indexed by `y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub rows: Vec<Vec<CellView>>,
}

impl BoardView {
    /// Owner's view, intact ships visible.
    pub fn owner(board: &Board) -> Self {
        Self::build(board, true)
    }

    /// Opponent's view: only shot results are revealed.
    pub fn target(board: &Board) -> Self {
        Self::build(board, false)
    }

    fn build(board: &Board, reveal_ships: bool) -> Self {
        let mut rows: Vec<Vec<CellView>> = Vec::new();
        for cell in board.cells() {
            if cell.x() == 0 {
                rows.push(Vec::new());
            }
            let view = match cell.state() {
                CellState::Hit => CellView::Hit,
                CellState::Miss => CellView::Miss,
                CellState::Ship if reveal_ships => CellView::Ship,
                CellState::Ship | CellState::Empty => CellView::Unknown,
            };
            if let Some(row) = rows.last_mut() {
                row.push(view);
            }
        }
        BoardView { rows }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<CellView> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }
}
