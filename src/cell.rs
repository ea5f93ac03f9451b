//! A single grid position and its occupancy/shot state.

use serde::{Deserialize, Serialize};

use crate::common::BoardError;
use crate::ship::{Ship, ShipId};

/// Occupancy and shot state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// No ship, not shot.
    Empty,
    /// Ship segment, not shot.
    Ship,
    /// Ship segment, shot.
    Hit,
    /// No ship, shot.
    Miss,
}

/// What a shot did to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShot {
    /// The cell held a segment of the given ship.
    Hit(ShipId),
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    x: usize,
    y: usize,
    state: CellState,
    ship: Option<ShipId>,
}

impl Cell {
    pub(crate) fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            state: CellState::Empty,
            ship: None,
        }
    }

    /// Mark the cell as holding a segment of `ship`. A cell is occupied at
    /// most once.
    pub(crate) fn place_ship(&mut self, ship: ShipId) -> Result<(), BoardError> {
        if self.state != CellState::Empty {
            return Err(BoardError::CellOccupied {
                x: self.x,
                y: self.y,
            });
        }
        self.state = CellState::Ship;
        self.ship = Some(ship);
        Ok(())
    }

    /// Fire at this cell, notifying the occupying ship (looked up in `ships`)
    /// of the hit. A cell that was already shot is left untouched.
    pub(crate) fn shoot(&mut self, ships: &mut [Ship]) -> Result<CellShot, BoardError> {
        match self.state {
            CellState::Hit | CellState::Miss => Err(BoardError::AlreadyShot {
                x: self.x,
                y: self.y,
            }),
            CellState::Ship => {
                let id = self.ship.ok_or(BoardError::UnknownShip)?;
                let ship = ships.get_mut(id.index()).ok_or(BoardError::UnknownShip)?;
                self.state = CellState::Hit;
                ship.register_hit();
                Ok(CellShot::Hit(id))
            }
            CellState::Empty => {
                self.state = CellState::Miss;
                Ok(CellShot::Miss)
            }
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    /// Ship occupying this cell, if any.
    pub fn ship(&self) -> Option<ShipId> {
        self.ship
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self.state, CellState::Ship | CellState::Hit)
    }

    pub fn is_shot(&self) -> bool {
        matches!(self.state, CellState::Hit | CellState::Miss)
    }
}
