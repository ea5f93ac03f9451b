//! The 10×10 grid owning cells and ships: fleet creation, placement
//! validation and shot application.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use rand::Rng;

use crate::cell::{Cell, CellShot, CellState};
use crate::common::{BoardError, ShotResult};
use crate::config::{BOARD_SIZE, FLEET, MAX_SHIPS, PLACEMENT_ATTEMPTS};
use crate::ship::{Orientation, Placement, Ship, ShipId, ShipType};
use crate::shot::Shot;

static NEXT_BOARD_TAG: AtomicU64 = AtomicU64::new(1);

type Grid = [[Cell; BOARD_SIZE]; BOARD_SIZE];

/// A player's board: cells indexed by `(x, y)`, the ships created on it and
/// the history of shots fired from and received at it.
#[derive(Clone)]
pub struct Board {
    tag: u64,
    grid: Grid,
    ships: Vec<Ship>,
    sunk: Vec<ShipId>,
    shots_fired: Vec<Shot>,
    shots_received: Vec<Shot>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (no ships created, no shots).
    pub fn new() -> Self {
        let grid = core::array::from_fn(|y| core::array::from_fn(|x| Cell::new(x, y)));
        Board {
            tag: NEXT_BOARD_TAG.fetch_add(1, Ordering::Relaxed),
            grid,
            ships: Vec::with_capacity(MAX_SHIPS),
            sunk: Vec::new(),
            shots_fired: Vec::new(),
            shots_received: Vec::new(),
        }
    }

    fn is_valid_coordinate(x: usize, y: usize) -> bool {
        x < BOARD_SIZE && y < BOARD_SIZE
    }

    /// Cells a ship of `size` would cover from `(x, y)`, or `None` if any of
    /// them falls off the board.
    fn footprint(
        x: usize,
        y: usize,
        size: usize,
        orientation: Orientation,
    ) -> Option<Vec<(usize, usize)>> {
        let (dx, dy) = orientation.step();
        (0..size)
            .map(|i| {
                let cx = x.checked_add(dx * i)?;
                let cy = y.checked_add(dy * i)?;
                Self::is_valid_coordinate(cx, cy).then_some((cx, cy))
            })
            .collect()
    }

    /// The up to eight in-bounds neighbours of `(x, y)`, diagonals included.
    fn neighbours(x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        (-1isize..=1)
            .flat_map(|dy| (-1isize..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                Self::is_valid_coordinate(nx, ny).then_some((nx, ny))
            })
    }

    fn can_place(&self, cells: &[(usize, usize)]) -> bool {
        if cells.iter().any(|&(x, y)| self.grid[y][x].is_occupied()) {
            return false;
        }
        // None of the candidate cells is occupied yet, so any occupied
        // neighbour belongs to a different ship.
        cells.iter().all(|&(x, y)| {
            Self::neighbours(x, y).all(|(nx, ny)| {
                !self.grid[ny][nx].is_occupied() || cells.contains(&(nx, ny))
            })
        })
    }

    fn ship_index(&self, ship: ShipId) -> Result<usize, BoardError> {
        if ship.board != self.tag || ship.index >= self.ships.len() {
            return Err(BoardError::UnknownShip);
        }
        Ok(ship.index)
    }

    /// Add a new, unplaced ship of `ship_type` to the fleet.
    pub fn create_ship(&mut self, ship_type: ShipType) -> Result<ShipId, BoardError> {
        if self.ships.iter().any(|s| s.ship_type() == ship_type) {
            return Err(BoardError::DuplicateShipType(ship_type));
        }
        if self.ships.len() >= MAX_SHIPS {
            return Err(BoardError::CapacityExceeded);
        }
        let id = ShipId {
            board: self.tag,
            index: self.ships.len(),
        };
        self.ships.push(Ship::new(id, ship_type));
        Ok(id)
    }

    /// Ship types not yet created on this board, in fleet order.
    pub fn available_ship_types(&self) -> Vec<ShipType> {
        FLEET
            .iter()
            .copied()
            .filter(|t| !self.ships.iter().any(|s| s.ship_type() == *t))
            .collect()
    }

    /// Create every fleet type that does not exist yet.
    pub fn initialize_all_ships(&mut self) -> Result<(), BoardError> {
        for ship_type in self.available_ship_types() {
            self.create_ship(ship_type)?;
        }
        Ok(())
    }

    /// Place a ship created by this board.
    ///
    /// Returns `Ok(false)` without touching the board when the ship would leave
    /// the grid, overlap another ship or touch one (diagonals included).
    pub fn place_ship(
        &mut self,
        ship: ShipId,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<bool, BoardError> {
        let index = self.ship_index(ship)?;
        let target = &self.ships[index];
        if target.is_placed() {
            return Err(BoardError::ShipAlreadyPlaced(target.ship_type()));
        }
        let Some(cells) = Self::footprint(x, y, target.size(), orientation) else {
            return Ok(false);
        };
        if !self.can_place(&cells) {
            return Ok(false);
        }
        for &(cx, cy) in &cells {
            self.grid[cy][cx].place_ship(ship)?;
        }
        self.ships[index].place(Placement { x, y, orientation }, cells);
        Ok(true)
    }

    /// Create any missing fleet types and place every unplaced ship at random.
    ///
    /// Each ship gets [`PLACEMENT_ATTEMPTS`] tries at a uniformly random cell and
    /// orientation. Placement happens on a scratch copy: if any ship runs out
    /// of attempts the board is left exactly as it was.
    pub fn randomly_place_all_ships<R: Rng>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        let mut scratch = self.clone();
        scratch.initialize_all_ships()?;
        for index in 0..scratch.ships.len() {
            let ship = &scratch.ships[index];
            if ship.is_placed() {
                continue;
            }
            let (id, ship_type) = (ship.id(), ship.ship_type());
            let mut placed = false;
            for _ in 0..PLACEMENT_ATTEMPTS {
                let x = rng.random_range(0..BOARD_SIZE);
                let y = rng.random_range(0..BOARD_SIZE);
                let orientation = if rng.random() {
                    Orientation::Horizontal
                } else {
                    Orientation::Vertical
                };
                if scratch.place_ship(id, x, y, orientation)? {
                    placed = true;
                    break;
                }
            }
            if !placed {
                warn!("random placement of {ship_type} exhausted {PLACEMENT_ATTEMPTS} attempts");
                return Err(BoardError::PlacementExhausted(ship_type, PLACEMENT_ATTEMPTS));
            }
        }
        *self = scratch;
        Ok(())
    }

    /// Fire at `(x, y)` on this board and record the shot in the fired history.
    pub fn shoot_at(&mut self, x: usize, y: usize) -> Result<Shot, BoardError> {
        let cell = self
            .grid
            .get_mut(y)
            .and_then(|row| row.get_mut(x))
            .ok_or(BoardError::OutOfBounds { x, y })?;
        let shot = match cell.shoot(&mut self.ships)? {
            CellShot::Hit(id) => {
                let ship = &self.ships[id.index];
                if ship.is_sunk() {
                    if !self.sunk.contains(&id) {
                        self.sunk.push(id);
                    }
                    Shot::sunk(x, y, ship.ship_type())
                } else {
                    Shot::new(x, y, ShotResult::Hit)
                }
            }
            CellShot::Miss => Shot::new(x, y, ShotResult::Miss),
        };
        self.shots_fired.push(shot.clone());
        Ok(shot)
    }

    /// Entry point for an opponent's shot: same validation and effect as
    /// [`Board::shoot_at`], additionally recorded in the received history.
    pub fn receive_shot(&mut self, x: usize, y: usize) -> Result<Shot, BoardError> {
        let shot = self.shoot_at(x, y)?;
        self.shots_received.push(shot.clone());
        Ok(shot)
    }

    pub fn cell(&self, x: usize, y: usize) -> Result<&Cell, BoardError> {
        self.grid
            .get(y)
            .and_then(|row| row.get(x))
            .ok_or(BoardError::OutOfBounds { x, y })
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ship_index(id).ok().map(|i| &self.ships[i])
    }

    pub fn ship_by_type(&self, ship_type: ShipType) -> Option<&Ship> {
        self.ships.iter().find(|s| s.ship_type() == ship_type)
    }

    /// Ships in creation order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Sunk ships in the order they went down.
    pub fn sunk_ships(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.sunk.iter().map(|id| &self.ships[id.index])
    }

    pub fn shots_fired(&self) -> &[Shot] {
        &self.shots_fired
    }

    pub fn shots_received(&self) -> &[Shot] {
        &self.shots_received
    }

    pub fn all_ships_placed(&self) -> bool {
        self.ships.len() == MAX_SHIPS && self.ships.iter().all(Ship::is_placed)
    }

    pub fn all_ships_sunk(&self) -> bool {
        self.sunk.len() == MAX_SHIPS
    }

    /// Row-major iterator over every cell.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.grid.iter().flatten()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("ships", &self.ships)
            .field("sunk", &self.sunk)
            .field("shots_fired", &self.shots_fired.len())
            .field("shots_received", &self.shots_received.len())
            .finish()
    }
}

/// Owner's view: ships visible.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, " {x}")?;
        }
        writeln!(f)?;
        for (y, row) in self.grid.iter().enumerate() {
            write!(f, "{y:2}")?;
            for cell in row {
                let ch = match cell.state() {
                    CellState::Empty => '~',
                    CellState::Ship => '#',
                    CellState::Hit => 'X',
                    CellState::Miss => 'o',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
