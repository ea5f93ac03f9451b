//! Ship definitions: the fixed fleet types, orientation and per-ship hit
//! accounting.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Orientation of a ship on the board.
///
/// Horizontal ships extend towards increasing `x`, vertical ships towards
/// increasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Unit step `(dx, dy)` along the ship's axis.
    pub fn step(self) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

/// The five ship classes of the standard fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipType {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipType {
    /// Number of cells a ship of this type occupies.
    pub const fn size(self) -> usize {
        match self {
            ShipType::Carrier => 5,
            ShipType::Battleship => 4,
            ShipType::Cruiser | ShipType::Submarine => 3,
            ShipType::Destroyer => 2,
        }
    }

    /// Ship's name.
    pub const fn name(self) -> &'static str {
        match self {
            ShipType::Carrier => "Carrier",
            ShipType::Battleship => "Battleship",
            ShipType::Cruiser => "Cruiser",
            ShipType::Submarine => "Submarine",
            ShipType::Destroyer => "Destroyer",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a ship within the board that created it.
///
/// Cells refer to their ship through this handle; the board owns both. A
/// handle is only accepted by the board that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipId {
    pub(crate) board: u64,
    pub(crate) index: usize,
}

impl ShipId {
    /// Position of the ship in its board's creation order.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Where a placed ship starts and which way it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub orientation: Orientation,
}

/// A fleet member. Created unplaced by [`Board::create_ship`], placed at most
/// once, then sunk once every occupied cell has been hit.
///
/// [`Board::create_ship`]: crate::Board::create_ship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    id: ShipId,
    ship_type: ShipType,
    placement: Option<Placement>,
    cells: Vec<(usize, usize)>,
    hits: usize,
    sunk: bool,
}

impl Ship {
    pub(crate) fn new(id: ShipId, ship_type: ShipType) -> Self {
        Self {
            id,
            ship_type,
            placement: None,
            cells: Vec::with_capacity(ship_type.size()),
            hits: 0,
            sunk: false,
        }
    }

    /// Record the placement and the cells it covers. The board validates the
    /// geometry before calling this.
    pub(crate) fn place(&mut self, placement: Placement, cells: Vec<(usize, usize)>) {
        self.placement = Some(placement);
        self.cells = cells;
    }

    /// Count one hit; the ship sinks once every segment has been struck.
    pub fn register_hit(&mut self) {
        if self.hits < self.size() {
            self.hits += 1;
        }
        if self.hits >= self.size() {
            self.sunk = true;
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn size(&self) -> usize {
        self.ship_type.size()
    }

    pub fn is_placed(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn is_sunk(&self) -> bool {
        self.sunk
    }

    pub fn hit_count(&self) -> usize {
        self.hits
    }

    /// Start position and orientation, once placed.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Occupied cells as `(x, y)`, in order from the start position.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.cells.contains(&(x, y))
    }
}
