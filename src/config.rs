use crate::ship::ShipType;

pub const BOARD_SIZE: usize = 10;
pub const MAX_SHIPS: usize = 5;
pub const FLEET: [ShipType; MAX_SHIPS] = [
    ShipType::Carrier,
    ShipType::Battleship,
    ShipType::Cruiser,
    ShipType::Submarine,
    ShipType::Destroyer,
];

/// Total number of ship segments used in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Random placement attempts allowed per ship before giving up.
pub const PLACEMENT_ATTEMPTS: usize = 100;

/// Parse a ship type from its display name or upper-case identifier.
pub fn ship_type_by_name(name: &str) -> Option<ShipType> {
    FLEET
        .iter()
        .copied()
        .find(|t| t.name().eq_ignore_ascii_case(name))
}
