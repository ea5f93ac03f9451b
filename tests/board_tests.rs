use broadside::{
    Board, BoardError, ErrorKind, Orientation, Ship, ShipType, ShotResult, BOARD_SIZE, FLEET,
    PLACEMENT_ATTEMPTS,
};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Generator stuck at zero: every random placement lands on (0, 0) vertically.
struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

fn touching(a: &Ship, b: &Ship) -> bool {
    a.cells().iter().any(|&(ax, ay)| {
        b.cells()
            .iter()
            .any(|&(bx, by)| ax.abs_diff(bx) <= 1 && ay.abs_diff(by) <= 1)
    })
}

fn assert_fleet_valid(board: &Board) {
    for ship in board.ships().iter().filter(|s| s.is_placed()) {
        let cells = ship.cells();
        assert_eq!(cells.len(), ship.size());
        let placement = ship.placement().unwrap();
        let (dx, dy) = placement.orientation.step();
        for (i, &(x, y)) in cells.iter().enumerate() {
            assert!(x < BOARD_SIZE && y < BOARD_SIZE);
            assert_eq!((x, y), (placement.x + dx * i, placement.y + dy * i));
        }
    }
    let ships = board.ships();
    for (i, a) in ships.iter().enumerate() {
        for b in &ships[i + 1..] {
            assert!(!touching(a, b), "{:?} touches {:?}", a.ship_type(), b.ship_type());
        }
    }
}

#[test]
fn test_overlap_and_adjacency_rejected() -> Result<(), BoardError> {
    let mut board = Board::new();
    let carrier = board.create_ship(ShipType::Carrier)?;
    assert!(board.place_ship(carrier, 0, 0, Orientation::Horizontal)?);
    let cells: Vec<_> = board.ship(carrier).unwrap().cells().to_vec();
    assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);

    let cruiser = board.create_ship(ShipType::Cruiser)?;
    assert!(!board.place_ship(cruiser, 0, 0, Orientation::Horizontal)?);
    assert!(!board.place_ship(cruiser, 1, 0, Orientation::Horizontal)?);
    // directly below and diagonally below the carrier
    assert!(!board.place_ship(cruiser, 0, 1, Orientation::Horizontal)?);
    assert!(!board.place_ship(cruiser, 5, 1, Orientation::Vertical)?);
    assert!(!board.ship(cruiser).unwrap().is_placed());

    assert!(board.place_ship(cruiser, 5, 5, Orientation::Horizontal)?);
    assert_fleet_valid(&board);
    Ok(())
}

#[test]
fn test_one_gap_is_enough() -> Result<(), BoardError> {
    let mut board = Board::new();
    let carrier = board.create_ship(ShipType::Carrier)?;
    assert!(board.place_ship(carrier, 0, 0, Orientation::Horizontal)?);
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 6, 0, Orientation::Horizontal)?);
    let battleship = board.create_ship(ShipType::Battleship)?;
    assert!(board.place_ship(battleship, 0, 2, Orientation::Horizontal)?);
    assert_fleet_valid(&board);
    Ok(())
}

#[test]
fn test_out_of_bounds_placement() -> Result<(), BoardError> {
    let mut board = Board::new();
    let carrier = board.create_ship(ShipType::Carrier)?;
    assert!(!board.place_ship(carrier, 6, 0, Orientation::Horizontal)?);
    assert!(!board.place_ship(carrier, 0, 6, Orientation::Vertical)?);
    assert!(!board.place_ship(carrier, BOARD_SIZE, 0, Orientation::Vertical)?);
    assert!(!board.place_ship(carrier, usize::MAX, 0, Orientation::Horizontal)?);
    assert!(board.place_ship(carrier, 5, 0, Orientation::Horizontal)?);
    assert!(board.cells().filter(|c| c.is_occupied()).count() == 5);
    Ok(())
}

#[test]
fn test_create_ship_rules() -> Result<(), BoardError> {
    let mut board = Board::new();
    board.create_ship(ShipType::Destroyer)?;
    assert_eq!(
        board.create_ship(ShipType::Destroyer).unwrap_err(),
        BoardError::DuplicateShipType(ShipType::Destroyer)
    );
    assert_eq!(
        board.available_ship_types(),
        vec![
            ShipType::Carrier,
            ShipType::Battleship,
            ShipType::Cruiser,
            ShipType::Submarine
        ]
    );
    board.initialize_all_ships()?;
    assert_eq!(board.ships().len(), 5);
    assert!(board.available_ship_types().is_empty());
    assert!(!board.all_ships_placed());
    Ok(())
}

#[test]
fn test_place_twice_and_foreign_ship() -> Result<(), BoardError> {
    let mut board = Board::new();
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 3, 3, Orientation::Horizontal)?);
    assert_eq!(
        board.place_ship(destroyer, 7, 7, Orientation::Horizontal).unwrap_err(),
        BoardError::ShipAlreadyPlaced(ShipType::Destroyer)
    );

    let mut other = Board::new();
    let foreign = other.create_ship(ShipType::Carrier)?;
    assert_eq!(
        board.place_ship(foreign, 0, 8, Orientation::Horizontal).unwrap_err(),
        BoardError::UnknownShip
    );
    Ok(())
}

#[test]
fn test_destroyer_hit_and_sink() -> Result<(), BoardError> {
    let mut board = Board::new();
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 3, 3, Orientation::Horizontal)?);

    assert_eq!(board.shoot_at(0, 0)?.result(), ShotResult::Miss);
    let hit = board.shoot_at(3, 3)?;
    assert_eq!(hit.result(), ShotResult::Hit);
    assert_eq!(hit.sunk_ship(), None);
    let sunk = board.shoot_at(4, 3)?;
    assert_eq!(sunk.result(), ShotResult::Sunk);
    assert_eq!(sunk.sunk_ship(), Some(ShipType::Destroyer));
    assert_eq!((sunk.x(), sunk.y()), (4, 3));
    assert!(board.ship(destroyer).unwrap().is_sunk());

    let sunk_types: Vec<_> = board.sunk_ships().map(|s| s.ship_type()).collect();
    assert_eq!(sunk_types, vec![ShipType::Destroyer]);
    assert_eq!(board.shots_fired().len(), 3);
    assert!(board.shots_received().is_empty());
    Ok(())
}

#[test]
fn test_repeat_and_out_of_bounds_shots() -> Result<(), BoardError> {
    let mut board = Board::new();
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 3, 3, Orientation::Horizontal)?);
    board.shoot_at(3, 3)?;
    board.shoot_at(9, 9)?;

    assert_eq!(board.shoot_at(3, 3).unwrap_err(), BoardError::AlreadyShot { x: 3, y: 3 });
    assert_eq!(board.receive_shot(9, 9).unwrap_err(), BoardError::AlreadyShot { x: 9, y: 9 });
    assert_eq!(
        board.shoot_at(BOARD_SIZE, 0).unwrap_err(),
        BoardError::OutOfBounds { x: BOARD_SIZE, y: 0 }
    );
    assert_eq!(board.ship(destroyer).unwrap().hit_count(), 1);
    assert_eq!(board.shots_fired().len(), 2);
    assert!(board.shots_received().is_empty());
    Ok(())
}

#[test]
fn test_receive_shot_records_both_histories() -> Result<(), BoardError> {
    let mut board = Board::new();
    let shot = board.receive_shot(4, 4)?;
    assert_eq!(shot.result(), ShotResult::Miss);
    assert_eq!(board.shots_received(), &[shot.clone()]);
    assert_eq!(board.shots_fired(), &[shot]);
    Ok(())
}

#[test]
fn test_random_placement_full_fleet() -> Result<(), BoardError> {
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        board.randomly_place_all_ships(&mut rng)?;
        assert!(board.all_ships_placed());
        let types: Vec<_> = board.ships().iter().map(|s| s.ship_type()).collect();
        assert_eq!(types, FLEET.to_vec());
        assert_fleet_valid(&board);
        assert_eq!(board.cells().filter(|c| c.is_occupied()).count(), 17);
    }
    Ok(())
}

#[test]
fn test_random_placement_keeps_manual_ships() -> Result<(), BoardError> {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut board = Board::new();
    let carrier = board.create_ship(ShipType::Carrier)?;
    assert!(board.place_ship(carrier, 0, 9, Orientation::Horizontal)?);
    board.create_ship(ShipType::Submarine)?;

    board.randomly_place_all_ships(&mut rng)?;
    assert!(board.all_ships_placed());
    assert_eq!(
        board.ship(carrier).unwrap().cells(),
        &[(0, 9), (1, 9), (2, 9), (3, 9), (4, 9)]
    );
    assert_fleet_valid(&board);
    Ok(())
}

#[test]
fn test_random_placement_exhaustion_leaves_board_untouched() -> Result<(), BoardError> {
    let mut board = Board::new();
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 8, 8, Orientation::Horizontal)?);
    let before = board.to_string();

    // the carrier fits at (0, 0); the battleship then never does
    let err = board.randomly_place_all_ships(&mut ZeroRng).unwrap_err();
    assert_eq!(err, BoardError::PlacementExhausted(ShipType::Battleship, PLACEMENT_ATTEMPTS));
    assert_eq!(err.kind(), ErrorKind::ConfigurationFault);

    assert_eq!(board.to_string(), before);
    assert_eq!(board.ships().len(), 1);
    assert!(board.ship_by_type(ShipType::Carrier).is_none());
    assert_eq!(board.cells().filter(|c| c.is_occupied()).count(), 2);
    Ok(())
}

#[test]
fn test_all_ships_sunk() -> Result<(), BoardError> {
    let mut rng = SmallRng::seed_from_u64(99);
    let mut board = Board::new();
    board.randomly_place_all_ships(&mut rng)?;
    let targets: Vec<(usize, usize)> = board
        .ships()
        .iter()
        .flat_map(|s| s.cells().to_vec())
        .collect();
    let mut sinks = 0;
    for (x, y) in targets {
        if board.receive_shot(x, y)?.result() == ShotResult::Sunk {
            sinks += 1;
        }
    }
    assert_eq!(sinks, 5);
    assert!(board.all_ships_sunk());
    assert_eq!(board.sunk_ships().count(), 5);
    Ok(())
}

#[test]
fn test_display_owner_view() -> Result<(), BoardError> {
    let mut board = Board::new();
    let destroyer = board.create_ship(ShipType::Destroyer)?;
    assert!(board.place_ship(destroyer, 0, 0, Orientation::Horizontal)?);
    board.shoot_at(0, 0)?;
    board.shoot_at(0, 1)?;
    let text = board.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), BOARD_SIZE + 1);
    assert!(lines[1].starts_with(" 0 X #"));
    assert!(lines[2].starts_with(" 1 o ~"));
    Ok(())
}
