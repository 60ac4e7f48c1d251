use std::collections::HashSet;

use letter_battleship::board::{check_attack, generate_board, select_attack};
use letter_battleship::config::ALPHABET;
use letter_battleship::{Board, BoardError, Coordinate};
use rand::{rngs::SmallRng, SeedableRng};

#[test]
fn full_alphabet_on_default_board() {
    let mut rng = SmallRng::seed_from_u64(12345);
    let board = generate_board(&mut rng, 10, &ALPHABET).unwrap();
    assert_eq!(board.len(), 26);
    let letters: HashSet<char> = board.placement().values().copied().collect();
    assert_eq!(letters.len(), 26);
    for key in board.placement().keys() {
        let coord: Coordinate = key.parse().unwrap();
        assert!(coord.within(10), "{} is off the board", key);
    }
}

#[test]
fn board_that_is_exactly_full() {
    let mut rng = SmallRng::seed_from_u64(1);
    let board = generate_board(&mut rng, 1, &['A', 'B', 'C', 'D']).unwrap();
    assert_eq!(board.len(), 4);
}

#[test]
fn too_many_pieces_is_rejected() {
    let mut rng = SmallRng::seed_from_u64(1);
    let err = generate_board(&mut rng, 1, &['A', 'B', 'C', 'D', 'E']).unwrap_err();
    assert_eq!(err, BoardError::TooManyPieces { pieces: 5, cells: 4 });
}

#[test]
fn duplicate_piece_is_rejected() {
    let mut rng = SmallRng::seed_from_u64(1);
    let err = generate_board(&mut rng, 10, &['A', 'B', 'A']).unwrap_err();
    assert_eq!(err, BoardError::DuplicatePiece('A'));
}

#[test]
fn explicit_placement_checks() {
    let err = Board::from_placement(10, [(Coordinate::new(11, 0), 'A')]).unwrap_err();
    assert_eq!(err, BoardError::OutOfBounds("11-0".to_string()));

    let err = Board::from_placement(
        10,
        [(Coordinate::new(2, 3), 'A'), (Coordinate::new(2, 3), 'B')],
    )
    .unwrap_err();
    assert_eq!(err, BoardError::OccupiedCoordinate("2-3".to_string()));
}

#[test]
fn check_attack_is_a_lookup() {
    let board = Board::from_placement(10, [(Coordinate::new(3, 7), 'K')]).unwrap();
    assert_eq!(check_attack(&Coordinate::new(3, 7), &board), Some('K'));
    assert_eq!(check_attack(&Coordinate::new(7, 3), &board), None);
    assert_eq!(check_attack(&Coordinate::new(3, 7), &board), Some('K'));
}

#[test]
fn select_attack_on_exhausted_board() {
    let mut rng = SmallRng::seed_from_u64(9);
    let history: Vec<Coordinate> = (0..=2u8)
        .flat_map(|x| (0..=2u8).map(move |y| Coordinate::new(x, y)))
        .collect();
    assert_eq!(
        select_attack(&mut rng, &history, 2).unwrap_err(),
        BoardError::Exhausted
    );
}

#[test]
fn attacking_every_cell_once() {
    let mut rng = SmallRng::seed_from_u64(77);
    let mut history = Vec::new();
    for _ in 0..121 {
        let target = select_attack(&mut rng, &history, 10).unwrap();
        assert!(!history.contains(&target));
        history.push(target);
    }
    assert!(select_attack(&mut rng, &history, 10).is_err());
}
