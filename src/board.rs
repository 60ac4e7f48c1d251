//! Board service: letter placement, attack selection and hit lookup.
//!
//! A board of size `n` covers every coordinate with `0 <= x, y <= n`, so a
//! size-10 board has 121 cells. All functions here are pure apart from the
//! caller-supplied random number generator.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::BoardError;

/// A cell on the board. Serializes to the canonical `"x-y"` key for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: u8,
    pub y: u8,
}

impl Coordinate {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Canonical map key, e.g. `"3-7"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.x, self.y)
    }

    /// Whether the coordinate lies on a board of the given size.
    pub fn within(&self, size: u8) -> bool {
        self.x <= size && self.y <= size
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("coordinate key {:?} is not of the form x-y", s))?;
        Ok(Coordinate {
            x: x.trim().parse()?,
            y: y.trim().parse()?,
        })
    }
}

/// A player's letter placement. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: u8,
    placement: BTreeMap<String, char>,
}

impl Board {
    /// Build a board from explicit placements, rejecting overlaps and
    /// out-of-range coordinates.
    pub fn from_placement<I>(size: u8, pieces: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (Coordinate, char)>,
    {
        let mut placement = BTreeMap::new();
        let mut seen = HashSet::new();
        for (coord, piece) in pieces {
            if !coord.within(size) {
                return Err(BoardError::OutOfBounds(coord.key()));
            }
            if !seen.insert(piece) {
                return Err(BoardError::DuplicatePiece(piece));
            }
            let key = coord.key();
            if placement.contains_key(&key) {
                return Err(BoardError::OccupiedCoordinate(key));
            }
            placement.insert(key, piece);
        }
        Ok(Self { size, placement })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Mapping from coordinate key to the piece placed there.
    pub fn placement(&self) -> &BTreeMap<String, char> {
        &self.placement
    }

    /// Number of placed pieces.
    pub fn len(&self) -> usize {
        self.placement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placement.is_empty()
    }

    pub fn piece_at(&self, coord: &Coordinate) -> Option<char> {
        self.placement.get(&coord.key()).copied()
    }
}

/// Number of addressable cells on a board of the given size.
pub fn cell_count(size: u8) -> usize {
    let side = size as usize + 1;
    side * side
}

fn random_coordinate<R: Rng + ?Sized>(rng: &mut R, size: u8) -> Coordinate {
    Coordinate {
        x: rng.random_range(0..=size),
        y: rng.random_range(0..=size),
    }
}

/// Place every piece on a distinct random coordinate, in input order.
///
/// Draws are rejected until an unused cell comes up; there is no attempt
/// limit because the piece count is checked against the cell count first.
pub fn generate_board<R: Rng + ?Sized>(
    rng: &mut R,
    size: u8,
    pieces: &[char],
) -> Result<Board, BoardError> {
    let cells = cell_count(size);
    if pieces.len() > cells {
        return Err(BoardError::TooManyPieces {
            pieces: pieces.len(),
            cells,
        });
    }
    let mut seen = HashSet::with_capacity(pieces.len());
    if let Some(dup) = pieces.iter().find(|p| !seen.insert(**p)) {
        return Err(BoardError::DuplicatePiece(*dup));
    }

    let mut placement = BTreeMap::new();
    for &piece in pieces {
        loop {
            let key = random_coordinate(rng, size).key();
            if !placement.contains_key(&key) {
                placement.insert(key, piece);
                break;
            }
        }
    }
    Ok(Board { size, placement })
}

/// Pick a random coordinate not present in `history`.
pub fn select_attack<R: Rng + ?Sized>(
    rng: &mut R,
    history: &[Coordinate],
    board_size: u8,
) -> Result<Coordinate, BoardError> {
    let tried: HashSet<&Coordinate> = history.iter().filter(|c| c.within(board_size)).collect();
    if tried.len() >= cell_count(board_size) {
        return Err(BoardError::Exhausted);
    }
    let mut attempts = 1usize;
    loop {
        let attack = random_coordinate(rng, board_size);
        if !tried.contains(&attack) {
            log::debug!("Found attack after {} attempts: {}", attempts, attack);
            return Ok(attack);
        }
        attempts += 1;
    }
}

/// Return the piece placed at `target`, if any.
pub fn check_attack(target: &Coordinate, board: &Board) -> Option<char> {
    board.piece_at(target)
}
