//! Common error types shared by the board service, the runtime and the actors.

use crate::domain::ActorId;

/// Errors returned by the board service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinate lies outside the board.
    OutOfBounds(String),
    /// More pieces requested than the board has cells.
    TooManyPieces { pieces: usize, cells: usize },
    /// The same piece was supplied twice.
    DuplicatePiece(char),
    /// Two pieces were placed on one coordinate.
    OccupiedCoordinate(String),
    /// Every cell of the board has already been attacked.
    Exhausted,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::OutOfBounds(key) => write!(f, "Coordinate {} is off the board", key),
            BoardError::TooManyPieces { pieces, cells } => write!(
                f,
                "Cannot place {} pieces on a board with {} cells",
                pieces, cells
            ),
            BoardError::DuplicatePiece(piece) => write!(f, "Piece {} was supplied twice", piece),
            BoardError::OccupiedCoordinate(key) => {
                write!(f, "Coordinate {} already holds a piece", key)
            }
            BoardError::Exhausted => write!(f, "Every coordinate has already been attacked"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Errors that end an actor or a whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A leaf operation failed on every attempt.
    ActivityFailed {
        activity: &'static str,
        attempts: u32,
        reason: String,
    },
    /// The actor was cancelled by its parent.
    Cancelled { actor: ActorId },
    /// The actor task panicked or was aborted.
    ActorPanicked { actor: ActorId, reason: String },
    /// An envelope carried an unknown protocol version.
    ProtocolVersion { expected: u8, got: u8 },
    /// Configuration failed validation.
    InvalidConfig(String),
    /// The checkpoint journal could not be read or written.
    Journal(String),
}

impl core::fmt::Display for GameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GameError::ActivityFailed {
                activity,
                attempts,
                reason,
            } => write!(
                f,
                "Activity {} failed after {} attempt(s): {}",
                activity, attempts, reason
            ),
            GameError::Cancelled { actor } => write!(f, "Actor {} was cancelled", actor),
            GameError::ActorPanicked { actor, reason } => {
                write!(f, "Actor {} terminated abnormally: {}", actor, reason)
            }
            GameError::ProtocolVersion { expected, got } => write!(
                f,
                "Protocol version mismatch: expected {}, got {}",
                expected, got
            ),
            GameError::InvalidConfig(reason) => write!(f, "Invalid configuration: {}", reason),
            GameError::Journal(reason) => write!(f, "Journal error: {}", reason),
        }
    }
}

impl std::error::Error for GameError {}
