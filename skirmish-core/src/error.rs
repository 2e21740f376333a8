//! Error taxonomy for move rejection and session setup.
//!
//! All of these are recoverable: they reject a single request and leave the
//! session untouched. None is fatal to the process.

use thiserror::Error;

/// Reasons a move request is rejected.
///
/// Returned as a value, never raised; the rejecting participant receives the
/// specific reason while the other participant sees nothing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("no piece at the source cell")]
    NoPieceAtSource,

    #[error("destination is off the board")]
    OutOfBounds,

    #[error("that piece cannot reach the destination")]
    IllegalGeometry,

    #[error("destination holds one of your own pieces")]
    FriendlyFire,

    #[error("path is blocked by one of your own pieces")]
    BlockedByFriendly,

    #[error("not your turn")]
    NotYourTurn,

    #[error("game is already over")]
    GameAlreadyOver,
}

/// Reasons a session cannot be created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid roster: {0}")]
    InvalidRoster(String),
}
