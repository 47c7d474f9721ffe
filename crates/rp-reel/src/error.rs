//! Error types for the reel engine

use thiserror::Error;

/// Errors raised while building a symbol ring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingError {
    #[error("a symbol ring needs at least one symbol")]
    Empty,

    #[error("symbol '{0}' appears more than once in the ring")]
    DuplicateSymbol(char),
}

/// Errors raised by spin requests and target resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReelError {
    /// Requested target symbol is not part of the reel's ring
    #[error("symbol '{0}' is not on the ring")]
    UnknownSymbol(char),

    /// Spin requested while a previous spin is still in progress
    #[error("machine is already spinning")]
    AlreadySpinning,

    #[error("fractional target {0} is outside [0, 1)")]
    InvalidFraction(f64),

    #[error("settle duration {duration} for reel {reel} must be finite and non-negative")]
    InvalidDuration { reel: usize, duration: f64 },

    #[error("{name} must be finite and positive, got {value}")]
    InvalidSpeed { name: &'static str, value: f64 },

    #[error("spin request covers {got} reels but the machine has {expected}")]
    ReelCountMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Ring(#[from] RingError),
}

/// Result type alias
pub type ReelResult<T> = Result<T, ReelError>;
