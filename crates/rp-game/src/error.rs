//! Error types for the game layer

use std::path::PathBuf;

use rp_reel::{ReelError, RingError};
use thiserror::Error;

use crate::io::Clip;

/// Invalid or unreadable installation configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("ring for reel {reel}: {source}")]
    Ring {
        reel: usize,
        #[source]
        source: RingError,
    },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("{field} has {got} entries but the machine has {expected} reels")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{field}: symbol '{symbol}' is not on the ring of reel {reel}")]
    UnknownSymbol {
        field: &'static str,
        symbol: char,
        reel: usize,
    },

    #[error("a losing spin can land on win symbol '{symbol}' of reel {reel}; add it to game.denylist")]
    WinSymbolReachable { symbol: char, reel: usize },

    #[error("asset not found: {0}")]
    MissingAsset(PathBuf),

    #[error(transparent)]
    Engine(#[from] ReelError),
}

/// Failure inside an external collaborator.
///
/// The session logs these and carries on; they never reach the tick loop.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no clip loaded for {0:?}")]
    UnknownClip(Clip),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("GPIO error: {0}")]
    Gpio(String),
}

/// Result type alias
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias
pub type DeviceResult<T> = Result<T, DeviceError>;
