use thiserror::Error;

use crate::core::types::{AvatarId, Coord, WorldId};

#[derive(Error, Debug)]
pub enum FaunaError {
    #[error("Avatar not found: {0}")]
    AvatarNotFound(AvatarId),

    #[error("World not found: {0}")]
    WorldNotFound(WorldId),

    #[error("Malformed world id: {0:?}")]
    InvalidWorldId(String),

    #[error("Malformed avatar id: {0:?}")]
    InvalidAvatarId(String),

    #[error("Avatar {avatar} is in world {from} and cannot enter world {to}")]
    WorldChange {
        avatar: AvatarId,
        from: WorldId,
        to: WorldId,
    },

    #[error("Invalid world parameters: {0}")]
    InvalidWorldParams(String),

    #[error("Coordinate {coord} is outside the world (limit {limit})")]
    CoordOutOfBounds { coord: Coord, limit: i64 },

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown score category: {0}")]
    UnknownScoreCategory(String),

    #[error("Bounding box {from} -> {to} covers {area} blocks (limit {limit})")]
    BoundingBoxTooLarge {
        from: Coord,
        to: Coord,
        area: u64,
        limit: u64,
    },

    #[error("Corrupt record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Write queue closed before the op was flushed")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FaunaError>;
