//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::error::{FaunaError, Result};

/// Unique identifier for avatars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AvatarId(pub Uuid);

impl AvatarId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied avatar id (hyphenated UUID, version 0-5)
    pub fn parse(raw: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(raw.trim())
            .map_err(|_| FaunaError::InvalidAvatarId(raw.to_string()))?;
        if uuid.get_version_num() > 5 {
            return Err(FaunaError::InvalidAvatarId(raw.to_string()));
        }
        Ok(Self(uuid))
    }
}

impl Default for AvatarId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AvatarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for generated items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// World identity: lowercase hex SHA-256 of the creation parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(String);

impl WorldId {
    pub const LEN: usize = 64;

    /// Validate and wrap a client-supplied world id
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.len() == Self::LEN
            && raw.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(FaunaError::InvalidWorldId(raw.to_string()))
        }
    }

    /// Wrap a digest that is already known to be well formed
    pub(crate) fn from_digest(hex: String) -> Self {
        debug_assert_eq!(hex.len(), Self::LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer block coordinate within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Saturates at `u64::MAX` for points at opposite corners of `i64`
    pub fn manhattan(&self, other: &Coord) -> u64 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Saturating step; stops at the edge of `i64` space
    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Both axes within `-limit..=limit`
    pub fn within(&self, limit: i64) -> bool {
        self.x.unsigned_abs() <= limit.unsigned_abs() && self.y.unsigned_abs() <= limit.unsigned_abs()
    }

    /// Row-major ordering key (y first, then x)
    pub fn row_major(&self) -> (i64, i64) {
        (self.y, self.x)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An avatar's placement: world plus coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub coord: Coord,
}

/// Wall-clock milliseconds since the unix epoch
pub type Timestamp = i64;

pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
