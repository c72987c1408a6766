//! Persistence collaborator
//!
//! The engine talks to its backing store through [`Store`], a key-value
//! contract with Redis-like semantics: hashes with atomic increments, sorted
//! sets for scores, raw bitmaps for the spatial index and lists for logs.

pub mod memory;

pub use memory::MemoryStore;

use crate::core::error::Result;
use crate::core::types::{Coord, WorldId};
use crate::spatial::bitmap::{Category, ChunkCoord};

/// Key-value store operations the engine depends on
pub trait Store: Send + Sync {
    fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Set a hash field; returns true if the field was newly created
    fn hset(&self, key: &str, field: &str, value: String) -> Result<bool>;

    /// Set a hash field only if absent; returns false if it already existed
    fn hsetnx(&self, key: &str, field: &str, value: String) -> Result<bool>;

    fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// Atomically add `by` to an integer hash field, returning the new value
    fn hincrby(&self, key: &str, field: &str, by: i64) -> Result<i64>;

    fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Members by descending score, `start..=stop` (inclusive, zero-based)
    fn zrevrange(&self, key: &str, start: usize, stop: usize) -> Result<Vec<(String, f64)>>;

    /// Set one bit (MSB-first within each byte); returns the previous value
    fn setbit(&self, key: &str, offset: u64, value: bool) -> Result<bool>;

    fn getbit(&self, key: &str, offset: u64) -> Result<bool>;

    /// Raw buffer read; `None` for keys never written
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Push onto the head of a list, returning the new length
    fn lpush(&self, key: &str, value: String) -> Result<usize>;

    /// List elements `start..=stop` from the head
    fn lrange(&self, key: &str, start: usize, stop: usize) -> Result<Vec<String>>;

    /// Every key beginning with `prefix`
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Names for everything the engine persists
#[derive(Debug, Clone)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn worlds(&self) -> String {
        format!("{}:worlds", self.prefix)
    }

    pub fn avatars(&self) -> String {
        format!("{}:avatars", self.prefix)
    }

    pub fn grid(&self, world: &WorldId) -> String {
        format!("{}:grid:{}", self.prefix, world)
    }

    pub fn block_field(coord: Coord) -> String {
        format!("{}:{}", coord.x, coord.y)
    }

    pub fn count_field(coord: Coord) -> String {
        format!("{}:{}:count", coord.x, coord.y)
    }

    pub fn bitmap(&self, world: &WorldId, category: Category, chunk: ChunkCoord) -> String {
        format!(
            "{}:bitmap:{}:{}:{}:{}",
            self.prefix,
            world,
            category.as_str(),
            chunk.cx,
            chunk.cy
        )
    }

    pub fn scores(&self, category: &str) -> String {
        format!("{}:scores:{}", self.prefix, category)
    }

    pub fn counters(&self) -> String {
        format!("{}:counters", self.prefix)
    }

    pub fn chat(&self, channel: &str) -> String {
        format!("{}:chat:{}", self.prefix, channel)
    }

    pub fn feedback(&self) -> String {
        format!("{}:feedback", self.prefix)
    }
}
