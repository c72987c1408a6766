//! In-process store backend with JSON snapshots

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::path::Path;

use crate::core::error::{FaunaError, Result};
use crate::store::Store;

/// Sorted set: member -> score plus an ordered index for range reads
#[derive(Debug, Default)]
struct ZSet {
    scores: AHashMap<String, f64>,
    order: BTreeSet<(OrderedFloat<f64>, String)>,
}

impl ZSet {
    fn insert(&mut self, member: &str, score: f64) {
        if let Some(old) = self.scores.insert(member.to_string(), score) {
            self.order.remove(&(OrderedFloat(old), member.to_string()));
        }
        self.order.insert((OrderedFloat(score), member.to_string()));
    }
}

#[derive(Debug, Default)]
struct Inner {
    hashes: AHashMap<String, AHashMap<String, String>>,
    bitmaps: AHashMap<String, Vec<u8>>,
    zsets: AHashMap<String, ZSet>,
    lists: AHashMap<String, VecDeque<String>>,
}

/// On-disk form of the whole store
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    hashes: AHashMap<String, AHashMap<String, String>>,
    bitmaps: AHashMap<String, Vec<u8>>,
    zsets: AHashMap<String, AHashMap<String, f64>>,
    lists: AHashMap<String, Vec<String>>,
}

/// Store backend holding everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store previously written by [`MemoryStore::save_snapshot`]
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        let mut inner = Inner {
            hashes: snapshot.hashes,
            bitmaps: snapshot.bitmaps,
            ..Inner::default()
        };
        for (key, members) in snapshot.zsets {
            let zset = inner.zsets.entry(key).or_default();
            for (member, score) in members {
                zset.insert(&member, score);
            }
        }
        inner.lists = snapshot
            .lists
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect();

        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Write the whole store to `path` as JSON
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = {
            let inner = self.inner.read();
            Snapshot {
                hashes: inner.hashes.clone(),
                bitmaps: inner.bitmaps.clone(),
                zsets: inner
                    .zsets
                    .iter()
                    .map(|(k, z)| (k.clone(), z.scores.clone()))
                    .collect(),
                lists: inner
                    .lists
                    .iter()
                    .map(|(k, l)| (k.clone(), l.iter().cloned().collect()))
                    .collect(),
            }
        };
        let json = serde_json::to_string(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Byte index and in-byte mask for a bit offset (MSB first)
fn bit_position(offset: u64) -> (usize, u8) {
    ((offset / 8) as usize, 0x80 >> (offset % 8))
}

impl Store for MemoryStore {
    fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let inner = self.inner.read();
        Ok(inner.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    fn hset(&self, key: &str, field: &str, value: String) -> Result<bool> {
        let mut inner = self.inner.write();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        Ok(hash.insert(field.to_string(), value).is_none())
    }

    fn hsetnx(&self, key: &str, field: &str, value: String) -> Result<bool> {
        let mut inner = self.inner.write();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value);
        Ok(true)
    }

    fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let inner = self.inner.read();
        Ok(inner
            .hashes
            .get(key)
            .map(|h| h.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn hincrby(&self, key: &str, field: &str, by: i64) -> Result<i64> {
        let mut inner = self.inner.write();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        let current = match hash.get(field) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                FaunaError::Store(format!("{}/{} holds a non-integer value", key, field))
            })?,
            None => 0,
        };
        let next = current + by;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut inner = self.inner.write();
        inner
            .zsets
            .entry(key.to_string())
            .or_default()
            .insert(member, score);
        Ok(())
    }

    fn zrevrange(&self, key: &str, start: usize, stop: usize) -> Result<Vec<(String, f64)>> {
        let inner = self.inner.read();
        let Some(zset) = inner.zsets.get(key) else {
            return Ok(Vec::new());
        };
        if stop < start {
            return Ok(Vec::new());
        }
        Ok(zset
            .order
            .iter()
            .rev()
            .skip(start)
            .take(stop - start + 1)
            .map(|(score, member)| (member.clone(), score.0))
            .collect())
    }

    fn setbit(&self, key: &str, offset: u64, value: bool) -> Result<bool> {
        let (byte, mask) = bit_position(offset);
        let mut inner = self.inner.write();

        // Clearing a bit on a bitmap that was never written is a no-op
        if !value && !inner.bitmaps.contains_key(key) {
            return Ok(false);
        }

        let buf = inner.bitmaps.entry(key.to_string()).or_default();
        if buf.len() <= byte {
            buf.resize(byte + 1, 0);
        }
        let previous = buf[byte] & mask != 0;
        if value {
            buf[byte] |= mask;
        } else {
            buf[byte] &= !mask;
        }
        Ok(previous)
    }

    fn getbit(&self, key: &str, offset: u64) -> Result<bool> {
        let (byte, mask) = bit_position(offset);
        let inner = self.inner.read();
        Ok(inner
            .bitmaps
            .get(key)
            .and_then(|buf| buf.get(byte))
            .map(|b| b & mask != 0)
            .unwrap_or(false))
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read();
        Ok(inner.bitmaps.get(key).cloned())
    }

    fn lpush(&self, key: &str, value: String) -> Result<usize> {
        let mut inner = self.inner.write();
        let list = inner.lists.entry(key.to_string()).or_default();
        list.push_front(value);
        Ok(list.len())
    }

    fn lrange(&self, key: &str, start: usize, stop: usize) -> Result<Vec<String>> {
        let inner = self.inner.read();
        if stop < start {
            return Ok(Vec::new());
        }
        Ok(inner
            .lists
            .get(key)
            .map(|l| l.iter().skip(start).take(stop - start + 1).cloned().collect())
            .unwrap_or_default())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let mut keys: Vec<String> = inner
            .hashes
            .keys()
            .chain(inner.bitmaps.keys())
            .chain(inner.zsets.keys())
            .chain(inner.lists.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
