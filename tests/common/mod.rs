//! Store wrapper that fails chosen calls on demand

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use fauna::core::FaunaError;
use fauna::store::{MemoryStore, Store};

#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    /// Counter field whose increments fail
    failing_counter: Mutex<Option<String>>,
    /// Fail raw bitmap reads (bounding box scans)
    failing_scans: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_counter(&self, field: &str) {
        *self.failing_counter.lock() = Some(field.to_string());
    }

    pub fn fail_scans(&self, fail: bool) {
        self.failing_scans.store(fail, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        *self.failing_counter.lock() = None;
        self.fail_scans(false);
    }
}

fn outage() -> FaunaError {
    FaunaError::Store("connection reset".into())
}

impl Store for FaultyStore {
    fn hget(&self, key: &str, field: &str) -> fauna::Result<Option<String>> {
        self.inner.hget(key, field)
    }
    fn hset(&self, key: &str, field: &str, value: String) -> fauna::Result<bool> {
        self.inner.hset(key, field, value)
    }
    fn hsetnx(&self, key: &str, field: &str, value: String) -> fauna::Result<bool> {
        self.inner.hsetnx(key, field, value)
    }
    fn hgetall(&self, key: &str) -> fauna::Result<Vec<(String, String)>> {
        self.inner.hgetall(key)
    }
    fn hincrby(&self, key: &str, field: &str, by: i64) -> fauna::Result<i64> {
        if self.failing_counter.lock().as_deref() == Some(field) {
            return Err(outage());
        }
        self.inner.hincrby(key, field, by)
    }
    fn zadd(&self, key: &str, member: &str, score: f64) -> fauna::Result<()> {
        self.inner.zadd(key, member, score)
    }
    fn zrevrange(&self, key: &str, start: usize, stop: usize) -> fauna::Result<Vec<(String, f64)>> {
        self.inner.zrevrange(key, start, stop)
    }
    fn setbit(&self, key: &str, offset: u64, value: bool) -> fauna::Result<bool> {
        self.inner.setbit(key, offset, value)
    }
    fn getbit(&self, key: &str, offset: u64) -> fauna::Result<bool> {
        self.inner.getbit(key, offset)
    }
    fn get_bytes(&self, key: &str) -> fauna::Result<Option<Vec<u8>>> {
        if self.failing_scans.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.get_bytes(key)
    }
    fn lpush(&self, key: &str, value: String) -> fauna::Result<usize> {
        self.inner.lpush(key, value)
    }
    fn lrange(&self, key: &str, start: usize, stop: usize) -> fauna::Result<Vec<String>> {
        self.inner.lrange(key, start, stop)
    }
    fn keys(&self, prefix: &str) -> fauna::Result<Vec<String>> {
        self.inner.keys(prefix)
    }
}
