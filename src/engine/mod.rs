//! World engine
//!
//! [`Engine`] owns the write-op queue, the game clock, the RNG and handles to
//! the grid and entity stores. Gameplay operations read through the stores
//! directly and queue their mutations; [`Engine::tick`] advances the clock and
//! applies everything queued since the previous tick, in order.
//!
//! Reads that decide a write happen before the write is queued, so two
//! concurrent calls against the same coordinate or avatar can both act on the
//! same stale state. Callers that need read-your-writes call `tick` (or wait
//! for the run loop) between operations.

pub mod blocks;
pub mod clock;
pub mod messages;
pub mod queue;

pub use blocks::{EnterWorld, NoteResult};
pub use clock::GameClock;
pub use messages::{ChatMessage, Feedback};
pub use queue::{WriteHandle, WriteOp, WriteOutcome, WriteQueue};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::calendar::{GameTime, Season};
use crate::core::config::GameConfig;
use crate::core::error::{FaunaError, Result};
use crate::core::types::{now_millis, Timestamp};
use crate::entity::store::EntityStore;
use crate::spatial::grid::GridStore;
use crate::spatial::noise::NoiseSource;
use crate::store::{KeySpace, Store};

/// Lifetime counter names
pub mod counter {
    pub const AVATARS_CREATED: &str = "avatars-created";
    pub const WORLDS_CREATED: &str = "worlds-created";
    pub const MOVES: &str = "moves";
    pub const DEATHS: &str = "deaths";
    pub const ITEMS_GENERATED: &str = "items-generated";
    pub const ITEMS_CONSUMED: &str = "items-consumed";
    pub const ITEMS_PICKED_UP: &str = "items-picked-up";
    pub const ITEMS_DROPPED: &str = "items-dropped";
    pub const NESTS_BUILT: &str = "nests-built";
    pub const GARDENSPACES: &str = "gardenspaces";
    pub const NOTES: &str = "notes";
    pub const CHAT_MESSAGES: &str = "chat-messages";
    pub const FEEDBACK: &str = "feedback";
}

/// Result of one scheduler step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub game_time: GameTime,
    pub applied: usize,
    pub failed: usize,
}

/// Status snapshot for logging and admin surfaces
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub ticks: u64,
    pub game_time: GameTime,
    pub season: Season,
    pub pending_writes: usize,
    pub running: bool,
    pub started_at: Timestamp,
    pub uptime_ms: i64,
}

pub struct Engine {
    pub(crate) config: GameConfig,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) keys: KeySpace,
    pub(crate) grid: GridStore,
    pub(crate) entities: EntityStore,
    pub(crate) noise: Arc<dyn NoiseSource>,
    pub(crate) rng: Mutex<ChaCha8Rng>,
    queue: WriteQueue,
    clock: Mutex<GameClock>,
    running: AtomicBool,
    /// Set by `stop`; a loop started afterwards exits at once
    stop_requested: AtomicBool,
    started_at: Timestamp,
}

impl Engine {
    /// Build an engine over `store`. The store is probed once; failure here is fatal.
    pub fn new(config: GameConfig, store: Arc<dyn Store>, noise: Arc<dyn NoiseSource>) -> Result<Self> {
        config.validate().map_err(FaunaError::Config)?;

        let keys = KeySpace::new(config.engine.key_prefix.clone());
        let existing = store.keys(keys.prefix())?;
        info!(
            prefix = keys.prefix(),
            keys = existing.len(),
            "store connected"
        );

        let rng = match config.engine.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            grid: GridStore::new(store.clone(), keys.clone(), config.block.types.clone()),
            entities: EntityStore::new(store.clone(), keys.clone()),
            clock: Mutex::new(GameClock::new(&config.engine)),
            queue: WriteQueue::new(),
            rng: Mutex::new(rng),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            started_at: now_millis(),
            config,
            store,
            keys,
            noise,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    // === WRITE QUEUE ===

    /// Queue a mutation for the next tick
    pub fn submit_write(&self, op: WriteOp) -> (usize, WriteHandle) {
        let label = op.label();
        let (position, handle) = self.queue.submit(op);
        debug!(op = label, position, "write queued");
        (position, handle)
    }

    /// Queue a mutation whose outcome the caller does not wait for
    pub(crate) fn defer(&self, op: WriteOp) {
        let _ = self.submit_write(op);
    }

    pub fn pending_writes(&self) -> usize {
        self.queue.len()
    }

    fn execute(&self, op: &WriteOp) -> Result<WriteOutcome> {
        match op {
            WriteOp::PutBlock {
                world,
                chunk_width,
                coord,
                block,
            } => {
                self.grid.put_block(world, *chunk_width, *coord, block)?;
                Ok(WriteOutcome::Applied)
            }
            WriteOp::PutAvatar { avatar } => {
                self.entities.put_avatar(avatar)?;
                Ok(WriteOutcome::Applied)
            }
            WriteOp::CreateWorld { id, record } => {
                let created = self.entities.create_world(id, record)?;
                if created {
                    info!(world = %id, name = %record.name, "world created");
                    self.bump(counter::WORLDS_CREATED)?;
                }
                Ok(WriteOutcome::Created(created))
            }
            WriteOp::RegisterScores { avatar, scores } => {
                let member = avatar.to_string();
                for (category, value) in scores {
                    self.store
                        .zadd(&self.keys.scores(category), &member, *value as f64)?;
                }
                Ok(WriteOutcome::Applied)
            }
        }
    }

    fn execute_with_retry(&self, op: &WriteOp, position: usize) -> Result<WriteOutcome> {
        let retries = self.config.engine.write_retries;
        let mut attempt = 0;
        loop {
            match self.execute(op) {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!(op = op.label(), position, attempt, error = %e, "write-op failed, retrying");
                }
                Err(e) => {
                    warn!(op = op.label(), position, error = %e, "write-op abandoned");
                    return Err(e);
                }
            }
        }
    }

    // === CLOCK ===

    /// Advance game time one step, then apply every queued write in order
    pub fn tick(&self) -> TickReport {
        let (tick, game_time) = {
            let mut clock = self.clock.lock();
            let time = clock.advance();
            (clock.ticks(), time)
        };

        let batch = self.queue.drain();
        let mut report = TickReport {
            tick,
            game_time,
            applied: 0,
            failed: 0,
        };
        for (position, pending) in batch.into_iter().enumerate() {
            let result = self.execute_with_retry(&pending.op, position);
            match result {
                Ok(_) => report.applied += 1,
                Err(_) => report.failed += 1,
            }
            // The submitter may have dropped its handle
            let _ = pending.reply.send(result);
        }

        if report.applied + report.failed > 0 {
            debug!(
                tick,
                applied = report.applied,
                failed = report.failed,
                "write-ops flushed"
            );
        }
        report
    }

    /// Tick at the configured frequency until [`Engine::stop`] is called.
    /// Returns immediately if `stop` already ran, even before the loop started.
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("run loop already active");
            return;
        }
        let period = self.config.engine.tick_period();
        info!(?period, "game clock started");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            if self.stop_requested.load(Ordering::Acquire) {
                break;
            }
            ticker.tick().await;
            if self.stop_requested.load(Ordering::Acquire) {
                break;
            }
            self.tick();
        }
        self.running.store(false, Ordering::Release);
        info!(ticks = self.clock.lock().ticks(), "game clock stopped");
    }

    /// Ask the run loop to exit after its current tick. Sticky: the engine
    /// does not restart.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn game_time(&self) -> GameTime {
        self.clock.lock().game_time()
    }

    pub fn current_season(&self) -> Season {
        self.clock.lock().season(&self.config.block)
    }

    pub fn runtime_info(&self) -> RuntimeInfo {
        let (ticks, game_time, season) = {
            let clock = self.clock.lock();
            (clock.ticks(), clock.game_time(), clock.season(&self.config.block))
        };
        let now = now_millis();
        RuntimeInfo {
            ticks,
            game_time,
            season,
            pending_writes: self.pending_writes(),
            running: self.is_running(),
            started_at: self.started_at,
            uptime_ms: now - self.started_at,
        }
    }

    // === COUNTERS ===

    pub(crate) fn bump(&self, name: &str) -> Result<i64> {
        self.bump_by(name, 1)
    }

    pub(crate) fn bump_by(&self, name: &str, by: i64) -> Result<i64> {
        self.store.hincrby(&self.keys.counters(), name, by)
    }

    /// Lifetime counters
    pub fn counters(&self) -> Result<BTreeMap<String, i64>> {
        self.store
            .hgetall(&self.keys.counters())?
            .into_iter()
            .map(|(name, raw)| -> Result<(String, i64)> {
                let value = raw.parse::<i64>().map_err(|e| FaunaError::CorruptRecord {
                    key: format!("{}/{}", self.keys.counters(), name),
                    reason: e.to_string(),
                })?;
                Ok((name, value))
            })
            .collect()
    }
}
