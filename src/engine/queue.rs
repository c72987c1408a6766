//! Write-op queue
//!
//! Mutations that must be serialized are submitted as data and applied in
//! submission order on the next tick. Each submission gets a handle that
//! resolves once its op has run.

use parking_lot::Mutex;
use std::mem;
use tokio::sync::oneshot;

use crate::core::error::{FaunaError, Result};
use crate::core::types::{AvatarId, Coord, WorldId};
use crate::entity::avatar::Avatar;
use crate::entity::world::WorldRecord;
use crate::spatial::block::Block;

/// A deferred mutation
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Replace a block and resync its index bits
    PutBlock {
        world: WorldId,
        chunk_width: u32,
        coord: Coord,
        block: Block,
    },
    PutAvatar { avatar: Box<Avatar> },
    /// Create-if-absent world record
    CreateWorld { id: WorldId, record: WorldRecord },
    /// Publish score values to the ranked tables
    RegisterScores {
        avatar: AvatarId,
        scores: Vec<(String, u64)>,
    },
}

impl WriteOp {
    pub fn label(&self) -> &'static str {
        match self {
            WriteOp::PutBlock { .. } => "put-block",
            WriteOp::PutAvatar { .. } => "put-avatar",
            WriteOp::CreateWorld { .. } => "create-world",
            WriteOp::RegisterScores { .. } => "register-scores",
        }
    }
}

/// What a flushed op did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// Create-if-absent result: false when the record already existed
    Created(bool),
}

/// Resolves when the submitted op has been flushed
#[derive(Debug)]
pub struct WriteHandle {
    rx: oneshot::Receiver<Result<WriteOutcome>>,
}

impl WriteHandle {
    pub async fn outcome(self) -> Result<WriteOutcome> {
        self.rx.await.map_err(|_| FaunaError::QueueClosed)?
    }

    /// Non-blocking check; `None` while the op is still queued
    pub fn try_outcome(&mut self) -> Option<Result<WriteOutcome>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(FaunaError::QueueClosed)),
        }
    }
}

pub(crate) struct PendingOp {
    pub op: WriteOp,
    pub reply: oneshot::Sender<Result<WriteOutcome>>,
}

#[derive(Default)]
pub struct WriteQueue {
    pending: Mutex<Vec<PendingOp>>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `op`, returning its zero-based position in the current batch
    pub fn submit(&self, op: WriteOp) -> (usize, WriteHandle) {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock();
        let position = pending.len();
        pending.push(PendingOp { op, reply: tx });
        (position, WriteHandle { rx })
    }

    /// Take everything queued so far, in submission order
    pub(crate) fn drain(&self) -> Vec<PendingOp> {
        mem::take(&mut *self.pending.lock())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores_op(n: u64) -> WriteOp {
        WriteOp::RegisterScores {
            avatar: AvatarId::new(),
            scores: vec![("moved".into(), n)],
        }
    }

    #[test]
    fn test_positions_and_drain_order() {
        let queue = WriteQueue::new();
        let (p0, _h0) = queue.submit(scores_op(1));
        let (p1, _h1) = queue.submit(scores_op(2));
        assert_eq!((p0, p1), (0, 1));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert!(queue.is_empty());
        let values: Vec<u64> = drained
            .iter()
            .map(|p| match &p.op {
                WriteOp::RegisterScores { scores, .. } => scores[0].1,
                _ => 0,
            })
            .collect();
        assert_eq!(values, vec![1, 2]);

        // Positions restart with a new batch
        let (p, _h) = queue.submit(scores_op(3));
        assert_eq!(p, 0);
    }

    #[test]
    fn test_handle_resolves_after_reply() {
        let queue = WriteQueue::new();
        let (_, mut handle) = queue.submit(scores_op(1));
        assert!(handle.try_outcome().is_none());

        for pending in queue.drain() {
            let _ = pending.reply.send(Ok(WriteOutcome::Applied));
        }
        assert!(matches!(handle.try_outcome(), Some(Ok(WriteOutcome::Applied))));
    }

    #[tokio::test]
    async fn test_dropped_op_reports_queue_closed() {
        let queue = WriteQueue::new();
        let (_, handle) = queue.submit(scores_op(1));
        drop(queue);
        assert!(matches!(handle.outcome().await, Err(FaunaError::QueueClosed)));
    }
}
