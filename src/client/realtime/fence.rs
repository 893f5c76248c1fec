//! Per-key sequence fencing.
//!
//! Every fetch for a data key gets a ticket with a monotonic sequence
//! number. A ticket may commit only if no newer ticket for the same key has
//! committed, so a slow, stale response can never overwrite a fresher one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::client::lock;

/// What caused a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    WebSocket,
    Sse,
    Polling,
    Manual,
}

/// Sequence counter shared by every session on one data key
#[derive(Debug, Default)]
pub struct SequenceFence {
    issued: AtomicU64,
    committed: AtomicU64,
    last_commit: Mutex<Option<DateTime<Utc>>>,
}

impl SequenceFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number (starts at 1)
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit `seq` if it is newer than everything committed so far
    pub fn try_commit(&self, seq: u64) -> bool {
        let committed = self
            .committed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (seq > current).then_some(seq)
            })
            .is_ok();
        if committed {
            *lock(&self.last_commit) = Some(Utc::now());
        }
        committed
    }

    /// Highest committed sequence number (0 when none)
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::SeqCst)
    }

    pub fn last_commit(&self) -> Option<DateTime<Utc>> {
        *lock(&self.last_commit)
    }
}

/// Handed to every fetch invocation; commit before applying the result.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    trigger: Trigger,
    fence: Arc<SequenceFence>,
    alive: Arc<AtomicBool>,
}

impl FetchTicket {
    pub(crate) fn new(trigger: Trigger, fence: Arc<SequenceFence>, alive: Arc<AtomicBool>) -> Self {
        let seq = fence.issue();
        Self {
            seq,
            trigger,
            fence,
            alive,
        }
    }

    /// A ticket bound to no session, always alive
    pub fn detached(trigger: Trigger, fence: Arc<SequenceFence>) -> Self {
        Self::new(trigger, fence, Arc::new(AtomicBool::new(true)))
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Whether committing could still succeed
    pub fn is_current(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && self.seq > self.fence.committed()
    }

    /// Claim the right to apply this fetch's result. False when the session
    /// is gone or a newer fetch already applied.
    pub fn try_commit(&self) -> bool {
        if !self.alive.load(Ordering::SeqCst) {
            return false;
        }
        self.fence.try_commit(self.seq)
    }
}
