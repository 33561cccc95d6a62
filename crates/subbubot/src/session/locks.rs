//! Per-sender serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// One async mutex per sender.
///
/// Holding the guard makes the read-decide-send-write sequence for a message
/// atomic with respect to other deliveries from the same sender. Different
/// senders never contend. An entry lives only while someone holds or waits
/// for it.
#[derive(Debug, Clone, Default)]
pub struct SenderLocks {
    locks: Arc<LockMap>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `sender`.
    pub async fn acquire(&self, sender: &str) -> SenderGuard {
        // Clone the mutex out so the DashMap shard lock is released before awaiting
        let lock = self
            .locks
            .entry(sender.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        SenderGuard {
            guard: Some(lock.lock_owned().await),
            sender: sender.to_string(),
            locks: self.locks.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one sender. Dropping it releases the lock.
#[derive(Debug)]
pub struct SenderGuard {
    guard: Option<OwnedMutexGuard<()>>,
    sender: String,
    locks: Arc<LockMap>,
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold a clone, so the entry stays until the last one is done
        self.locks
            .remove_if(&self.sender, |_, lock| Arc::strong_count(lock) == 1);
    }
}
