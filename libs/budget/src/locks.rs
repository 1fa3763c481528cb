//! Per-user serialization

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Smallest table size at which idle entries are swept
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct LockTable {
    entries: HashMap<Uuid, Arc<Mutex<()>>>,
    // Doubles relative to the surviving entries after every sweep.
    next_sweep_at: usize,
}

impl Default for LockTable {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_sweep_at: SWEEP_THRESHOLD,
        }
    }
}

impl LockTable {
    fn sweep_if_due(&mut self) {
        if self.entries.len() < self.next_sweep_at {
            return;
        }
        // Only the table holds an idle lock.
        self.entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        self.next_sweep_at = SWEEP_THRESHOLD.max(self.entries.len() * 2);
    }
}

/// One async mutex per user id
///
/// Holding the guard serializes cycle retargeting, expense appends and alert
/// evaluation for that user. Different users never contend.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    table: Arc<Mutex<LockTable>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s state
    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().await;
            table.sweep_if_due();
            table.entries.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of users with a live lock entry
    pub async fn tracked(&self) -> usize {
        self.table.lock().await.entries.len()
    }
}
