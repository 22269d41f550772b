//! Bounded in-flight transfer budget.
//!
//! Every GET is a blocking call on the tokio blocking pool; this budget
//! keeps the number of transfers in flight at or below the host's
//! parallelism (or a configured cap), so fanning out over a large album
//! queues instead of flooding the pool.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Transfer-slot budget shared by all fetches of one run.
#[derive(Debug, Clone)]
pub struct FetchBudget {
    slots: Arc<Semaphore>,
    max_slots: usize,
}

impl FetchBudget {
    /// Budget allowing `max_slots` concurrent transfers (at least 1).
    pub fn new(max_slots: usize) -> Self {
        let max_slots = max_slots.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_slots)),
            max_slots,
        }
    }

    /// Budget sized to the host's available parallelism.
    pub fn for_host() -> Self {
        let slots = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(slots)
    }

    /// Maximum number of concurrent transfers.
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Waits for a free slot. The slot is released when the permit drops.
    pub async fn reserve(&self) -> OwnedSemaphorePermit {
        self.slots
            .clone()
            .acquire_owned()
            .await
            .expect("fetch budget semaphore closed")
    }
}
