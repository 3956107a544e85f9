//! Bounded FIFO history of per-frame detection records.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fpulse_models::{DetectionRecord, FrameObservation};
use tracing::debug;

/// Default number of records retained before eviction.
pub const DEFAULT_CAPACITY: usize = 2000;

struct StoreInner {
    records: VecDeque<DetectionRecord>,
    /// Lifetime append count; ordinals are derived from it and survive
    /// eviction.
    appended: u64,
}

/// Cloneable handle to the bounded in-memory analytics history.
///
/// One instance is created at startup and shared by the live pipeline and
/// every HTTP handler. All access goes through a single mutex; the lock is
/// held only for buffer manipulation and snapshot copies, never across
/// detection, disk writes or rendering.
#[derive(Clone)]
pub struct AnalyticsStore {
    inner: Arc<Mutex<StoreInner>>,
    capacity: usize,
}

impl AnalyticsStore {
    /// Create a store retaining at most `capacity` records (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                records: VecDeque::with_capacity(capacity.max(1)),
                appended: 0,
            })),
            capacity: capacity.max(1),
        }
    }

    /// Append one frame observation, evicting the oldest record when the
    /// buffer is full. Returns the assigned frame ordinal (1-based, strictly
    /// increasing for the lifetime of the store).
    pub fn append(&self, observation: FrameObservation) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.appended += 1;
        let ordinal = inner.appended;

        if inner.records.len() == self.capacity {
            let evicted = inner.records.pop_front();
            if let Some(evicted) = evicted {
                debug!(
                    evicted_ordinal = evicted.frame_ordinal,
                    "analytics buffer full, evicting oldest record"
                );
            }
        }
        inner.records.push_back(DetectionRecord::new(ordinal, observation));
        ordinal
    }

    /// Atomic copy of the retained history, oldest first.
    ///
    /// `None` returns the full buffer. `Some(n)` returns the last `n`
    /// records; `n <= 0` yields an empty vec, `n` beyond the buffer length
    /// returns everything. An empty store always yields an empty vec.
    pub fn snapshot(&self, last_n: Option<i64>) -> Vec<DetectionRecord> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match last_n {
            None => inner.records.iter().cloned().collect(),
            Some(n) if n <= 0 => Vec::new(),
            Some(n) => {
                let take = (n as usize).min(inner.records.len());
                let skip = inner.records.len() - take;
                inner.records.iter().skip(skip).cloned().collect()
            }
        }
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of records retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lifetime append count (equal to the highest assigned ordinal).
    pub fn total_appended(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .appended
    }
}

impl Default for AnalyticsStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for AnalyticsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsStore")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
