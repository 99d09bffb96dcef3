use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Process-wide hit counter shared by every worker.
///
/// Cloning yields another handle to the same counter. The count is a `u64`
/// that wraps back to zero past `u64::MAX`.
#[derive(Clone, Debug, Default)]
pub struct ServerState {
    hits: Arc<AtomicU64>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        let previous = self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(hits = previous.wrapping_add(1), "hit recorded");
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        let previous = self.hits.swap(0, Ordering::Relaxed);
        tracing::debug!(previous, "hit counter reset");
    }
}
