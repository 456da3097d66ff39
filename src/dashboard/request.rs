//! Request generations
//!
//! Each fetch takes a [`Generation`] before it starts. When the response
//! arrives it may only be committed if no newer request has begun since, so
//! a slow, stale response can never overwrite the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Monotonic source of request generations
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no later request has begun
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }
}
