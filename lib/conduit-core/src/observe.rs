//! Observation sinks consumed by service middleware.
//!
//! These are capability contracts only: where records end up (a terminal, a log
//! pipeline, a metrics registry) is up to the implementation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Structured log sink accepting ordered key/value pairs.
pub trait Logger: Send + Sync {
    /// Record one entry.
    fn log(&self, keyvals: &[(&'static str, &dyn fmt::Debug)]);
}

/// Monotonic counter sink.
pub trait Counter: Send + Sync {
    /// Add `delta` to the counter.
    fn add(&self, delta: u64);
}

/// Logger that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn log(&self, _keyvals: &[(&'static str, &dyn fmt::Debug)]) {}
}

/// In-process counter; concurrent increments are never lost.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    /// A counter starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

impl Counter for AtomicCounter {
    fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::AcqRel);
    }
}
