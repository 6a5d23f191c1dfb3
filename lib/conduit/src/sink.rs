//! Observation sinks backed by `tracing` and `metrics`.

use std::fmt;

use crate::{Counter, Logger};

/// Log sink emitting one `tracing` event per record.
///
/// Key/value pairs are rendered in order as `key=value`, values with their `Debug` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
    _private: (),
}

impl TracingLogger {
    /// Create a new logger.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Logger for TracingLogger {
    fn log(&self, keyvals: &[(&'static str, &dyn fmt::Debug)]) {
        tracing::info!(record = %KeyVals(keyvals));
    }
}

struct KeyVals<'a>(&'a [(&'static str, &'a dyn fmt::Debug)]);

impl fmt::Display for KeyVals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        Ok(())
    }
}

/// Counter sink forwarding to a `metrics` counter.
///
/// # Example
///
/// ```ignore
/// use conduit::MetricsCounter;
///
/// let ints = MetricsCounter::new(metrics::counter!("addsvc_integers_summed"));
/// ```
#[derive(Clone)]
pub struct MetricsCounter(metrics::Counter);

impl MetricsCounter {
    /// Wrap a `metrics` counter handle.
    #[must_use]
    pub fn new(counter: metrics::Counter) -> Self {
        Self(counter)
    }
}

impl fmt::Debug for MetricsCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCounter").finish_non_exhaustive()
    }
}

impl Counter for MetricsCounter {
    fn add(&self, delta: u64) {
        self.0.increment(delta);
    }
}
