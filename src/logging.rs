//! Trace Logging Module
//!
//! Optional per-table sink for the human-readable trace lines tables produce.

use tracing::info;

// == Logger Trait ==
/// Receives one formatted trace line per table event (add, delete, expire, flush).
pub trait Logger: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

// == Tracing Logger ==
/// Forwards trace lines to `tracing` at info level under the given prefix.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    prefix: String,
}

impl TracingLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn log(&self, line: &str) {
        info!("{} {}", self.prefix, line);
    }
}
