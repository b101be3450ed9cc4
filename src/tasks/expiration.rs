//! Expiration Timer
//!
//! One-shot timer primitive backing each table's expiration scheduler.
//!
//! Timers run on a dedicated background runtime owned by this crate, so tables can be
//! used from plain threads as well as from inside any tokio runtime. The runtime is
//! built on first use from [`Config::from_env`].

use std::sync::OnceLock;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::Config;

static SCHEDULER: OnceLock<Runtime> = OnceLock::new();

/// Returns the handle of the background scheduler runtime, building it if needed.
fn scheduler_handle() -> &'static Handle {
    SCHEDULER
        .get_or_init(|| {
            let config = Config::from_env();
            debug!(
                "Starting expiration scheduler runtime with {} worker thread(s)",
                config.scheduler_threads
            );
            Builder::new_multi_thread()
                .worker_threads(config.scheduler_threads)
                .thread_name(config.scheduler_thread_name)
                .enable_time()
                .build()
                .expect("Failed to build expiration scheduler runtime")
        })
        .handle()
}

// == Expiration Timer ==
/// At most one pending one-shot timer plus the interval it was armed with.
///
/// Arming always aborts the previous timer first, so a timer never has more than one
/// outstanding task. When the timer fires, the callback runs on the blocking pool.
#[derive(Debug, Default)]
pub struct ExpirationTimer {
    interval: Option<Duration>,
    pending: Option<JoinHandle<()>>,
}

impl ExpirationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The interval the timer was last armed with, None when disarmed.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Returns true while a timer task is waiting to fire.
    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    // == Arm ==
    /// Replaces any pending timer with one firing `on_fire` after `after`.
    pub fn arm<F>(&mut self, after: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.interval = Some(after);
        trace!("Expiration timer armed for {:?}", after);

        self.pending = Some(scheduler_handle().spawn(async move {
            tokio::time::sleep(after).await;
            // Detached so that re-arming from inside `on_fire` cannot abort it
            drop(tokio::task::spawn_blocking(on_fire));
        }));
    }

    // == Cancel ==
    /// Aborts the pending timer, keeping the recorded interval.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    // == Disarm ==
    /// Aborts the pending timer and forgets the interval.
    pub fn disarm(&mut self) {
        self.cancel();
        if self.interval.take().is_some() {
            trace!("Expiration timer disarmed");
        }
    }
}

impl Drop for ExpirationTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
