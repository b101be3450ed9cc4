//! Configuration Module
//!
//! Handles loading the expiration scheduler configuration from environment variables.

use std::env;

/// Default number of worker threads driving expiration timers.
pub const DEFAULT_SCHEDULER_THREADS: usize = 1;

/// Default name given to scheduler worker threads.
pub const DEFAULT_SCHEDULER_THREAD_NAME: &str = "cache-expiration";

/// Expiration scheduler configuration.
///
/// All values can be configured via environment variables with sensible defaults.
/// The scheduler runtime is built once, on the first timer a table arms, so the
/// environment must be set before any table schedules an expiration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker threads of the background runtime that runs expiration timers
    pub scheduler_threads: usize,
    /// Thread name for the scheduler workers
    pub scheduler_thread_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SCHEDULER_THREADS` - Scheduler worker threads (default: 1, min: 1)
    /// - `CACHE_SCHEDULER_THREAD_NAME` - Scheduler thread name (default: cache-expiration)
    pub fn from_env() -> Self {
        Self {
            scheduler_threads: env::var("CACHE_SCHEDULER_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_SCHEDULER_THREADS),
            scheduler_thread_name: env::var("CACHE_SCHEDULER_THREAD_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SCHEDULER_THREAD_NAME.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler_threads: DEFAULT_SCHEDULER_THREADS,
            scheduler_thread_name: DEFAULT_SCHEDULER_THREAD_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.scheduler_threads, 1);
        assert_eq!(config.scheduler_thread_name, "cache-expiration");
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the env so parallel tests cannot interleave
        env::remove_var("CACHE_SCHEDULER_THREADS");
        env::remove_var("CACHE_SCHEDULER_THREAD_NAME");

        let config = Config::from_env();
        assert_eq!(config.scheduler_threads, 1);
        assert_eq!(config.scheduler_thread_name, "cache-expiration");

        env::set_var("CACHE_SCHEDULER_THREADS", "0");
        assert_eq!(Config::from_env().scheduler_threads, 1);

        env::set_var("CACHE_SCHEDULER_THREADS", "4");
        env::set_var("CACHE_SCHEDULER_THREAD_NAME", "ttl-timers");
        let config = Config::from_env();
        assert_eq!(config.scheduler_threads, 4);
        assert_eq!(config.scheduler_thread_name, "ttl-timers");

        env::remove_var("CACHE_SCHEDULER_THREADS");
        env::remove_var("CACHE_SCHEDULER_THREAD_NAME");
    }
}
