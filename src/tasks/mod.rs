//! Background Tasks Module
//!
//! Contains the timer primitive the cache tables schedule expiration sweeps with.
//!
//! # Tasks
//! - Expiration timer: one-shot, re-armable, aimed at a table's nearest expiry

mod expiration;

pub use expiration::ExpirationTimer;
