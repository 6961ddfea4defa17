//! Reconnect policy
//!
//! Backoff calculation and the per-peer retry loop.

mod backoff;
mod supervisor;

pub use backoff::{backoff, backoff_with_rng, capped_delay};
pub use supervisor::Supervisor;
