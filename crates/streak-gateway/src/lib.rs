//! # streak-gateway
//!
//! Keeps an account present on the gateway: one long-lived WebSocket session per
//! configured voice target, with heartbeats, resume and backoff-driven reconnects.

pub mod connection;
pub mod events;
pub mod handlers;
pub mod identity;
pub mod protocol;
pub mod reconnect;
pub mod runner;
pub mod server;

pub use runner::run;
