//! Connection management
//!
//! Session state, the per-peer context, the outbound writer and the
//! connection attempt that ties them together.

mod connection;
mod context;
mod outbound;
mod session;

pub use connection::{resume_endpoint, GatewaySession};
pub use context::ConnectionContext;
pub use outbound::{write_frame, write_loop, Outbound};
pub use session::{SessionState, SharedSessionState};
