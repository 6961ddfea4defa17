//! Invalid session handler (op 9)

use super::GatewayError;
use crate::connection::{ConnectionContext, SharedSessionState};

/// Handles Invalid Session messages
pub struct InvalidSessionHandler;

impl InvalidSessionHandler {
    /// Reset the session unless it is resumable; always ends the attempt
    pub fn handle(
        ctx: &ConnectionContext,
        state: &SharedSessionState,
        resumable: bool,
    ) -> GatewayError {
        if resumable {
            tracing::info!(peer = ctx.label(), "Invalid session (resumable)");
        } else {
            state.lock().reset();
            tracing::warn!(peer = ctx.label(), "Invalid session, starting a new one");
        }

        GatewayError::InvalidSession { resumable }
    }
}
