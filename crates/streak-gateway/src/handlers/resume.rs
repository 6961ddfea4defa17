//! Resume (op 6)

use super::GatewayResult;
use crate::connection::{ConnectionContext, SharedSessionState};
use crate::protocol::{GatewayMessage, ResumePayload};

/// Builds the Resume frame for an existing session
pub struct ResumeHandler;

impl ResumeHandler {
    /// The Resume frame, or `None` when the state cannot be resumed
    pub fn message(
        ctx: &ConnectionContext,
        state: &SharedSessionState,
    ) -> GatewayResult<Option<GatewayMessage>> {
        let (session_id, seq) = {
            let session = state.lock();
            match (&session.session_id, session.sequence) {
                (Some(session_id), Some(seq)) => (session_id.clone(), seq),
                _ => return Ok(None),
            }
        };

        tracing::debug!(peer = ctx.label(), session_id = %session_id, seq, "Resuming");

        let payload = ResumePayload {
            token: ctx.token.clone(),
            session_id,
            seq,
        };
        Ok(Some(GatewayMessage::resume(&payload)?))
    }
}
