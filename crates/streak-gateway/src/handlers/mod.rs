//! Op code handlers
//!
//! Handles incoming gateway frames based on their operation code.

mod dispatch;
mod error;
mod heartbeat;
mod identify;
mod invalid_session;
mod resume;

pub use dispatch::DispatchHandler;
pub use error::{GatewayError, GatewayResult};
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use invalid_session::InvalidSessionHandler;
pub use resume::ResumeHandler;

use crate::connection::{ConnectionContext, Outbound, SharedSessionState};
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;

/// Routes frames of one connection attempt to the op code handlers
pub struct FrameHandler<'a> {
    ctx: &'a ConnectionContext,
    state: &'a SharedSessionState,
    outbound: &'a Outbound,
}

impl<'a> FrameHandler<'a> {
    pub fn new(
        ctx: &'a ConnectionContext,
        state: &'a SharedSessionState,
        outbound: &'a Outbound,
    ) -> Self {
        Self {
            ctx,
            state,
            outbound,
        }
    }

    /// Handle one decoded frame
    ///
    /// An `Err` ends the connection attempt.
    pub async fn handle(&self, message: GatewayMessage) -> GatewayResult<()> {
        if let Some(seq) = message.s {
            self.state.lock().sequence = Some(seq);
        }

        tracing::trace!(peer = self.ctx.label(), message = %message, "Frame received");

        match message.op {
            OpCode::Dispatch => {
                DispatchHandler::handle(self.ctx, self.state, self.outbound, &message).await
            }
            OpCode::Heartbeat => HeartbeatHandler::reply(self.state, self.outbound).await,
            OpCode::Reconnect => {
                tracing::info!(peer = self.ctx.label(), "Gateway requested reconnect");
                Err(GatewayError::ReconnectRequested)
            }
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session().unwrap_or(false);
                Err(InvalidSessionHandler::handle(self.ctx, self.state, resumable))
            }
            OpCode::HeartbeatAck => {
                HeartbeatHandler::ack(self.state);
                Ok(())
            }
            op if op.is_send_op() => {
                tracing::warn!(peer = self.ctx.label(), op = %op, "Gateway sent a client-only op code");
                Ok(())
            }
            op => {
                tracing::debug!(peer = self.ctx.label(), op = %op, "Ignoring op code");
                Ok(())
            }
        }
    }

    /// Turn a received close frame into the attempt's failure
    ///
    /// Close codes that kill the session on the gateway side also reset local state.
    pub fn closed(&self, frame: Option<CloseFrame<'_>>) -> GatewayError {
        let Some(frame) = frame else {
            tracing::info!(peer = self.ctx.label(), "Gateway closed the connection");
            return GatewayError::stream_ended();
        };

        let code = u16::from(frame.code);
        let known = CloseCode::from_u16(code);

        if known.is_some_and(CloseCode::invalidates_session) {
            self.state.lock().reset();
        }

        match known {
            Some(close_code) if close_code.is_fatal() => {
                tracing::error!(
                    peer = self.ctx.label(),
                    close_code = %close_code,
                    reason = %frame.reason,
                    "Gateway closed the connection"
                );
            }
            _ => {
                tracing::warn!(
                    peer = self.ctx.label(),
                    code,
                    reason = %frame.reason,
                    "Gateway closed the connection"
                );
            }
        }

        GatewayError::Closed {
            code: Some(code),
            reason: frame.reason.into_owned(),
        }
    }
}
