//! Reconnect supervisor
//!
//! Runs gateway sessions for one peer forever, choosing the delay between attempts.

use super::backoff;
use crate::connection::{ConnectionContext, GatewaySession, SessionState, SharedSessionState};
use crate::handlers::GatewayError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Retry loop for one peer
pub struct Supervisor {
    ctx: Arc<ConnectionContext>,
    state: SharedSessionState,
    attempt: u32,
}

impl Supervisor {
    pub fn new(ctx: Arc<ConnectionContext>) -> Self {
        Self {
            ctx,
            state: SessionState::new_shared(),
            attempt: 0,
        }
    }

    /// Current retry attempt
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Session state carried across attempts
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    /// Decide how long to wait after a failed attempt
    ///
    /// A session that got connected resets the counter first. A resumable invalid
    /// session retries quickly and leaves the counter alone; everything else
    /// backs off and counts as another attempt.
    pub fn next_delay(&mut self, error: &GatewayError, was_connected: bool) -> Duration {
        if was_connected {
            self.attempt = 0;
        }

        if matches!(error, GatewayError::InvalidSession { resumable: true }) {
            return self.ctx.config.resumable_retry_delay;
        }

        let delay = backoff(&self.ctx.config.backoff, self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Run until the task is dropped
    pub async fn run(mut self) {
        let session = GatewaySession::new(Arc::clone(&self.ctx), Arc::clone(&self.state));

        loop {
            self.state.lock().mark_disconnected();

            let error = session.run().await;

            let (was_connected, last_connected) = {
                let state = self.state.lock();
                (state.connected, state.last_connected)
            };
            let delay = self.next_delay(&error, was_connected);
            let delay_ms = delay.as_millis() as u64;

            if error.is_routine() {
                tracing::info!(
                    peer = self.ctx.label(),
                    reason = %error,
                    delay_ms,
                    "Reconnecting"
                );
            } else {
                tracing::warn!(
                    peer = self.ctx.label(),
                    error = %error,
                    attempt = self.attempt,
                    delay_ms,
                    last_connected = ?last_connected,
                    "Connection lost, reconnecting"
                );
            }

            time::sleep(delay).await;
        }
    }
}
