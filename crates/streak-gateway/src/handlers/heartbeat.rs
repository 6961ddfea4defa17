//! Heartbeat handling (op 1 / op 11)

use super::{GatewayError, GatewayResult};
use crate::connection::{Outbound, SharedSessionState};
use crate::protocol::GatewayMessage;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Sends heartbeats and tracks acknowledgements
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Heartbeat every `interval` until a send fails or an ACK is missing
    ///
    /// The first heartbeat goes out one full interval after the call.
    pub async fn run(
        interval: Duration,
        state: &SharedSessionState,
        outbound: &Outbound,
    ) -> GatewayError {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let sequence = {
                let mut session = state.lock();
                if !session.heartbeat_acked {
                    tracing::warn!("Heartbeat not acknowledged, connection is a zombie");
                    return GatewayError::ZombieConnection;
                }
                session.heartbeat_acked = false;
                session.sequence
            };

            if let Err(e) = outbound.send(GatewayMessage::heartbeat(sequence)).await {
                return e;
            }

            tracing::trace!(seq = ?sequence, "Heartbeat sent");
        }
    }

    /// Answer a heartbeat request from the gateway right away
    pub async fn reply(state: &SharedSessionState, outbound: &Outbound) -> GatewayResult<()> {
        let sequence = state.lock().sequence;

        tracing::debug!(seq = ?sequence, "Heartbeat requested by gateway");
        outbound.send(GatewayMessage::heartbeat(sequence)).await
    }

    /// Record a heartbeat ACK
    pub fn ack(state: &SharedSessionState) {
        state.lock().heartbeat_acked = true;
        tracing::trace!("Heartbeat acknowledged");
    }
}
