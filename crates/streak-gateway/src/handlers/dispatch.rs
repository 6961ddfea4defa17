//! Dispatch handler (op 0)

use super::{GatewayError, GatewayResult};
use crate::connection::{ConnectionContext, Outbound, SharedSessionState};
use crate::events::{GatewayEventType, ReadyEvent, VoiceStateEvent};
use crate::protocol::{GatewayMessage, VoiceStatePayload};
use tokio::time::Instant;

/// Handles dispatched events
pub struct DispatchHandler;

impl DispatchHandler {
    /// Handle a dispatch; events other than READY and RESUMED are ignored
    pub async fn handle(
        ctx: &ConnectionContext,
        state: &SharedSessionState,
        outbound: &Outbound,
        message: &GatewayMessage,
    ) -> GatewayResult<()> {
        let Some(event) = message.t.as_deref().and_then(GatewayEventType::from_name) else {
            tracing::trace!(peer = ctx.label(), event = ?message.t, "Ignoring dispatch");
            return Ok(());
        };

        match event {
            GatewayEventType::Ready => {
                let ReadyEvent {
                    session_id,
                    resume_gateway_url,
                    user,
                } = message
                    .as_dispatch(event.as_str())
                    .ok_or_else(|| GatewayError::Protocol("malformed READY payload".to_string()))?;

                tracing::info!(
                    peer = ctx.label(),
                    session_id = %session_id,
                    user = ?user.as_ref().map(|u| u.username.as_str()),
                    "Session ready"
                );

                state.lock().record_ready(session_id, resume_gateway_url);

                Self::join_voice(ctx, state, outbound).await
            }
            GatewayEventType::Resumed => {
                let session_id = {
                    let mut session = state.lock();
                    session.mark_connected();
                    session.session_id.clone()
                };

                tracing::info!(peer = ctx.label(), session_id = ?session_id, "Session resumed");
                Ok(())
            }
            GatewayEventType::VoiceStateUpdate => {
                if let Some(voice) = message.as_dispatch::<VoiceStateEvent>(event.as_str()) {
                    tracing::debug!(
                        peer = ctx.label(),
                        user_id = %voice.user_id,
                        guild_id = ?voice.guild_id,
                        channel_id = ?voice.channel_id,
                        "Voice state updated"
                    );
                }
                Ok(())
            }
        }
    }

    /// Join every target voice channel unless a join happened within the cooldown
    async fn join_voice(
        ctx: &ConnectionContext,
        state: &SharedSessionState,
        outbound: &Outbound,
    ) -> GatewayResult<()> {
        let due = state
            .lock()
            .should_join_voice(Instant::now(), ctx.config.voice_join_cooldown);

        if !due {
            tracing::debug!(peer = ctx.label(), "Voice join skipped, joined recently");
            return Ok(());
        }

        for target in &ctx.targets {
            let payload = VoiceStatePayload {
                guild_id: target.guild_id.clone(),
                channel_id: target.channel_id.clone(),
                self_mute: ctx.config.voice.self_mute,
                self_deaf: ctx.config.voice.self_deaf,
            };
            outbound
                .send(GatewayMessage::voice_state_update(&payload)?)
                .await?;

            tracing::info!(
                peer = ctx.label(),
                guild_id = %target.guild_id,
                channel_id = %target.channel_id,
                "Joined voice channel"
            );
        }

        Ok(())
    }
}
