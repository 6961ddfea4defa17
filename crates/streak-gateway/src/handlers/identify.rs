//! Identify (op 2)

use super::GatewayResult;
use crate::connection::ConnectionContext;
use crate::protocol::{GatewayMessage, IdentifyPayload};

/// Builds the Identify frame for a fresh session
pub struct IdentifyHandler;

impl IdentifyHandler {
    pub fn message(ctx: &ConnectionContext) -> GatewayResult<GatewayMessage> {
        let payload = IdentifyPayload::new(
            ctx.token.clone(),
            ctx.properties.clone(),
            ctx.status,
            &ctx.config.activity,
        );

        tracing::debug!(
            peer = ctx.label(),
            os = %ctx.properties.os,
            browser = %ctx.properties.browser,
            "Identifying"
        );

        Ok(GatewayMessage::identify(&payload)?)
    }
}
