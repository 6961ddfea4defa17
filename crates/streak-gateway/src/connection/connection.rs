//! One gateway connection attempt
//!
//! Connects, performs the hello/identify/resume handshake, then runs the heartbeat,
//! receive and writer loops until one of them fails.

use super::{write_frame, write_loop, ConnectionContext, Outbound, SharedSessionState};
use crate::handlers::{
    FrameHandler, GatewayError, GatewayResult, HeartbeatHandler, IdentifyHandler, ResumeHandler,
};
use crate::protocol::GatewayMessage;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code sent on teardown; anything but 1000/1001 keeps the session resumable
const RECONNECT_CLOSE_CODE: u16 = 4000;

/// Query appended to the resume URL handed out in READY
const GATEWAY_QUERY: &str = "?v=10&encoding=json";

/// Runs single connection attempts for one peer
#[derive(Debug, Clone)]
pub struct GatewaySession {
    ctx: Arc<ConnectionContext>,
    state: SharedSessionState,
}

impl GatewaySession {
    pub fn new(ctx: Arc<ConnectionContext>, state: SharedSessionState) -> Self {
        Self { ctx, state }
    }

    /// Run one attempt to completion and return why it ended
    pub async fn run(&self) -> GatewayError {
        let socket = match self.connect().await {
            Ok(socket) => socket,
            Err(e) => return e,
        };
        let (mut sink, mut stream) = socket.split();

        let (outbound, receiver) = Outbound::channel();
        let handler = FrameHandler::new(&self.ctx, &self.state, &outbound);

        let failure = match self.handshake(&mut sink, &mut stream, &handler).await {
            Ok(interval) => {
                tokio::select! {
                    e = HeartbeatHandler::run(interval, &self.state, &outbound) => e,
                    e = receive_loop(&mut stream, &handler) => e,
                    e = write_loop(&mut sink, receiver) => e,
                }
            }
            Err(e) => e,
        };

        self.close(&mut sink).await;
        failure
    }

    /// The endpoint for this attempt: the resume URL when resuming, else the gateway URL
    pub fn endpoint(&self) -> String {
        let session = self.state.lock();
        match &session.resume_url {
            Some(resume_url) if session.can_resume() => resume_endpoint(resume_url),
            _ => self.ctx.config.url.clone(),
        }
    }

    async fn connect(&self) -> GatewayResult<GatewaySocket> {
        let url = self.endpoint();
        let timeout = self.ctx.config.connect_timeout;

        tracing::debug!(peer = self.ctx.label(), url = %url, "Connecting to gateway");

        let (socket, _response) = time::timeout(timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| GatewayError::ConnectTimeout(timeout))??;

        Ok(socket)
    }

    /// Read hello, then resume or identify; returns the heartbeat interval
    async fn handshake<Si, St>(
        &self,
        sink: &mut Si,
        stream: &mut St,
        handler: &FrameHandler<'_>,
    ) -> GatewayResult<Duration>
    where
        Si: Sink<Message, Error = tungstenite::Error> + Unpin,
        St: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    {
        let timeout = self.ctx.config.connect_timeout;
        let hello = time::timeout(timeout, next_message(stream, handler))
            .await
            .map_err(|_| GatewayError::ConnectTimeout(timeout))??;
        let heartbeat_interval = hello
            .as_hello()
            .map(|h| h.heartbeat_interval)
            .filter(|&ms| ms > 0)
            .ok_or_else(|| GatewayError::Protocol(format!("expected hello, got {hello}")))?;
        let interval = Duration::from_millis(heartbeat_interval);

        self.state.lock().heartbeat_acked = true;

        tracing::info!(
            peer = self.ctx.label(),
            heartbeat_ms = heartbeat_interval,
            "Connected to gateway"
        );

        if let Some(resume) = ResumeHandler::message(&self.ctx, &self.state)? {
            write_frame(sink, &resume).await?;
            return Ok(interval);
        }

        write_frame(sink, &IdentifyHandler::message(&self.ctx)?).await?;

        let reply = time::timeout(timeout, next_message(stream, handler))
            .await
            .map_err(|_| GatewayError::ConnectTimeout(timeout))??;
        handler.handle(reply).await?;

        Ok(interval)
    }

    /// Send a close frame, bounded by the close timeout
    async fn close<Si>(&self, sink: &mut Si)
    where
        Si: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        let frame = CloseFrame {
            code: WsCloseCode::from(RECONNECT_CLOSE_CODE),
            reason: "reconnecting".into(),
        };

        match time::timeout(self.ctx.config.close_timeout, sink.send(Message::Close(Some(frame)))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(peer = self.ctx.label(), error = %e, "Close frame not sent");
            }
            Err(_) => {
                tracing::debug!(peer = self.ctx.label(), "Close timed out");
            }
        }
    }
}

/// Build the resume endpoint from the URL given in READY
#[must_use]
pub fn resume_endpoint(resume_url: &str) -> String {
    format!("{}/{GATEWAY_QUERY}", resume_url.trim_end_matches('/'))
}

/// Read frames until the next text frame and decode it
async fn next_message<St>(stream: &mut St, handler: &FrameHandler<'_>) -> GatewayResult<GatewayMessage>
where
    St: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => return Ok(GatewayMessage::from_json(&text)?),
            Message::Close(frame) => return Err(handler.closed(frame)),
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    Err(GatewayError::stream_ended())
}

/// Feed every frame to the handler until one ends the attempt
async fn receive_loop<St>(stream: &mut St, handler: &FrameHandler<'_>) -> GatewayError
where
    St: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        match next_message(stream, handler).await {
            Ok(message) => {
                if let Err(e) = handler.handle(message).await {
                    return e;
                }
            }
            Err(GatewayError::Decode(e)) => {
                tracing::warn!(error = %e, "Skipping undecodable frame");
            }
            Err(e) => return e,
        }
    }
}
