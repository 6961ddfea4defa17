//! Test helpers for integration tests
//!
//! Provides a mock gateway, a mock REST API and config builders with short timeouts.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use streak_common::{BackoffConfig, GatewayConfig};
use streak_gateway::connection::{ConnectionContext, GatewaySession, SessionState, SharedSessionState};
use streak_gateway::handlers::GatewayError;
use streak_gateway::identity::User;
use streak_gateway::protocol::{GatewayMessage, OpCode};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::fixtures::{test_discord_config, test_peer, test_user, TEST_TOKEN};

/// Upper bound for any single wait in a test
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process gateway server
pub struct MockGateway {
    listener: TcpListener,
    addr: SocketAddr,
}

impl MockGateway {
    /// Bind to a free local port
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// URL for fresh connections
    pub fn url(&self) -> String {
        format!("ws://{}/?v=10&encoding=json", self.addr)
    }

    /// URL handed out as `resume_gateway_url`
    pub fn resume_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Accept the next client connection
    pub async fn accept(&self) -> Result<MockConnection> {
        let (tcp, _) = timeout(TEST_TIMEOUT, self.listener.accept()).await??;
        let ws = accept_async(tcp).await?;
        Ok(MockConnection { ws })
    }

    /// Accept a connection and run the hello + identify + READY exchange
    ///
    /// Returns the connection and the identify frame.
    pub async fn accept_identified(
        &self,
        heartbeat_ms: u64,
        ready: &GatewayMessage,
    ) -> Result<(MockConnection, GatewayMessage)> {
        let mut conn = self.accept().await?;
        conn.hello(heartbeat_ms).await?;
        let identify = conn.recv_op(OpCode::Identify).await?;
        conn.send(ready).await?;
        Ok((conn, identify))
    }
}

/// One server-side WebSocket
pub struct MockConnection {
    ws: WebSocketStream<TcpStream>,
}

impl MockConnection {
    pub async fn send(&mut self, message: &GatewayMessage) -> Result<()> {
        self.ws.send(Message::Text(message.to_json()?)).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn hello(&mut self, heartbeat_ms: u64) -> Result<()> {
        self.send(&GatewayMessage::hello(heartbeat_ms)).await
    }

    /// Next text frame from the client
    pub async fn recv(&mut self) -> Result<GatewayMessage> {
        loop {
            let frame = timeout(TEST_TIMEOUT, self.ws.next())
                .await?
                .ok_or_else(|| anyhow!("connection ended"))??;

            match frame {
                Message::Text(text) => return Ok(GatewayMessage::from_json(&text)?),
                Message::Close(frame) => bail!("client closed the connection: {frame:?}"),
                _ => {}
            }
        }
    }

    /// Next text frame with the given op code, skipping others
    pub async fn recv_op(&mut self, op: OpCode) -> Result<GatewayMessage> {
        loop {
            let message = self.recv().await?;
            if message.op == op {
                return Ok(message);
            }
        }
    }

    /// Skip text frames until the client closes; returns the close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let frame = timeout(TEST_TIMEOUT, self.ws.next())
                .await?
                .ok_or_else(|| anyhow!("connection ended without a close frame"))??;

            if let Message::Close(frame) = frame {
                return Ok(frame.map(|f| u16::from(f.code)));
            }
        }
    }

    /// Close with a gateway close code
    pub async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: code.into(),
            reason: reason.to_string().into(),
        };
        self.ws.send(Message::Close(Some(frame))).await?;
        Ok(())
    }
}

struct MockApiState {
    token: String,
    user: User,
}

/// In-process REST API serving `/api/v10/users/@me`
pub struct MockApi {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl MockApi {
    /// Accepts [`TEST_TOKEN`] and returns [`test_user`]
    pub async fn start() -> Result<Self> {
        Self::start_with(TEST_TOKEN, test_user()).await
    }

    pub async fn start_with(token: &str, user: User) -> Result<Self> {
        let state = Arc::new(MockApiState {
            token: token.to_string(),
            user,
        });
        let app = Router::new()
            .route("/api/v10/users/@me", get(current_user))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// Base URL in the shape of `STREAK_API_URL`
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v10", self.addr)
    }
}

async fn current_user(State(state): State<Arc<MockApiState>>, headers: HeaderMap) -> Response {
    let token = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if token == Some(state.token.as_str()) {
        Json(state.user.clone()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"message": "401: Unauthorized", "code": 0})),
        )
            .into_response()
    }
}

/// Gateway config pointing at a mock gateway, with millisecond backoff
pub fn test_gateway_config(url: String) -> GatewayConfig {
    GatewayConfig {
        url,
        connect_timeout: Duration::from_secs(2),
        close_timeout: Duration::from_millis(500),
        resumable_retry_delay: Duration::from_millis(10),
        backoff: BackoffConfig {
            base: Duration::from_millis(10),
            max: Duration::from_millis(50),
            jitter_factor: 0.0,
        },
        ..GatewayConfig::default()
    }
}

/// Context for connection ordinal `index` against the given gateway URL
pub fn test_context(index: usize, url: String) -> Arc<ConnectionContext> {
    Arc::new(ConnectionContext::new(
        index,
        &test_discord_config(),
        test_peer(),
        Arc::new(test_gateway_config(url)),
    ))
}

/// Run one gateway session in the background
pub fn spawn_session(
    ctx: Arc<ConnectionContext>,
    state: SharedSessionState,
) -> JoinHandle<GatewayError> {
    let session = GatewaySession::new(ctx, state);
    tokio::spawn(async move { session.run().await })
}

/// A fresh shared session state
pub fn fresh_state() -> SharedSessionState {
    SessionState::new_shared()
}

/// Wait for a spawned session to end
pub async fn session_result(handle: JoinHandle<GatewayError>) -> Result<GatewayError> {
    Ok(timeout(TEST_TIMEOUT, handle).await??)
}

/// Poll until `check` holds or the test timeout passes
pub async fn wait_until<F: Fn() -> bool>(check: F) -> Result<()> {
    timeout(TEST_TIMEOUT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}

/// Assert response status
pub fn assert_status(response: &reqwest::Response, expected: u16) -> Result<()> {
    let actual = response.status().as_u16();
    if actual != expected {
        bail!("Expected status {expected}, got {actual}");
    }
    Ok(())
}
