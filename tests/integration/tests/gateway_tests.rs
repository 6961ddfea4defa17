//! Gateway session integration tests
//!
//! Runs real sessions and supervisors against an in-process mock gateway.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use serde_json::json;
use streak_gateway::handlers::GatewayError;
use streak_gateway::protocol::{GatewayMessage, IdentifyProperties, OpCode};
use streak_gateway::reconnect::Supervisor;

/// Heartbeat interval long enough to stay out of the way
const QUIET_HEARTBEAT_MS: u64 = 45_000;

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{port}/?v=10&encoding=json")
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_ready_and_voice_join() {
    let gateway = MockGateway::start().await.unwrap();
    let state = fresh_state();
    let handle = spawn_session(test_context(0, gateway.url()), Arc::clone(&state));

    let session_id = unique_session_id();
    let ready = ready_message(1, &session_id, Some(&gateway.resume_url()));
    let (mut conn, identify) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();

    let d = identify.d.unwrap();
    assert_eq!(d["token"], TEST_TOKEN);
    assert_eq!(
        d["properties"],
        serde_json::to_value(IdentifyProperties::for_connection(0)).unwrap()
    );
    assert_eq!(d["presence"]["status"], "idle");
    assert_eq!(d["presence"]["afk"], false);
    assert_eq!(d["presence"]["activities"].as_array().unwrap().len(), 1);

    let voice = conn.recv_op(OpCode::VoiceStateUpdate).await.unwrap();
    let d = voice.d.unwrap();
    assert_eq!(d["guild_id"], TEST_GUILD_ID);
    assert_eq!(d["channel_id"], TEST_CHANNEL_ID);
    assert_eq!(d["self_mute"], true);
    assert_eq!(d["self_deaf"], true);

    {
        let session = state.lock();
        assert_eq!(session.session_id.as_deref(), Some(session_id.as_str()));
        assert_eq!(session.sequence, Some(1));
        assert_eq!(session.resume_url, Some(gateway.resume_url()));
        assert!(session.connected);
    }

    handle.abort();
}

#[tokio::test]
async fn test_connection_ordinal_changes_fingerprint() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(3, gateway.url()), fresh_state());

    let ready = ready_message(1, &unique_session_id(), None);
    let (_conn, identify) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();

    assert_eq!(
        identify.d.unwrap()["properties"],
        serde_json::to_value(IdentifyProperties::for_connection(3)).unwrap()
    );

    handle.abort();
}

#[tokio::test]
async fn test_resume_uses_resume_url_and_sequence() {
    let gateway = MockGateway::start().await.unwrap();
    let state = fresh_state();
    {
        let mut session = state.lock();
        session.record_ready("resume-me".to_string(), Some(gateway.resume_url()));
        session.sequence = Some(7);
        session.mark_disconnected();
    }

    // The regular URL is dead, so only the resume URL can reach the mock
    let handle = spawn_session(test_context(0, closed_port_url()), Arc::clone(&state));

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(QUIET_HEARTBEAT_MS).await.unwrap();

    let resume = conn.recv().await.unwrap();
    assert_eq!(resume.op, OpCode::Resume);
    let d = resume.d.unwrap();
    assert_eq!(d["token"], TEST_TOKEN);
    assert_eq!(d["session_id"], "resume-me");
    assert_eq!(d["seq"], 7);

    conn.send(&resumed_message(8)).await.unwrap();
    wait_until(|| {
        let session = state.lock();
        session.connected && session.sequence == Some(8)
    })
    .await
    .unwrap();

    handle.abort();
}

#[tokio::test]
async fn test_first_frame_must_be_hello() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    let mut conn = gateway.accept().await.unwrap();
    conn.send(&ready_message(1, "early", None)).await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(matches!(error, GatewayError::Protocol(_)), "got {error:?}");
}

#[tokio::test]
async fn test_silent_gateway_times_out_waiting_for_hello() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    // Upgrade completes but hello never comes
    let _conn = gateway.accept().await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(
        matches!(error, GatewayError::ConnectTimeout(t) if t == Duration::from_secs(2)),
        "got {error:?}"
    );
}

#[tokio::test]
async fn test_unreachable_gateway() {
    let handle = spawn_session(test_context(0, closed_port_url()), fresh_state());

    let error = session_result(handle).await.unwrap();
    assert!(matches!(error, GatewayError::Transport(_)), "got {error:?}");
}

// ============================================================================
// Heartbeats
// ============================================================================

#[tokio::test]
async fn test_heartbeat_carries_sequence() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    let ready = ready_message(3, &unique_session_id(), None);
    let (mut conn, _) = gateway.accept_identified(100, &ready).await.unwrap();

    let first = conn.recv_op(OpCode::Heartbeat).await.unwrap();
    assert_eq!(first.d, Some(json!(3)));
    conn.send(&GatewayMessage::heartbeat_ack()).await.unwrap();

    // Acked, so the loop keeps going
    let second = conn.recv_op(OpCode::Heartbeat).await.unwrap();
    assert_eq!(second.d, Some(json!(3)));

    handle.abort();
}

#[tokio::test]
async fn test_server_heartbeat_request_answered() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    let ready = ready_message(5, &unique_session_id(), None);
    let (mut conn, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();

    conn.send_raw(r#"{"op":1,"d":null}"#).await.unwrap();
    let reply = conn.recv_op(OpCode::Heartbeat).await.unwrap();
    assert_eq!(reply.d, Some(json!(5)));

    handle.abort();
}

#[tokio::test]
async fn test_missing_ack_is_zombie() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    let ready = ready_message(1, &unique_session_id(), None);
    let (mut conn, _) = gateway.accept_identified(50, &ready).await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(matches!(error, GatewayError::ZombieConnection), "got {error:?}");
    assert_eq!(conn.expect_close().await.unwrap(), Some(4000));
}

// ============================================================================
// Session endings
// ============================================================================

#[tokio::test]
async fn test_reconnect_request_keeps_session() {
    let gateway = MockGateway::start().await.unwrap();
    let state = fresh_state();
    let handle = spawn_session(test_context(0, gateway.url()), Arc::clone(&state));

    let ready = ready_message(1, &unique_session_id(), Some(&gateway.resume_url()));
    let (mut conn, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    conn.send(&GatewayMessage::reconnect()).await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(matches!(error, GatewayError::ReconnectRequested), "got {error:?}");
    assert!(state.lock().can_resume());
    assert_eq!(conn.expect_close().await.unwrap(), Some(4000));
}

#[tokio::test]
async fn test_invalid_session_not_resumable_resets_state() {
    let gateway = MockGateway::start().await.unwrap();
    let state = fresh_state();
    let handle = spawn_session(test_context(0, gateway.url()), Arc::clone(&state));

    let ready = ready_message(1, &unique_session_id(), None);
    let (mut conn, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    conn.send(&GatewayMessage::invalid_session(false)).await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(
        matches!(error, GatewayError::InvalidSession { resumable: false }),
        "got {error:?}"
    );
    assert!(!state.lock().can_resume());
}

#[tokio::test]
async fn test_session_timeout_close_resets_state() {
    let gateway = MockGateway::start().await.unwrap();
    let state = fresh_state();
    let handle = spawn_session(test_context(0, gateway.url()), Arc::clone(&state));

    let ready = ready_message(1, &unique_session_id(), None);
    let (mut conn, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    conn.close(4009, "Session timed out").await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(
        matches!(error, GatewayError::Closed { code: Some(4009), .. }),
        "got {error:?}"
    );
    assert!(!state.lock().can_resume());
}

#[tokio::test]
async fn test_undecodable_frame_skipped() {
    let gateway = MockGateway::start().await.unwrap();
    let handle = spawn_session(test_context(0, gateway.url()), fresh_state());

    let ready = ready_message(1, &unique_session_id(), None);
    let (mut conn, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    conn.send_raw("not json at all").await.unwrap();
    conn.send(&GatewayMessage::reconnect()).await.unwrap();

    let error = session_result(handle).await.unwrap();
    assert!(matches!(error, GatewayError::ReconnectRequested), "got {error:?}");
}

// ============================================================================
// Supervisor
// ============================================================================

#[tokio::test]
async fn test_supervisor_resumes_after_reconnect_request() {
    let gateway = MockGateway::start().await.unwrap();
    let supervisor = Supervisor::new(test_context(0, gateway.url()));
    let state = Arc::clone(supervisor.state());
    let handle = tokio::spawn(supervisor.run());

    let session_id = unique_session_id();
    let ready = ready_message(1, &session_id, Some(&gateway.resume_url()));
    let (mut first, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    first.recv_op(OpCode::VoiceStateUpdate).await.unwrap();
    first.send(&GatewayMessage::reconnect()).await.unwrap();

    let mut second = gateway.accept().await.unwrap();
    second.hello(QUIET_HEARTBEAT_MS).await.unwrap();
    let resume = second.recv().await.unwrap();
    assert_eq!(resume.op, OpCode::Resume);
    let d = resume.d.unwrap();
    assert_eq!(d["session_id"], session_id.as_str());
    assert_eq!(d["seq"], 1);

    second.send(&resumed_message(2)).await.unwrap();
    wait_until(|| {
        let session = state.lock();
        session.connected && session.sequence == Some(2)
    })
    .await
    .unwrap();

    handle.abort();
}

#[tokio::test]
async fn test_supervisor_identifies_after_invalid_session() {
    let gateway = MockGateway::start().await.unwrap();
    let supervisor = Supervisor::new(test_context(0, gateway.url()));
    let handle = tokio::spawn(supervisor.run());

    let ready = ready_message(1, &unique_session_id(), Some(&gateway.resume_url()));
    let (mut first, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    first.send(&GatewayMessage::invalid_session(false)).await.unwrap();

    let mut second = gateway.accept().await.unwrap();
    second.hello(QUIET_HEARTBEAT_MS).await.unwrap();
    let next = second.recv().await.unwrap();
    assert_eq!(next.op, OpCode::Identify);

    handle.abort();
}

#[tokio::test]
async fn test_supervisor_resumes_after_resumable_invalid_session() {
    let gateway = MockGateway::start().await.unwrap();
    let supervisor = Supervisor::new(test_context(0, gateway.url()));
    let handle = tokio::spawn(supervisor.run());

    let ready = ready_message(4, &unique_session_id(), Some(&gateway.resume_url()));
    let (mut first, _) = gateway
        .accept_identified(QUIET_HEARTBEAT_MS, &ready)
        .await
        .unwrap();
    first.send(&GatewayMessage::invalid_session(true)).await.unwrap();

    let mut second = gateway.accept().await.unwrap();
    second.hello(QUIET_HEARTBEAT_MS).await.unwrap();
    let next = second.recv().await.unwrap();
    assert_eq!(next.op, OpCode::Resume);
    assert_eq!(next.d.unwrap()["seq"], 4);

    handle.abort();
}

#[tokio::test]
async fn test_supervisor_retries_after_dropped_connection() {
    let gateway = MockGateway::start().await.unwrap();
    let supervisor = Supervisor::new(test_context(0, gateway.url()));
    let handle = tokio::spawn(supervisor.run());

    // Drop the first socket before hello
    drop(gateway.accept().await.unwrap());

    let mut second = gateway.accept().await.unwrap();
    second.hello(QUIET_HEARTBEAT_MS).await.unwrap();
    let next = second.recv().await.unwrap();
    assert_eq!(next.op, OpCode::Identify);

    handle.abort();
}
