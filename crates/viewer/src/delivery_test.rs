//! Tests for the delivery loop
//!
//! Each test runs real loops as tasks against the in-memory store and
//! observes the frames arriving at the transport peer.

use std::time::Duration;

use tokio::time::timeout;

use sift_store::{Fields, MemoryStore};

use crate::session::SessionState;
use crate::transport::{ChannelTransport, TransportPeer};

use super::*;

const RECV_WINDOW: Duration = Duration::from_millis(500);

fn test_config(heartbeat: Duration) -> ViewerConfig {
    ViewerConfig {
        raw_topic: "ingest".to_string(),
        group: "viewers".to_string(),
        heartbeat_interval: heartbeat,
        empty_idle: Duration::from_millis(10),
        block: Duration::from_millis(20),
    }
}

/// Heartbeats effectively off for tests that only care about delivery
fn no_heartbeat() -> ViewerConfig {
    test_config(Duration::from_secs(60))
}

fn event_fields(level: &str, message: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        EVENT_FIELD.to_string(),
        format!(
            "{{\"timestamp\":\"2024-05-01T10:00:00\",\"hostname\":\"web-1\",\
             \"log_level\":\"{level}\",\"message\":\"{message}\"}}"
        ),
    );
    fields
}

fn spawn_session(
    store: &Arc<MemoryStore>,
    id: u64,
    topics: &[&str],
    config: ViewerConfig,
) -> (Arc<Session>, TransportPeer, tokio::task::JoinHandle<()>) {
    let session = Arc::new(Session::new(id, topics.iter().map(|t| t.to_string())));
    session.activate();
    let (transport, peer) = ChannelTransport::pair();
    let delivery = DeliveryLoop::new(
        Arc::clone(store) as Arc<dyn LogStore>,
        Arc::clone(&session),
        config,
        transport,
    );
    let handle = tokio::spawn(delivery.run());
    (session, peer, handle)
}

/// Wait for the next non-ping frame, answering pings along the way
async fn next_message(peer: &mut TransportPeer) -> Option<serde_json::Value> {
    loop {
        let frame = timeout(RECV_WINDOW, peer.recv_json()).await.ok()??;
        if frame["type"] == "ping" {
            peer.reply("pong");
            continue;
        }
        return Some(frame);
    }
}

#[tokio::test]
async fn test_delivers_decoded_message_frames() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    let (_session, mut peer, handle) = spawn_session(&store, 1, &["error"], no_heartbeat());
    store.append("error", event_fields("ERROR", "boom"), None).await.unwrap();

    let frame = next_message(&mut peer).await.expect("message frame");
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["data"]["message"], "boom");
    assert_eq!(frame["data"]["log_level"], "ERROR");
    handle.abort();
}

#[tokio::test]
async fn test_entry_acked_and_never_redelivered() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    let (_session, mut peer, handle) = spawn_session(&store, 1, &["error"], no_heartbeat());
    store.append("error", event_fields("ERROR", "once"), None).await.unwrap();

    assert!(next_message(&mut peer).await.is_some());

    // The loop keeps polling; the same entry must not come back.
    let again = timeout(Duration::from_millis(200), peer.recv()).await;
    assert!(again.is_err(), "entry was redelivered: {again:?}");

    // And the viewer group holds no pending entry for this consumer.
    let backlog = store
        .read_group(
            "viewers",
            "viewer-1",
            &[("error".to_string(), sift_store::Cursor::Backlog)],
            10,
            Duration::ZERO,
        )
        .await
        .unwrap();
    assert!(backlog.is_empty());
    handle.abort();
}

#[tokio::test]
async fn test_competing_sessions_split_topic_entries() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    // Both sessions subscribe to the same topic in the shared viewer
    // group: entries are competed for, each goes to exactly one.
    let (_sa, mut peer_a, handle_a) = spawn_session(&store, 1, &["error"], no_heartbeat());
    let (_sb, mut peer_b, handle_b) = spawn_session(&store, 2, &["error"], no_heartbeat());

    store.append("error", event_fields("ERROR", "solo"), None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let got_a = peer_a.try_recv().is_some();
    let got_b = peer_b.try_recv().is_some();
    assert!(
        got_a ^ got_b,
        "entry must be delivered to exactly one competing session (a: {got_a}, b: {got_b})"
    );
    handle_a.abort();
    handle_b.abort();
}

#[tokio::test]
async fn test_heartbeat_roundtrip_carries_status() {
    let store = Arc::new(MemoryStore::new());
    let config = test_config(Duration::from_millis(20));
    let (_session, mut peer, handle) = spawn_session(&store, 1, &[], config);

    let ping = timeout(RECV_WINDOW, peer.recv_json()).await.unwrap().unwrap();
    assert_eq!(ping["type"], "ping");
    assert!(ping["data"]["timestamp"].is_i64());
    assert_eq!(ping["data"]["status"]["backend"], "memory");

    // Acknowledge and expect the loop to keep pinging.
    peer.reply("pong");
    let second = timeout(RECV_WINDOW, peer.recv_json()).await.unwrap().unwrap();
    assert_eq!(second["type"], "ping");
    handle.abort();
}

#[tokio::test]
async fn test_silent_session_stalls_alone() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();
    let config = test_config(Duration::from_millis(20));

    let (_silent, mut silent_peer, silent_handle) =
        spawn_session(&store, 1, &["error"], config.clone());
    let (_live, mut live_peer, live_handle) = spawn_session(&store, 2, &["error"], config);

    // Wait until the silent session is blocked inside its heartbeat.
    let ping = timeout(RECV_WINDOW, silent_peer.recv_json()).await.unwrap().unwrap();
    assert_eq!(ping["type"], "ping");
    // ...and never answer it.

    // The live session keeps receiving entries regardless.
    for i in 0..3 {
        store
            .append("error", event_fields("ERROR", &format!("m{i}")), None)
            .await
            .unwrap();
    }
    let mut delivered = 0;
    while delivered < 3 {
        let frame = next_message(&mut live_peer).await.expect("live session frame");
        assert_eq!(frame["type"], "message");
        delivered += 1;
    }

    // The silent session got nothing past its unanswered ping.
    assert!(silent_peer.try_recv().is_none());
    silent_handle.abort();
    live_handle.abort();
}

#[tokio::test]
async fn test_empty_subscription_set_idles_then_recovers() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    let (session, mut peer, handle) = spawn_session(&store, 1, &[], no_heartbeat());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(peer.try_recv().is_none());

    // Subscribing mid-flight brings the session into the read cycle.
    session.subscribe("error");
    store.append("error", event_fields("ERROR", "late"), None).await.unwrap();

    let frame = next_message(&mut peer).await.expect("frame after subscribe");
    assert_eq!(frame["data"]["message"], "late");
    handle.abort();
}

#[tokio::test]
async fn test_transport_closure_is_terminal() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    let (session, peer, handle) = spawn_session(&store, 1, &["error"], no_heartbeat());
    drop(peer);

    // The loop notices on its next send; trigger one.
    store.append("error", event_fields("ERROR", "bye"), None).await.unwrap();

    timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop must terminate")
        .unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_undecodable_entry_skipped_session_survives() {
    let store = Arc::new(MemoryStore::new());
    store.create_group("error", "viewers", true).await.unwrap();

    let (_session, mut peer, handle) = spawn_session(&store, 1, &["error"], no_heartbeat());

    let mut garbage = Fields::new();
    garbage.insert(EVENT_FIELD.to_string(), "not json at all".to_string());
    store.append("error", garbage, None).await.unwrap();
    store.append("error", event_fields("ERROR", "good"), None).await.unwrap();

    // Only the decodable entry arrives; the loop is still alive.
    let frame = next_message(&mut peer).await.expect("good entry");
    assert_eq!(frame["data"]["message"], "good");
    handle.abort();
}
