//! End-to-end tests wiring the registry, broadcaster, keepalive, bridge,
//! and stats together over real channel sinks.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use hearth_core::ConnectionId;
use hearth_events::{EventType, PushEvent};
use hearth_realtime::{
    parse_event, ChannelSink, ConnectionRegistry, EventBridge, EventBroadcaster,
    KeepAliveManager, RealtimeConfig, StatsReporter, KEEPALIVE_FRAME,
};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<EventBroadcaster>,
    keepalive: KeepAliveManager,
    stats: StatsReporter,
}

fn boot() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let registry = Arc::new(ConnectionRegistry::new());
    Harness {
        broadcaster: Arc::new(EventBroadcaster::new(registry.clone())),
        keepalive: KeepAliveManager::new(registry.clone()),
        stats: StatsReporter::new(registry.clone()),
        registry,
    }
}

async fn connect(
    harness: &Harness,
    user: &str,
    household: &str,
) -> (ConnectionId, mpsc::Receiver<Arc<String>>) {
    let (sink, rx) = ChannelSink::bounded(RealtimeConfig::default().send_queue_capacity);
    let id = harness
        .registry
        .register(user.into(), household.into(), Box::new(sink))
        .await;
    (id, rx)
}

async fn next_frame(rx: &mut mpsc::Receiver<Arc<String>>) -> Arc<String> {
    timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn household_fan_out_scenario() {
    let harness = boot();
    let (_a, mut rx_a) = connect(&harness, "user-1", "household-1").await;
    let (_b, mut rx_b) = connect(&harness, "user-2", "household-1").await;
    let (_c, mut rx_c) = connect(&harness, "user-3", "household-2").await;

    let event = PushEvent::new(
        EventType::TaskCreated,
        "household-1",
        Some(json!({"taskId": "t1", "title": "Dishes"})),
    );
    let sent = harness
        .broadcaster
        .broadcast_to_household(&"household-1".into(), &event)
        .await;

    assert_eq!(sent, 2);
    assert!(next_frame(&mut rx_a).await.contains("event: task_created"));
    assert!(next_frame(&mut rx_b).await.contains("event: task_created"));
    assert!(rx_c.try_recv().is_err());
}

#[tokio::test]
async fn one_user_two_tabs_scenario() {
    let harness = boot();
    let (a, _rx_a) = connect(&harness, "user-1", "household-1").await;
    let (b, _rx_b) = connect(&harness, "user-1", "household-1").await;

    let conns = harness
        .registry
        .connections_for_user(&"user-1".into())
        .await;
    assert_eq!(conns.len(), 2);
    assert!(conns.contains(&a));
    assert!(conns.contains(&b));
}

#[tokio::test]
async fn stats_scenario() {
    let harness = boot();
    let (_a, _rx_a) = connect(&harness, "user-1", "household-1").await;
    let (_b, _rx_b) = connect(&harness, "user-2", "household-1").await;
    let (_c, _rx_c) = connect(&harness, "user-3", "household-2").await;

    let stats = harness.stats.stats().await;
    assert_eq!(stats.total_connections, 3);
    assert_eq!(stats.households_active, 2);
    assert_eq!(stats.connections_by_household[&"household-1".into()], 2);
    assert_eq!(stats.connections_by_household[&"household-2".into()], 1);
}

#[tokio::test]
async fn delivered_frame_round_trips_to_the_emitted_event() {
    let harness = boot();
    let (_a, mut rx) = connect(&harness, "user-1", "household-1").await;

    let payload = json!({"taskId": "t9", "completedBy": "user-1", "pointsAwarded": 25});
    let event = PushEvent::new(
        EventType::TaskCompleted,
        "household-1",
        Some(payload.clone()),
    );
    let sent = harness
        .broadcaster
        .broadcast_to_household(&"household-1".into(), &event)
        .await;
    assert_eq!(sent, 1);

    let frame = next_frame(&mut rx).await;
    let parsed = parse_event(&frame).unwrap();
    assert_eq!(parsed.event_type, EventType::TaskCompleted.as_str());
    assert_eq!(parsed.payload, payload);
    assert!(!parsed.event_id.is_empty());
}

#[tokio::test]
async fn dead_client_is_isolated_and_evicted() {
    let harness = boot();
    let (_a, mut rx_a) = connect(&harness, "user-1", "household-1").await;
    let (b, rx_b) = connect(&harness, "user-2", "household-1").await;
    let (_c, mut rx_c) = connect(&harness, "user-3", "household-1").await;
    // B's transport died without a clean disconnect.
    drop(rx_b);

    let event = PushEvent::new(EventType::TaskDeleted, "household-1", None);
    let sent = harness
        .broadcaster
        .broadcast_to_household(&"household-1".into(), &event)
        .await;

    // The two live clients are unaffected and counted.
    assert_eq!(sent, 2);
    assert!(next_frame(&mut rx_a).await.contains("event: task_deleted"));
    assert!(next_frame(&mut rx_c).await.contains("event: task_deleted"));
    // The dead connection is gone; a later broadcast only counts the rest.
    assert!(harness.registry.get(&b).await.is_none());
    assert_eq!(
        harness
            .registry
            .connection_count(&"household-1".into())
            .await,
        2
    );
}

#[tokio::test]
async fn removed_connection_stays_removed() {
    let harness = boot();
    let (id, _rx) = connect(&harness, "user-1", "household-1").await;

    assert!(harness.registry.remove(&id).await);
    // Double removal is a silent no-op.
    assert!(!harness.registry.remove(&id).await);

    let event = PushEvent::new(EventType::TaskUpdated, "household-1", None);
    assert!(!harness.broadcaster.send_to_connection(&id, &event).await);
    assert!(!harness.keepalive.send_ping(&id).await);
}

#[tokio::test]
async fn reconnect_gets_a_fresh_id() {
    let harness = boot();
    let (old, _rx_old) = connect(&harness, "user-1", "household-1").await;
    assert!(harness.registry.remove(&old).await);

    let (new, _rx_new) = connect(&harness, "user-1", "household-1").await;
    assert_ne!(old, new);
    assert_eq!(
        harness
            .registry
            .connection_count(&"household-1".into())
            .await,
        1
    );
}

#[tokio::test]
async fn ping_then_sweep_keeps_live_connections() {
    let harness = boot();
    let (live, mut rx_live) = connect(&harness, "user-1", "household-1").await;
    let (dead, rx_dead) = connect(&harness, "user-2", "household-1").await;
    drop(rx_dead);

    std::thread::sleep(Duration::from_millis(15));
    // The live client gets its ping (activity refreshed); the dead one is
    // evicted by the ping itself.
    assert!(harness.keepalive.send_ping(&live).await);
    assert!(!harness.keepalive.send_ping(&dead).await);
    assert_eq!(&*next_frame(&mut rx_live).await, KEEPALIVE_FRAME);

    let evicted = harness
        .keepalive
        .cleanup_stale_connections(Duration::from_millis(10))
        .await;
    assert_eq!(evicted, 0);
    assert!(harness.registry.get(&live).await.is_some());
    assert!(harness.registry.get(&dead).await.is_none());
}

#[tokio::test]
async fn sweep_reclaims_silent_connections() {
    let harness = boot();
    let (silent, _rx) = connect(&harness, "user-1", "household-1").await;

    std::thread::sleep(Duration::from_millis(20));
    let evicted = harness
        .keepalive
        .cleanup_stale_connections(Duration::from_millis(10))
        .await;

    assert_eq!(evicted, 1);
    assert!(harness.registry.get(&silent).await.is_none());
    assert_eq!(harness.stats.stats().await.total_connections, 0);
}

#[tokio::test]
async fn bridge_routes_by_scope_end_to_end() {
    let harness = boot();
    let (_p, mut rx_parent) = connect(&harness, "parent", "household-1").await;
    let (_k, mut rx_kid) = connect(&harness, "kid", "household-1").await;
    let (_n, mut rx_neighbor) = connect(&harness, "neighbor", "household-2").await;

    let (tx, rx) = broadcast::channel(32);
    let bridge = EventBridge::new(rx, harness.broadcaster.clone());
    let bridge_handle = tokio::spawn(bridge.run());

    // Household event: both household-1 members, not the neighbor.
    let _ = tx
        .send(PushEvent::new(
            EventType::TaskCreated,
            "household-1",
            Some(json!({"taskId": "t1"})),
        ))
        .unwrap();
    assert!(next_frame(&mut rx_parent).await.contains("event: task_created"));
    assert!(next_frame(&mut rx_kid).await.contains("event: task_created"));

    // User event: only the kid sees their streak.
    let _ = tx
        .send(
            PushEvent::new(
                EventType::StreakUpdated,
                "household-1",
                Some(json!({"streakDays": 4})),
            )
            .for_user("kid"),
        )
        .unwrap();
    assert!(next_frame(&mut rx_kid).await.contains("event: streak_updated"));
    assert!(rx_parent.try_recv().is_err());
    assert!(rx_neighbor.try_recv().is_err());

    drop(tx);
    timeout(TIMEOUT, bridge_handle).await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn keepalive_loop_pings_until_cancelled() {
    let harness = boot();
    let keepalive = Arc::new(KeepAliveManager::new(harness.registry.clone()));
    let (_id, mut rx) = connect(&harness, "user-1", "household-1").await;

    let cancel = CancellationToken::new();
    let config = RealtimeConfig::default();
    let runner = keepalive.clone();
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move { runner.run(&config, run_cancel).await });

    // Two consecutive interval ticks under paused time. The timeout must
    // exceed the ping interval or auto-advance reaches it first.
    for _ in 0..2 {
        let frame = timeout(Duration::from_secs(60), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&*frame, KEEPALIVE_FRAME);
    }

    cancel.cancel();
    timeout(TIMEOUT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn slow_client_does_not_stall_the_fan_out() {
    let harness = boot();
    // A deliberately tiny queue that we saturate up front.
    let (slow_sink, _slow_rx) = ChannelSink::bounded(1);
    let slow = harness
        .registry
        .register("user-1".into(), "household-1".into(), Box::new(slow_sink))
        .await;
    let (_fast, mut rx_fast) = connect(&harness, "user-2", "household-1").await;

    for i in 0..3 {
        let event = PushEvent::new(
            EventType::TaskUpdated,
            "household-1",
            Some(json!({"seq": i})),
        );
        let _ = harness
            .broadcaster
            .broadcast_to_household(&"household-1".into(), &event)
            .await;
    }

    // The fast client saw every frame; the slow one kept its slot (first
    // frame) and dropped the rest without delaying anyone.
    for i in 0..3 {
        assert!(next_frame(&mut rx_fast).await.contains(&format!("\"seq\":{i}")));
    }
    let slow_conn = harness.registry.get(&slow).await.unwrap();
    assert_eq!(slow_conn.drop_count(), 2);
}

#[tokio::test]
async fn register_is_immediately_eligible_for_broadcast() {
    let harness = boot();
    let (_id, mut rx) = connect(&harness, "user-1", "household-1").await;

    let event = PushEvent::new(EventType::NotificationNew, "household-1", None)
        .for_user("user-1");
    let sent = harness
        .broadcaster
        .broadcast_to_user(&"user-1".into(), &event)
        .await;

    assert_eq!(sent, 1);
    assert!(next_frame(&mut rx).await.contains("event: notification_new"));
}
