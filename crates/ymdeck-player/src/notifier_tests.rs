use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::selectors::PlayerSelectors;
use crate::testing::{FakeDom, RecordingSink, player_page};

struct Harness {
    dom: Arc<FakeDom>,
    sink: Arc<RecordingSink>,
    notifier: Arc<ChangeNotifier>,
}

fn harness() -> Harness {
    let dom = Arc::new(FakeDom::new());
    let sink = Arc::new(RecordingSink::new());
    let controller = Arc::new(PlayerController::new(dom.clone(), PlayerSelectors::default()));
    let notifier = Arc::new(ChangeNotifier::new(controller, Some(sink.clone())));
    Harness {
        dom,
        sink,
        notifier,
    }
}

fn kinds(sink: &RecordingSink) -> Vec<UpdateKind> {
    sink.updates().into_iter().map(|u| u.kind).collect()
}

#[test]
fn test_update_wire_shape() {
    let update = PlayerUpdate {
        kind: UpdateKind::FullState,
        payload: serde_json::json!({"a": 1}),
    };
    let text = serde_json::to_string(&update).unwrap();
    assert_eq!(text, r#"{"type":"FULL_STATE","payload":{"a":1}}"#);

    let delta: PlayerUpdate =
        serde_json::from_str(r#"{"type":"DELTA","payload":{"b":2}}"#).unwrap();
    assert_eq!(delta.kind, UpdateKind::Delta);
}

#[tokio::test]
async fn test_first_tick_is_full_state() {
    let h = harness();
    player_page(&h.dom);

    assert_eq!(h.notifier.tick().await, Some(UpdateKind::FullState));
    let updates = h.sink.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].payload["track"]["title"], "Song");
    assert_eq!(updates[0].payload["volume"]["current"], 40);
}

#[tokio::test]
async fn test_unchanged_page_emits_nothing() {
    let h = harness();
    player_page(&h.dom);

    h.notifier.tick().await;
    assert_eq!(h.notifier.tick().await, None);
    assert_eq!(h.sink.messages().len(), 1);
}

#[tokio::test]
async fn test_change_emits_delta_only() {
    let h = harness();
    let page = player_page(&h.dom);

    h.notifier.tick().await;
    h.dom.set_text(&page.time_now, "1:30");
    assert_eq!(h.notifier.tick().await, Some(UpdateKind::Delta));

    let delta = &h.sink.updates()[1].payload;
    assert_eq!(delta["progress"]["now_sec"], 90.0);
    assert!(delta.get("track").is_none());
    assert!(delta["progress"].get("total_sec").is_none());
}

#[tokio::test]
async fn test_force_sync_when_idle_emits_immediately() {
    let h = harness();
    let page = player_page(&h.dom);

    h.notifier.tick().await;
    h.dom.set_text(&page.time_now, "0:31");
    h.notifier.tick().await;
    h.notifier.force_sync().await;

    assert_eq!(
        kinds(&h.sink),
        vec![UpdateKind::FullState, UpdateKind::Delta, UpdateKind::FullState]
    );
}

#[tokio::test]
async fn test_failed_extraction_skips_tick() {
    let h = harness();
    assert_eq!(h.notifier.tick().await, None);

    player_page(&h.dom);
    assert_eq!(h.notifier.tick().await, Some(UpdateKind::FullState));
}

#[tokio::test]
async fn test_missing_sink_is_silent() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let controller = Arc::new(PlayerController::new(dom.clone(), PlayerSelectors::default()));
    let notifier = ChangeNotifier::new(controller, None);
    assert_eq!(notifier.tick().await, Some(UpdateKind::FullState));
}

#[tokio::test]
async fn test_channel_sink_delivers() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let controller = Arc::new(PlayerController::new(dom.clone(), PlayerSelectors::default()));
    let notifier = ChangeNotifier::new(controller, Some(Arc::new(tx)));

    notifier.tick().await;
    let message = rx.recv().await.unwrap();
    assert!(message.starts_with(r#"{"type":"FULL_STATE""#));

    drop(rx);
    notifier.force_sync().await;
}

#[tokio::test(start_paused = true)]
async fn test_observation_starts_with_full_state() {
    let h = harness();
    let page = player_page(&h.dom);

    assert!(h.notifier.start_observation());
    assert_eq!(h.notifier.state(), ObserverState::Observing);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(kinds(&h.sink), vec![UpdateKind::FullState]);

    h.dom.set_attr(&page.like, "aria-pressed", "true");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(kinds(&h.sink), vec![UpdateKind::FullState, UpdateKind::Delta]);
    assert_eq!(h.sink.updates()[1].payload["state"]["liked"], true);

    h.notifier.stop_observation();
}

#[tokio::test(start_paused = true)]
async fn test_force_sync_while_observing_defers_to_tick() {
    let h = harness();
    player_page(&h.dom);

    h.notifier.start_observation();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.notifier.force_sync().await;
    assert_eq!(h.sink.messages().len(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(kinds(&h.sink), vec![UpdateKind::FullState, UpdateKind::FullState]);
    h.notifier.stop_observation();
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_polling() {
    let h = harness();
    let page = player_page(&h.dom);

    h.notifier.start_observation();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.notifier.stop_observation();
    assert_eq!(h.notifier.state(), ObserverState::Idle);

    h.dom.set_text(&page.time_now, "2:00");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(h.sink.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_runs_single_loop() {
    let h = harness();
    let page = player_page(&h.dom);

    assert!(h.notifier.start_observation());
    assert!(!h.notifier.start_observation());
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.notifier.stop_observation();
    assert!(h.notifier.start_observation());
    tokio::time::sleep(Duration::from_millis(20)).await;

    // One FULL_STATE per start.
    assert_eq!(kinds(&h.sink), vec![UpdateKind::FullState, UpdateKind::FullState]);

    h.dom.set_text(&page.time_now, "0:45");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        kinds(&h.sink),
        vec![UpdateKind::FullState, UpdateKind::FullState, UpdateKind::Delta]
    );
    h.notifier.stop_observation();
}
