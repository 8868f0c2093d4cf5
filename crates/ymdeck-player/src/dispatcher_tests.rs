use std::sync::Arc;

use super::*;
use crate::selectors::PlayerSelectors;
use crate::testing::{FakeDom, FakeElement, FakeHostApi, player_page, sel};

fn controller(dom: &Arc<FakeDom>) -> PlayerController {
    PlayerController::new(dom.clone(), PlayerSelectors::default())
}

#[tokio::test]
async fn test_play_pause_predicts_toggle() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    let ctrl = controller(&dom);

    let outcome = ctrl.play_pause().await.unwrap();
    assert_eq!(outcome, CommandOutcome::PlayPause { is_playing: true });
    assert_eq!(dom.clicks(), vec![page.play.clone()]);

    dom.set_attr(&page.play, "class", "BaseSonataControls_pause");
    let outcome = ctrl.play_pause().await.unwrap();
    assert_eq!(outcome, CommandOutcome::PlayPause { is_playing: false });
}

#[tokio::test]
async fn test_play_pause_by_test_id() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.set_attr(&page.play, "class", "");
    dom.set_attr(&page.play, "data-test-id", "PAUSE_BUTTON");
    let outcome = controller(&dom).play_pause().await.unwrap();
    assert_eq!(outcome, CommandOutcome::PlayPause { is_playing: false });
}

#[tokio::test]
async fn test_next_and_prev_click() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    let ctrl = controller(&dom);

    assert_eq!(ctrl.next().await.unwrap(), CommandOutcome::Skipped);
    assert_eq!(ctrl.prev().await.unwrap(), CommandOutcome::PrevClicked);
    assert_eq!(dom.clicks(), vec![page.next, page.prev]);
}

#[tokio::test]
async fn test_disabled_control_unavailable() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.detach(&page.next);
    dom.add(&page.bar, FakeElement::new("button").matching(sel::NEXT).disabled());

    let err = controller(&dom).next().await.unwrap_err();
    assert!(matches!(err, PlayerError::ControlUnavailable(Control::Next)));
    assert!(dom.clicks().is_empty());
}

#[tokio::test]
async fn test_missing_control_unavailable() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.detach(&page.prev);
    let err = controller(&dom).prev().await.unwrap_err();
    assert!(matches!(err, PlayerError::ControlUnavailable(Control::Prev)));
    assert_eq!(err.reason(), "btn_not_found_or_disabled");
}

#[tokio::test]
async fn test_command_without_bar() {
    let dom = Arc::new(FakeDom::new());
    let err = controller(&dom).play_pause().await.unwrap_err();
    assert!(matches!(err, PlayerError::ContainerNotFound));
}

#[tokio::test]
async fn test_toggle_like_and_dislike() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    let ctrl = controller(&dom);

    assert_eq!(
        ctrl.toggle_like().await.unwrap(),
        CommandOutcome::Like { liked: true }
    );

    dom.set_attr(&page.dislike, "aria-pressed", "true");
    assert_eq!(
        ctrl.toggle_dislike().await.unwrap(),
        CommandOutcome::Dislike { disliked: false }
    );
    assert_eq!(dom.clicks(), vec![page.like, page.dislike]);
}

#[tokio::test]
async fn test_volume_up_through_slider() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);

    let outcome = controller(&dom).change_volume(VolumeAction::Up).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 45 });
    assert_eq!(dom.inputs(), vec![(page.volume, "0.45".to_string())]);
}

#[tokio::test]
async fn test_volume_down_clamps_at_zero() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.set_prop(&page.volume, "value", "0.02");

    let outcome = controller(&dom).change_volume(VolumeAction::Down).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 0 });
    assert_eq!(dom.inputs()[0].1, "0");
}

#[tokio::test]
async fn test_volume_set_on_percent_slider() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.set_prop(&page.volume, "max", "100");
    dom.set_prop(&page.volume, "value", "40");

    let outcome = controller(&dom)
        .change_volume(VolumeAction::Set(55.0))
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 55 });
    assert_eq!(dom.inputs()[0].1, "55");
}

#[tokio::test]
async fn test_volume_set_clamps_above_full() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let outcome = controller(&dom)
        .change_volume(VolumeAction::Set(150.0))
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 100 });
}

#[tokio::test]
async fn test_volume_prefers_host_api() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let host = Arc::new(FakeHostApi::new().with_volume(0.5).writable());
    let ctrl = controller(&dom).with_host(host.clone());

    let outcome = ctrl.change_volume(VolumeAction::Up).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 55 });
    assert_eq!(host.set_calls(), vec![0.55]);
    assert!(dom.inputs().is_empty());
}

#[tokio::test]
async fn test_read_only_host_falls_back_to_slider() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let host = Arc::new(FakeHostApi::new().with_volume(0.5));
    let ctrl = controller(&dom).with_host(host.clone());

    ctrl.change_volume(VolumeAction::Set(20.0)).await.unwrap();
    assert!(host.set_calls().is_empty());
    assert_eq!(dom.inputs()[0].1, "0.2");
}

#[tokio::test]
async fn test_volume_without_slider_unavailable() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);
    dom.detach(&page.volume);
    let err = controller(&dom)
        .change_volume(VolumeAction::Set(30.0))
        .await
        .unwrap_err();
    assert!(matches!(err, PlayerError::ControlUnavailable(Control::Volume)));
}

#[tokio::test]
async fn test_mute_clicks_button() {
    let dom = Arc::new(FakeDom::new());
    let page = player_page(&dom);

    let outcome = controller(&dom).change_volume(VolumeAction::Mute).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Mute { is_muted: true });
    assert_eq!(dom.clicks(), vec![page.mute]);
}

#[tokio::test]
async fn test_mute_through_host_api() {
    let dom = Arc::new(FakeDom::new());
    player_page(&dom);
    let host = Arc::new(FakeHostApi::new().with_volume(0.3).with_mute(true).writable());
    let ctrl = controller(&dom).with_host(host.clone());

    let outcome = ctrl.change_volume(VolumeAction::Mute).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Mute { is_muted: false });
    assert_eq!(host.mute_toggles(), 1);
    assert!(dom.clicks().is_empty());
}

#[tokio::test]
async fn test_volume_works_without_bar() {
    let dom = Arc::new(FakeDom::new());
    let slider = dom.add(
        &dom.root(),
        FakeElement::new("input")
            .matching(sel::VOLUME)
            .prop("value", "0.5")
            .prop("max", "1"),
    );
    let outcome = controller(&dom)
        .change_volume(VolumeAction::Down)
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 45 });
    assert_eq!(dom.inputs(), vec![(slider, "0.45".to_string())]);
}
