use super::*;

#[test]
fn test_event_names_round_trip() {
    for kind in EventKind::ALL {
        assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
    }
    assert!("deviceDidConnect".parse::<EventKind>().is_err());
}

#[test]
fn test_action_events() {
    assert!(EventKind::KeyDown.is_action_event());
    assert!(EventKind::WillDisappear.is_action_event());
    assert!(!EventKind::DidReceiveGlobalSettings.is_action_event());
    assert!(!EventKind::SendToPlugin.is_action_event());
}

#[test]
fn test_parse_will_appear() {
    let text = r#"{
        "event": "willAppear",
        "action": "com.judd1.yandex_music.action.like",
        "context": "ctx1",
        "device": "dev1",
        "payload": {"settings": {"like_style": "v2"}, "coordinates": {"column": 1, "row": 0}}
    }"#;
    let event = InboundEvent::parse(text).unwrap();
    assert_eq!(event.kind(), Some(EventKind::WillAppear));
    assert_eq!(event.context().unwrap(), "ctx1");
    assert_eq!(event.settings()["like_style"], "v2");
}

#[test]
fn test_parse_minimal_event() {
    let event = InboundEvent::parse(r#"{"event":"systemDidWakeUp"}"#).unwrap();
    assert_eq!(event.kind(), Some(EventKind::SystemDidWakeUp));
    assert!(event.context().is_err());
    assert!(event.settings().is_empty());
    assert!(event.payload_object().is_empty());
}

#[test]
fn test_unknown_event_is_parsed_but_unrouted() {
    let event = InboundEvent::parse(r#"{"event":"dialRotate","context":"c"}"#).unwrap();
    assert_eq!(event.kind(), None);
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        InboundEvent::parse("not json"),
        Err(ProtocolError::Serialization(_))
    ));
}
