use serde_json::json;

use super::*;

fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_defaults_from_empty() {
    let settings = ButtonSettings::from_map(&Map::new());
    assert_eq!(settings, ButtonSettings::default());
    assert_eq!(settings.control_mode, ControlMode::Local);
    assert_eq!(settings.display_mode, "cover_title_artists");
    assert_eq!(settings.progress_mode, "stacked");
    assert_eq!(settings.like_style, "v1");
    assert!(settings.show_cover && settings.show_title && settings.show_artist);
}

#[test]
fn test_unknown_keys_survive_round_trip() {
    let settings = ButtonSettings::from_map(&map(json!({
        "like_style": "v2",
        "custom_flag": 7
    })));
    assert_eq!(settings.like_style, "v2");
    let out = settings.to_map();
    assert_eq!(out["custom_flag"], 7);
    assert_eq!(out["like_style"], "v2");
    assert_eq!(out["control_mode"], "local");
}

#[test]
fn test_control_mode_lenient() {
    let settings = ButtonSettings::from_map(&map(json!({"control_mode": " YNISON "})));
    assert_eq!(settings.control_mode, ControlMode::Ynison);
    assert_eq!(settings.to_map()["control_mode"], "ynison");

    let settings = ButtonSettings::from_map(&map(json!({"control_mode": "bogus"})));
    assert_eq!(settings.control_mode, ControlMode::Local);

    let settings = ButtonSettings::from_map(&map(json!({"control_mode": null})));
    assert_eq!(settings.control_mode, ControlMode::Local);
}

#[test]
fn test_wrong_type_falls_back_to_default() {
    let settings = ButtonSettings::from_map(&map(json!({
        "show_title": "no",
        "mute_style": "v3"
    })));
    assert!(settings.show_title);
    assert_eq!(settings.mute_style, "v3");
}

#[test]
fn test_merge_overlays_patch() {
    let mut settings = ButtonSettings::from_map(&map(json!({"play_style": "v2", "x": 1})));
    settings.merge(&map(json!({"control_mode": "ynison", "show_artist": false})));
    assert_eq!(settings.control_mode, ControlMode::Ynison);
    assert!(!settings.show_artist);
    assert_eq!(settings.play_style, "v2");
    assert_eq!(settings.extra["x"], 1);
}

#[test]
fn test_global_settings_port_forms() {
    let global = GlobalSettings::from_map(&map(json!({"local_port": "9333", "token": "t"})));
    assert_eq!(global.local_port(), Some(9333));
    assert_eq!(global.token(), Some("t"));

    let global = GlobalSettings::from_map(&map(json!({"local_port": 9222})));
    assert_eq!(global.local_port(), Some(9222));
    assert_eq!(global.token(), None);

    let global = GlobalSettings::from_map(&map(json!({"local_port": "abc", "token": ""})));
    assert_eq!(global.local_port(), None);
    assert_eq!(global.token(), None);
}

#[test]
fn test_global_settings_keep_extra() {
    let global = GlobalSettings::from_map(&map(json!({"token": "t", "theme": "dark"})));
    assert_eq!(global.to_value(), json!({"token": "t", "theme": "dark"}));
}

#[test]
fn test_global_settings_bad_token_type() {
    let global = GlobalSettings::from_map(&map(json!({"token": 5})));
    assert_eq!(global.token(), None);
    assert_eq!(global.extra["token"], 5);
}
