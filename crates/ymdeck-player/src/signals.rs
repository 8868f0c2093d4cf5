//! Markup heuristics.
//!
//! Every guess the controller makes about page state from icons, class names
//! or visible text lives here as a plain function, so a markup change in the
//! client means touching one function.

use std::sync::LazyLock;

use regex::Regex;

static TRACK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]trackId=(\d+)|track/(\d+)").expect("valid track id regex"));

static COVER_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+x\d+").expect("valid cover size regex"));

/// Cover size requested from the image CDN.
pub const COVER_SIZE: &str = "200x200";

/// Extract a track id from an href or URL (`?trackId=<id>` or `/track/<id>`).
pub fn match_track_id(source: &str) -> Option<String> {
    let caps = TRACK_ID_RE.captures(source)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Rewrite the first `<w>x<h>` size token of a cover URL.
pub fn upscale_cover(url: &str) -> String {
    COVER_SIZE_RE.replace(url, COVER_SIZE).into_owned()
}

/// Parse `M:SS` or `H:MM:SS` into seconds. Anything else, including values
/// too large to represent, is `0`.
pub fn parse_clock(text: &str) -> u64 {
    let parts: Option<Vec<u64>> = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect();
    let seconds = match parts.as_deref() {
        Some([m, s]) => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        Some([h, m, s]) => h
            .checked_mul(3600)
            .zip(m.checked_mul(60))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(*s)),
        _ => None,
    };
    seconds.unwrap_or(0)
}

/// Render seconds as `m:ss` (or `h:mm:ss` past an hour).
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Parse a numeric DOM property the way `parseFloat` would for well-formed
/// input.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// `now / total`, or `0` when the total is not positive or the result is not
/// finite. Always within `[0, 1]`.
pub fn progress_ratio(now: f64, total: f64) -> f64 {
    if total.is_nan() || total <= 0.0 {
        return 0.0;
    }
    let ratio = now / total;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalize a volume reading that may be on a 0..1 or 0..100 scale.
///
/// Values in `[0, 1]` are scaled by 100; larger values are taken as percent
/// and capped at 100.
pub fn to_percent(value: f64) -> u8 {
    if !value.is_finite() || value < 0.0 {
        return 0;
    }
    if value <= 1.0 {
        (value * 100.0).round() as u8
    } else {
        value.round().min(100.0) as u8
    }
}

/// Percent of a slider reading relative to its full scale.
///
/// A `max` of 1 or less means the value already is the fraction. The fraction
/// is clamped to the slider's range.
pub fn slider_percent(value: f64, max: f64) -> u8 {
    let max = if max.is_finite() && max != 0.0 { max } else { 1.0 };
    let ratio = if max <= 1.0 { value } else { value / max };
    if !ratio.is_finite() {
        return 0;
    }
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Clamp a volume target to `[0, 1]` with two-decimal precision.
pub fn clamp_fraction(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// `aria-pressed` is authoritative when present.
pub fn pressed_state(aria_pressed: Option<&str>) -> Option<bool> {
    aria_pressed.map(|v| v == "true")
}

pub fn class_marks_active(class_name: &str) -> bool {
    class_name.contains("active") || class_name.contains("checked")
}

pub fn icon_marks_active(icon_href: &str) -> bool {
    icon_href.contains("filled") || icon_href.contains("liked")
}

/// Active state of a toggle button (like/dislike): pressed attribute, then
/// class name, then icon reference.
pub fn is_toggle_active(aria_pressed: Option<&str>, class_name: &str, icon_href: Option<&str>) -> bool {
    if let Some(pressed) = pressed_state(aria_pressed) {
        return pressed;
    }
    if class_marks_active(class_name) {
        return true;
    }
    icon_href.is_some_and(icon_marks_active)
}

/// Mute state from the mute button's icon reference or class name.
pub fn is_muted(icon_href: Option<&str>, class_name: &str) -> bool {
    if let Some(href) = icon_href {
        let href = href.to_lowercase();
        if href.contains("off") || href.contains("mute") {
            return true;
        }
    }
    class_name.contains("muted") || class_name.contains("off")
}

/// Whether a play/pause button currently offers "pause", i.e. audio plays.
pub fn shows_pause(class_name: &str, test_id: Option<&str>) -> bool {
    class_name.contains("pause") || test_id == Some("PAUSE_BUTTON")
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
