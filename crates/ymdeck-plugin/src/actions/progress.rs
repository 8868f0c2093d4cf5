//! Track position as title text.
//!
//! Between page readings the position is advanced locally, so the button
//! ticks every half second while playing without waiting on the page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::warn;

use crate::action::{Action, ActionHandle, TaskSlot};
use crate::error::PluginError;
use crate::store::Topic;

pub const PLAYING_REFRESH: Duration = Duration::from_millis(500);
pub const PAUSED_REFRESH: Duration = Duration::from_secs(1);

const CLI_BAR_WIDTH: usize = 12;
const MODERN_BAR_WIDTH: usize = 8;

/// `m:ss`, minutes unbounded.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

fn bar(ratio: f64, width: usize, filled: char, empty: char) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let count = (width as f64 * ratio).floor() as usize;
    std::iter::repeat_n(filled, count)
        .chain(std::iter::repeat_n(empty, width - count))
        .collect()
}

/// Title for `mode` (`progress_mode` setting). Unknown modes fall back to
/// `stacked`.
pub fn progress_text(mode: &str, current_sec: f64, total_sec: f64) -> String {
    let current = format_time(current_sec);
    let total = format_time(total_sec);
    let ratio = if total_sec > 0.0 { current_sec / total_sec } else { 0.0 };
    match mode {
        "inline" => format!("{} / {}", current, total),
        "current_only" => current,
        "total_only" => total,
        "bar_cli" => format!("[{}]", bar(ratio, CLI_BAR_WIDTH, '█', '░')),
        "bar_modern" => format!("{}\n{}", current, bar(ratio, MODERN_BAR_WIDTH, '▰', '▱')),
        _ => format!("{}\n{}", current, total),
    }
}

async fn render_progress(handle: &ActionHandle) -> Result<(), PluginError> {
    let mode = handle.settings().progress_mode;
    let state = handle.store().snapshot();
    let (current, total) = if state.connected {
        let total = state.playback.total_sec;
        (state.playback.position_at(Instant::now()), total)
    } else {
        (0.0, 0.0)
    };
    handle.set_title(&progress_text(&mode, current, total))
}

async fn tick(handle: Arc<ActionHandle>) {
    loop {
        let playing = {
            let state = handle.store().snapshot();
            state.connected && state.playback.is_playing
        };
        if !playing {
            tokio::time::sleep(PAUSED_REFRESH).await;
            continue;
        }
        tokio::time::sleep(PLAYING_REFRESH).await;
        if let Err(e) = render_progress(&handle).await {
            warn!(error = %e, "Progress render failed");
            tokio::time::sleep(PAUSED_REFRESH).await;
        }
    }
}

pub struct ProgressDisplay {
    handle: Arc<ActionHandle>,
    ticker: TaskSlot,
}

impl ProgressDisplay {
    pub fn create(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self::new(handle))
    }

    pub(crate) fn new(handle: Arc<ActionHandle>) -> Self {
        Self {
            handle,
            ticker: TaskSlot::default(),
        }
    }
}

#[async_trait]
impl Action for ProgressDisplay {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Playback]
    }

    async fn render(&self) -> Result<(), PluginError> {
        render_progress(&self.handle).await
    }

    async fn will_appear(&self) -> Result<(), PluginError> {
        self.ticker.start(tick(self.handle.clone()));
        Ok(())
    }

    async fn will_disappear(&self) {
        self.ticker.cancel();
    }
}

#[cfg(test)]
impl ProgressDisplay {
    pub(crate) fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }
}
