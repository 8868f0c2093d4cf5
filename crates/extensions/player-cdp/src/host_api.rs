//! [`HostApi`] over the page's `window.externalAPI`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use ymdeck_player::{DomError, HostApi};

use crate::cdp::PageSession;
use crate::dom::dom_error;

/// Wrap `body` so it runs with `api` bound, or yields `fallback` when the
/// page has no API.
fn with_api(body: &str, fallback: &str) -> String {
    format!(
        "(() => {{ const api = window.externalAPI; if (!api) return {fallback}; {body} }})()"
    )
}

fn numeric_getter(name: &str) -> String {
    with_api(
        &format!(
            "if (typeof api.{name} !== 'function') return null; \
             const v = Number(api.{name}()); return Number.isFinite(v) ? v : 0;"
        ),
        "null",
    )
}

/// Structured player API of the desktop client.
pub struct CdpHostApi {
    session: Arc<PageSession>,
}

impl CdpHostApi {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    async fn eval(&self, expression: &str) -> Result<Value, DomError> {
        self.session.evaluate(expression).await.map_err(dom_error)
    }

    async fn number(&self, getter: &str) -> Result<Option<f64>, DomError> {
        Ok(self.eval(&numeric_getter(getter)).await?.as_f64())
    }

    /// Whether `window.externalAPI` exists at all.
    pub async fn is_present(&self) -> Result<bool, DomError> {
        let value = self.eval("typeof window.externalAPI === 'object' && window.externalAPI !== null").await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl HostApi for CdpHostApi {
    async fn current_track_id(&self) -> Result<Option<String>, DomError> {
        let expr = with_api(
            "if (typeof api.getCurrentTrack !== 'function') return null; \
             const t = api.getCurrentTrack(); \
             return t && t.id != null ? String(t.id) : null;",
            "null",
        );
        Ok(match self.eval(&expr).await? {
            Value::String(id) if !id.is_empty() => Some(id),
            _ => None,
        })
    }

    async fn progress(&self) -> Result<Option<f64>, DomError> {
        self.number("getProgress").await
    }

    async fn duration(&self) -> Result<Option<f64>, DomError> {
        self.number("getDuration").await
    }

    async fn volume(&self) -> Result<Option<f64>, DomError> {
        self.number("getVolume").await
    }

    async fn is_muted(&self) -> Result<Option<bool>, DomError> {
        let expr = with_api(
            "if (typeof api.getMute !== 'function') return null; return !!api.getMute();",
            "null",
        );
        Ok(self.eval(&expr).await?.as_bool())
    }

    async fn set_volume(&self, fraction: f64) -> Result<bool, DomError> {
        let expr = with_api(
            &format!(
                "if (typeof api.setVolume !== 'function') return false; api.setVolume({}); return true;",
                json!(fraction)
            ),
            "false",
        );
        Ok(self.eval(&expr).await?.as_bool().unwrap_or(false))
    }

    async fn toggle_mute(&self) -> Result<bool, DomError> {
        let expr = with_api(
            "if (typeof api.toggleMute !== 'function') return false; api.toggleMute(); return true;",
            "false",
        );
        Ok(self.eval(&expr).await?.as_bool().unwrap_or(false))
    }
}
