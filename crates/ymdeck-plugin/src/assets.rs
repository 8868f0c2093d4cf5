//! Button images.
//!
//! The host takes images as data URIs. Static button art is read from
//! `static/img/` under the plugin directory once and kept for the life of
//! the process; track covers are downloaded and kept in a small LRU.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::PluginError;

/// Covers kept in memory.
pub const COVER_CACHE_CAPACITY: usize = 10;

const COVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown in place of a cover that could not be loaded.
pub const EMPTY_COVER: &str = "emptiness_black.png";

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Protocol-relative cover URLs (`//avatars...`) are fetched over https.
pub fn absolute_cover_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

struct CoverCache {
    order: VecDeque<String>,
    entries: std::collections::HashMap<String, String>,
    capacity: usize,
}

impl CoverCache {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            entries: std::collections::HashMap::new(),
            capacity,
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let value = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn put(&mut self, key: String, value: String) {
        if self.entries.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

pub struct Assets {
    image_dir: PathBuf,
    statics: DashMap<String, String>,
    covers: Mutex<CoverCache>,
    http: reqwest::Client,
}

impl Assets {
    /// `plugin_dir` is the `.sdPlugin` directory; images live in
    /// `static/img/` below it.
    pub fn new(plugin_dir: &Path) -> Self {
        let http = reqwest::Client::builder()
            .timeout(COVER_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            image_dir: plugin_dir.join("static").join("img"),
            statics: DashMap::new(),
            covers: Mutex::new(CoverCache::new(COVER_CACHE_CAPACITY)),
            http,
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Data URI of a static PNG by file name.
    pub async fn static_image(&self, name: &str) -> Result<String, PluginError> {
        if let Some(uri) = self.statics.get(name) {
            return Ok(uri.clone());
        }
        if name.contains(['/', '\\']) || name.contains("..") {
            return Err(PluginError::Asset(format!("invalid image name: {}", name)));
        }
        let path = self.image_dir.join(name);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            PluginError::Asset(format!("cannot read {}: {}", path.display(), e))
        })?;
        let uri = data_uri("image/png", &bytes);
        debug!(name, size = bytes.len(), "Loaded static image");
        self.statics.insert(name.to_string(), uri.clone());
        Ok(uri)
    }

    /// Data URI of a cover image, downloading it on first use.
    pub async fn cover(&self, url: &str) -> Result<String, PluginError> {
        if let Some(uri) = self.covers.lock().get(url) {
            return Ok(uri);
        }
        let response = self
            .http
            .get(absolute_cover_url(url))
            .send()
            .await?
            .error_for_status()?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            warn!(url, "Empty cover image");
            return Err(PluginError::Asset(format!("empty cover: {}", url)));
        }
        let uri = data_uri(&mime, &bytes);
        self.covers.lock().put(url.to_string(), uri.clone());
        Ok(uri)
    }
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
