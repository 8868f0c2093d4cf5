//! Fallback-chain element lookup with a liveness-checked cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::dom::{Dom, DomError, NodeRef};
use crate::selectors::SelectorChain;

/// Logical elements whose handles are cached between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Root,
    PlayButton,
    NextButton,
    PrevButton,
    LikeButton,
    DislikeButton,
    MuteButton,
    VolumeSlider,
}

/// Resolves selector chains against the page.
///
/// Cached handles are reused while the page reports them attached; a detached
/// handle (or one whose liveness probe fails) is dropped and re-resolved.
pub struct Resolver {
    dom: Arc<dyn Dom>,
    cache: Mutex<HashMap<ElementKey, NodeRef>>,
}

impl Resolver {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self {
            dom,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn dom(&self) -> &Arc<dyn Dom> {
        &self.dom
    }

    /// First match of `chain` under `scope`, uncached.
    pub async fn find(
        &self,
        scope: &NodeRef,
        chain: &SelectorChain,
    ) -> Result<Option<NodeRef>, DomError> {
        for selector in chain.iter() {
            if let Some(node) = self.dom.query_selector(scope, selector).await? {
                trace!(selector, "Selector matched");
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Like [`find`](Self::find), but lifts the match to its enclosing
    /// `<button>` when the selector hit an inner element.
    pub async fn find_button(
        &self,
        scope: &NodeRef,
        chain: &SelectorChain,
    ) -> Result<Option<NodeRef>, DomError> {
        let Some(node) = self.find(scope, chain).await? else {
            return Ok(None);
        };
        if self.dom.tag_name(&node).await?.eq_ignore_ascii_case("button") {
            return Ok(Some(node));
        }
        self.dom.closest(&node, "button").await
    }

    /// Cached lookup of `key`.
    pub async fn resolve(
        &self,
        key: ElementKey,
        scope: &NodeRef,
        chain: &SelectorChain,
    ) -> Result<Option<NodeRef>, DomError> {
        if let Some(node) = self.cached(key).await {
            return Ok(Some(node));
        }
        match self.find(scope, chain).await? {
            Some(node) => self.remember(key, node).await.map(Some),
            None => Ok(None),
        }
    }

    /// Cached lookup of a button.
    pub async fn resolve_button(
        &self,
        key: ElementKey,
        scope: &NodeRef,
        chain: &SelectorChain,
    ) -> Result<Option<NodeRef>, DomError> {
        if let Some(node) = self.cached(key).await {
            return Ok(Some(node));
        }
        match self.find_button(scope, chain).await? {
            Some(node) => self.remember(key, node).await.map(Some),
            None => Ok(None),
        }
    }

    /// Number of cached handles.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    async fn cached(&self, key: ElementKey) -> Option<NodeRef> {
        let node = self.cache.lock().get(&key).cloned()?;
        match self.dom.is_connected(&node).await {
            Ok(true) => Some(node),
            Ok(false) | Err(_) => {
                debug!(?key, "Cached element detached, re-resolving");
                self.cache.lock().remove(&key);
                if let Err(e) = self.dom.release(&node).await {
                    trace!(?key, error = %e, "Failed to release stale handle");
                }
                None
            }
        }
    }

    async fn remember(&self, key: ElementKey, node: NodeRef) -> Result<NodeRef, DomError> {
        let retained = self.dom.retain(&node).await?;
        self.cache.lock().insert(key, retained.clone());
        Ok(retained)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
