//! Page accessor abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque handle to an element living in the page.
///
/// For the CDP backend this is a remote object id; for the in-memory DOM it is
/// an index. The controller never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef(String);

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Errors raised by a page accessor.
#[derive(Debug, Error)]
pub enum DomError {
    /// The handle no longer refers to a live object.
    #[error("Stale node handle: {0}")]
    StaleHandle(String),

    /// The page threw while evaluating an accessor.
    #[error("Page script error: {0}")]
    Script(String),

    /// The link to the page failed.
    #[error("Page transport error: {0}")]
    Transport(String),
}

/// Element-level access to the player page.
///
/// Mirrors the handful of DOM operations the controller needs. Every call may
/// cross a process boundary, so all of them are async and fallible.
#[async_trait]
pub trait Dom: Send + Sync {
    /// The document node, used as the default query scope.
    async fn document(&self) -> Result<NodeRef, DomError>;

    /// Current page URL.
    async fn location(&self) -> Result<String, DomError>;

    /// First descendant of `scope` matching `selector`.
    async fn query_selector(
        &self,
        scope: &NodeRef,
        selector: &str,
    ) -> Result<Option<NodeRef>, DomError>;

    /// Closest inclusive ancestor of `node` matching `selector`.
    async fn closest(&self, node: &NodeRef, selector: &str) -> Result<Option<NodeRef>, DomError>;

    /// Whether the node is still attached to the document.
    async fn is_connected(&self, node: &NodeRef) -> Result<bool, DomError>;

    /// Upper-case tag name (`BUTTON`, `INPUT`, ...).
    async fn tag_name(&self, node: &NodeRef) -> Result<String, DomError>;

    async fn attribute(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError>;

    /// Value of the `class` attribute, empty when absent.
    async fn class_name(&self, node: &NodeRef) -> Result<String, DomError>;

    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>, DomError>;

    /// A DOM property (`value`, `max`, `src`, `href`) rendered as a string.
    async fn property(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError>;

    async fn is_disabled(&self, node: &NodeRef) -> Result<bool, DomError>;

    /// Dispatch a synthetic click.
    async fn click(&self, node: &NodeRef) -> Result<(), DomError>;

    /// Assign an input's value through the native `HTMLInputElement` setter
    /// and fire bubbling `input` and `change` events, so that framework-wrapped
    /// inputs observe the change.
    async fn set_input_value(&self, node: &NodeRef, value: &str) -> Result<(), DomError>;

    /// Return a handle that stays valid across ticks. Called before a handle
    /// is cached.
    async fn retain(&self, node: &NodeRef) -> Result<NodeRef, DomError> {
        Ok(node.clone())
    }

    /// Drop a retained handle.
    async fn release(&self, _node: &NodeRef) -> Result<(), DomError> {
        Ok(())
    }

    /// Drop every handle that was not retained.
    async fn release_transient(&self) -> Result<(), DomError> {
        Ok(())
    }
}
