//! [`Dom`] over CDP remote objects.
//!
//! Query results live in a transient object group released after every
//! extraction or command; handles the resolver caches are re-bound into a
//! pinned group so they survive until the resolver drops them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::trace;
use ymdeck_player::{Dom, DomError, NodeRef};

use crate::cdp::{CdpError, PageSession, RemoteObject, ReturnMode};

/// Object group for per-call handles.
pub const TRANSIENT_GROUP: &str = "ymdeck-transient";
/// Object group for cached handles.
pub const PINNED_GROUP: &str = "ymdeck-pinned";

const QUERY_SELECTOR: &str = "function(s) { return this.querySelector(s); }";
const CLOSEST: &str = "function(s) { return this.closest ? this.closest(s) : null; }";
const IS_CONNECTED: &str = "function() { return this.isConnected === true; }";
const TAG_NAME: &str = "function() { return (this.tagName || '').toUpperCase(); }";
const GET_ATTRIBUTE: &str = "function(n) { return this.getAttribute ? this.getAttribute(n) : null; }";
const CLASS_NAME: &str = "function() { return (this.getAttribute && this.getAttribute('class')) || ''; }";
const TEXT_CONTENT: &str = "function() { return this.textContent; }";
const PROPERTY: &str = "function(n) { const v = this[n]; return v == null ? null : String(v); }";
const IS_DISABLED: &str = "function() { return this.disabled === true; }";
const CLICK: &str = "function() { this.click(); }";
const SELF: &str = "function() { return this; }";
/// React tracks the value through the prototype setter, so assigning
/// `this.value` alone is invisible to it.
const SET_INPUT_VALUE: &str = r#"function(v) {
    const setter = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set;
    setter.call(this, v);
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}"#;

pub(crate) fn dom_error(e: CdpError) -> DomError {
    if e.is_stale_object() {
        return DomError::StaleHandle(e.to_string());
    }
    match e {
        CdpError::JavaScript(message) => DomError::Script(message),
        other => DomError::Transport(other.to_string()),
    }
}

/// Page DOM reached through a CDP session.
pub struct CdpDom {
    session: Arc<PageSession>,
}

impl CdpDom {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    async fn handle(&self, node: &NodeRef, function: &str, args: &[Value]) -> Result<Option<NodeRef>, DomError> {
        let object = self
            .session
            .call_function_on(node.id(), function, args, ReturnMode::Handle { group: TRANSIENT_GROUP })
            .await
            .map_err(dom_error)?;
        Ok(node_ref(object))
    }

    async fn value(&self, node: &NodeRef, function: &str, args: &[Value]) -> Result<Value, DomError> {
        self.session
            .call_function_value(node.id(), function, args)
            .await
            .map_err(dom_error)
    }

    async fn string(&self, node: &NodeRef, function: &str, args: &[Value]) -> Result<Option<String>, DomError> {
        Ok(match self.value(node, function, args).await? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }
}

fn node_ref(object: RemoteObject) -> Option<NodeRef> {
    if object.is_nullish() {
        return None;
    }
    object.object_id.map(NodeRef::new)
}

#[async_trait]
impl Dom for CdpDom {
    async fn document(&self) -> Result<NodeRef, DomError> {
        let object = self
            .session
            .evaluate_handle("document", TRANSIENT_GROUP)
            .await
            .map_err(dom_error)?;
        node_ref(object).ok_or_else(|| DomError::Script("document is not available".to_string()))
    }

    async fn location(&self) -> Result<String, DomError> {
        let href = self.session.evaluate("location.href").await.map_err(dom_error)?;
        Ok(href.as_str().unwrap_or_default().to_string())
    }

    async fn query_selector(&self, scope: &NodeRef, selector: &str) -> Result<Option<NodeRef>, DomError> {
        self.handle(scope, QUERY_SELECTOR, &[json!(selector)]).await
    }

    async fn closest(&self, node: &NodeRef, selector: &str) -> Result<Option<NodeRef>, DomError> {
        self.handle(node, CLOSEST, &[json!(selector)]).await
    }

    async fn is_connected(&self, node: &NodeRef) -> Result<bool, DomError> {
        Ok(self.value(node, IS_CONNECTED, &[]).await?.as_bool().unwrap_or(false))
    }

    async fn tag_name(&self, node: &NodeRef) -> Result<String, DomError> {
        Ok(self.string(node, TAG_NAME, &[]).await?.unwrap_or_default())
    }

    async fn attribute(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError> {
        self.string(node, GET_ATTRIBUTE, &[json!(name)]).await
    }

    async fn class_name(&self, node: &NodeRef) -> Result<String, DomError> {
        Ok(self.string(node, CLASS_NAME, &[]).await?.unwrap_or_default())
    }

    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>, DomError> {
        self.string(node, TEXT_CONTENT, &[]).await
    }

    async fn property(&self, node: &NodeRef, name: &str) -> Result<Option<String>, DomError> {
        self.string(node, PROPERTY, &[json!(name)]).await
    }

    async fn is_disabled(&self, node: &NodeRef) -> Result<bool, DomError> {
        Ok(self.value(node, IS_DISABLED, &[]).await?.as_bool().unwrap_or(false))
    }

    async fn click(&self, node: &NodeRef) -> Result<(), DomError> {
        self.value(node, CLICK, &[]).await.map(|_| ())
    }

    async fn set_input_value(&self, node: &NodeRef, value: &str) -> Result<(), DomError> {
        self.value(node, SET_INPUT_VALUE, &[json!(value)]).await.map(|_| ())
    }

    async fn retain(&self, node: &NodeRef) -> Result<NodeRef, DomError> {
        let object = self
            .session
            .call_function_on(node.id(), SELF, &[], ReturnMode::Handle { group: PINNED_GROUP })
            .await
            .map_err(dom_error)?;
        node_ref(object).ok_or_else(|| DomError::StaleHandle(node.id().to_string()))
    }

    async fn release(&self, node: &NodeRef) -> Result<(), DomError> {
        self.session.release_object(node.id()).await.map_err(dom_error)
    }

    async fn release_transient(&self) -> Result<(), DomError> {
        trace!("Releasing transient object group");
        self.session
            .release_object_group(TRANSIENT_GROUP)
            .await
            .map_err(dom_error)
    }
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
