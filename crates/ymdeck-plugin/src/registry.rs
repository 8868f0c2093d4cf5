//! Action registry: maps action UUIDs to constructors.

use std::sync::Arc;

use dashmap::DashMap;
use ymdeck_protocols::ActionKind;

use crate::action::{Action, ActionHandle};
use crate::actions;
use crate::error::PluginError;

/// Builds the action for a freshly appeared button.
pub type ActionFactory = fn(Arc<ActionHandle>) -> Arc<dyn Action>;

pub struct ActionRegistry {
    factories: DashMap<ActionKind, ActionFactory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Registry holding every built-in action.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for (kind, factory) in actions::builtin() {
            registry.factories.insert(kind, factory);
        }
        registry
    }

    /// Register a factory. Fails if `kind` already has one.
    pub fn register(&self, kind: ActionKind, factory: ActionFactory) -> Result<(), PluginError> {
        if self.factories.contains_key(&kind) {
            return Err(PluginError::AlreadyRegistered(kind.uuid()));
        }
        self.factories.insert(kind, factory);
        Ok(())
    }

    pub fn unregister(&self, kind: ActionKind) -> bool {
        self.factories.remove(&kind).is_some()
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the action for `handle.kind()`, if registered.
    pub fn create(&self, handle: Arc<ActionHandle>) -> Option<Arc<dyn Action>> {
        let factory = *self.factories.get(&handle.kind())?;
        Some(factory(handle))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
