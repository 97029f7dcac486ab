use dashmap::DashMap;
use std::sync::Arc;

use super::event::EventAction;
use crate::core::errors::{FlowError, Result};

/// Named actions that tree definitions refer to
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: Arc<DashMap<String, Arc<dyn EventAction>>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`; names must be unique
    pub fn register<A: EventAction>(&self, name: impl Into<String>, action: A) -> Result<()> {
        self.register_shared(name, Arc::new(action))
    }

    pub fn register_shared(&self, name: impl Into<String>, action: Arc<dyn EventAction>) -> Result<()> {
        let name = name.into();
        match self.actions.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Err(FlowError::usage(
                "action registry",
                "register",
                format!("action '{}' is already registered", entry.key()),
            )),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(action);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn EventAction>> {
        self.actions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FlowError::UnknownAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
