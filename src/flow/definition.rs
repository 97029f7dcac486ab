//! Trees described as data
//!
//! A definition names its actions; `build` resolves them against an
//! [`ActionRegistry`] and assembles the tree bottom-up.
//!
//! ```yaml
//! kind: serial
//! tag: pipeline
//! children:
//!   - kind: leaf
//!     tag: fetch
//!     events:
//!       - { name: enter, action: log_enter }
//!       - { name: run, action: fetch }
//!   - kind: parallel
//!     tag: fan-out
//!     children: [...]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::dispatcher::Dispatcher;
use super::event::Event;
use super::factory::FlowFactory;
use super::registry::ActionRegistry;
use crate::core::errors::{FlowError, Result};

/// One event of a leaf definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: Event,
    /// Registry name of the action to bind
    pub action: String,
}

/// Declarative description of a node and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeDefinition {
    Leaf {
        tag: String,
        #[serde(default)]
        events: Vec<EventDefinition>,
    },
    Serial {
        tag: String,
        #[serde(default)]
        children: Vec<TreeDefinition>,
    },
    Parallel {
        tag: String,
        #[serde(default)]
        children: Vec<TreeDefinition>,
    },
}

impl TreeDefinition {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FlowError::io(format!("read {}", path.display()), e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn tag(&self) -> &str {
        match self {
            TreeDefinition::Leaf { tag, .. }
            | TreeDefinition::Serial { tag, .. }
            | TreeDefinition::Parallel { tag, .. } => tag,
        }
    }

    /// Every action name the definition refers to, in tree order
    pub fn action_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_actions(&mut names);
        names
    }

    fn collect_actions<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TreeDefinition::Leaf { events, .. } => {
                names.extend(events.iter().map(|event| event.action.as_str()))
            }
            TreeDefinition::Serial { children, .. } | TreeDefinition::Parallel { children, .. } => {
                for child in children {
                    child.collect_actions(names);
                }
            }
        }
    }

    /// Assemble the described tree with nodes from `factory`
    pub fn build(&self, registry: &ActionRegistry, factory: &FlowFactory) -> Result<Dispatcher<String>> {
        self.build_at(registry, factory, "root").map_err(|err| {
            warn!(category = err.category(), error = %err, "tree definition rejected");
            err
        })
    }

    fn build_at(
        &self,
        registry: &ActionRegistry,
        factory: &FlowFactory,
        path: &str,
    ) -> Result<Dispatcher<String>> {
        match self {
            TreeDefinition::Leaf { tag, events } => {
                let mut node = factory.leaf(tag.clone());
                for (index, event) in events.iter().enumerate() {
                    let action = registry.get(&event.action).map_err(|_| {
                        FlowError::definition(
                            format!("unknown action '{}'", event.action),
                            format!("{}/events[{}]", path, index),
                        )
                    })?;
                    node.push_shared_event(event.name.clone(), action)?;
                }
                Ok(node)
            }
            TreeDefinition::Serial { tag, children } => {
                let mut node = factory.serial(tag.clone());
                Self::append_children(&mut node, children, registry, factory, path)?;
                Ok(node)
            }
            TreeDefinition::Parallel { tag, children } => {
                let mut node = factory.parallel(tag.clone());
                Self::append_children(&mut node, children, registry, factory, path)?;
                Ok(node)
            }
        }
    }

    fn append_children(
        node: &mut Dispatcher<String>,
        children: &[TreeDefinition],
        registry: &ActionRegistry,
        factory: &FlowFactory,
        path: &str,
    ) -> Result<()> {
        for (index, child) in children.iter().enumerate() {
            let child = child.build_at(registry, factory, &format!("{}/children[{}]", path, index))?;
            node.append_child(child)?;
        }
        Ok(())
    }
}
