use std::fmt;

use super::dispatcher::{Dispatcher, NodeLimits};
use super::leaf::LeafFlow;
use super::parallel::ParallelFlow;
use super::serial::SerialFlow;
use crate::core::config::FlowConfig;
use crate::core::errors::Result;

/// Creates nodes carrying the assembly limits of one configuration.
///
/// The default factory sets no limits; only limits named in a config passed
/// to `new` are enforced.
#[derive(Debug, Clone, Default)]
pub struct FlowFactory {
    limits: NodeLimits,
}

impl FlowFactory {
    /// Validate `config` and build a factory from it
    pub fn new(config: FlowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            limits: NodeLimits {
                max_events: config.max_events_per_leaf,
                max_children: config.max_children_per_node,
                max_depth: config.max_tree_depth,
            },
        })
    }

    pub fn leaf<T>(&self, tag: T) -> Dispatcher<T>
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Dispatcher::Leaf(LeafFlow::new(tag, self.limits))
    }

    pub fn serial<T>(&self, tag: T) -> Dispatcher<T>
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Dispatcher::Serial(SerialFlow::new(tag, self.limits))
    }

    pub fn parallel<T>(&self, tag: T) -> Dispatcher<T>
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Dispatcher::Parallel(ParallelFlow::new(tag, self.limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FlowError;
    use crate::flow::event::{action_fn, Event, EventContext};

    fn small_factory() -> FlowFactory {
        FlowFactory::new(
            FlowConfig::builder()
                .max_events_per_leaf(2)
                .max_children_per_node(2)
                .max_tree_depth(2)
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = FlowConfig {
            max_events_per_leaf: Some(0),
            ..Default::default()
        };
        assert!(FlowFactory::new(config).is_err());
    }

    #[test]
    fn test_unset_limits_are_unbounded() {
        let factory = FlowFactory::new(FlowConfig::builder().max_tree_depth(3).build().unwrap())
            .unwrap();
        let mut wide = factory.parallel(0);
        for i in 1..=1500 {
            wide.append_child(factory.leaf(i)).unwrap();
        }
        assert_eq!(wide.children().len(), 1500);

        let mut root = factory.serial(2000);
        root.append_child(wide).unwrap();
        let mut top = factory.serial(3000);
        let err = top.append_child(root).unwrap_err();
        assert!(matches!(err, FlowError::LimitExceeded { ref resource, limit: 3, .. } if resource == "depth"));
    }

    #[test]
    fn test_event_limit() {
        let factory = small_factory();
        let mut leaf = factory.leaf("s");
        for _ in 0..2 {
            leaf.push_event(Event::run(), action_fn(|_ctx: EventContext| async { Ok(()) }))
                .unwrap();
        }
        let err = leaf
            .push_event(Event::quit(), action_fn(|_ctx: EventContext| async { Ok(()) }))
            .unwrap_err();
        assert!(matches!(err, FlowError::LimitExceeded { ref resource, .. } if resource == "events"));
        assert_eq!(leaf.event_names(), vec!["run", "run"]);
    }

    #[test]
    fn test_child_limit() {
        let factory = small_factory();
        let mut parallel = factory.parallel("p");
        parallel.append_child(factory.leaf("a")).unwrap();
        parallel.append_child(factory.leaf("b")).unwrap();
        let err = parallel.append_child(factory.leaf("c")).unwrap_err();
        assert!(matches!(err, FlowError::LimitExceeded { ref resource, .. } if resource == "children"));
        assert_eq!(parallel.children().len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let factory = small_factory();
        let mut inner = factory.serial("inner");
        inner.append_child(factory.leaf("a")).unwrap();
        let mut root = factory.serial("root");
        let err = root.append_child(inner).unwrap_err();
        assert!(matches!(err, FlowError::LimitExceeded { ref resource, current: 3, limit: 2, .. } if resource == "depth"));
        assert!(root.children().is_empty());
    }
}
