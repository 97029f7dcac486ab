//! Building and running trees from YAML definitions

use flowtree::{
    action_fn, init_tracing, ActionRegistry, EventContext, FlowConfig, FlowError, FlowFactory,
    NodeKind, Scope, TreeDefinition,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const PIPELINE: &str = r#"
kind: serial
tag: pipeline
children:
  - kind: leaf
    tag: prepare
    events:
      - { name: enter, action: record }
      - { name: run, action: record }
  - kind: parallel
    tag: fan-out
    children:
      - kind: leaf
        tag: left
        events:
          - { name: run, action: slow }
      - kind: leaf
        tag: right
        events:
          - { name: run, action: slow }
  - kind: leaf
    tag: finish
    events:
      - { name: quit, action: record }
"#;

fn registry(log: &Arc<Mutex<Vec<String>>>) -> ActionRegistry {
    let registry = ActionRegistry::new();

    let record_log = log.clone();
    registry
        .register(
            "record",
            action_fn(move |ctx: EventContext| {
                let log = record_log.clone();
                async move {
                    log.lock().push(ctx.event.to_string());
                    ctx.complete();
                    Ok(())
                }
            }),
        )
        .unwrap();

    let slow_log = log.clone();
    registry
        .register(
            "slow",
            action_fn(move |ctx: EventContext| {
                let log = slow_log.clone();
                async move {
                    tokio::select! {
                        _ = ctx.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(Duration::from_secs(2)) => {}
                    }
                    log.lock().push("slow".to_string());
                    ctx.complete();
                    Ok(())
                }
            }),
        )
        .unwrap();

    registry
}

#[tokio::test(start_paused = true)]
async fn test_definition_runs_like_hand_built_tree() {
    let _ = init_tracing(&FlowConfig::development());
    let log = Arc::new(Mutex::new(Vec::new()));
    let definition = TreeDefinition::from_yaml_str(PIPELINE).unwrap();
    let tree = definition
        .build(&registry(&log), &FlowFactory::default())
        .unwrap();

    assert_eq!(tree.kind(), NodeKind::Serial);
    assert_eq!(tree.tag(), "pipeline");
    assert_eq!(tree.children().len(), 3);

    let started = Instant::now();
    tree.execute(&Scope::new()).await;
    let elapsed = started.elapsed();

    // the two slow leaves overlap
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));
    assert_eq!(
        log.lock().clone(),
        vec!["enter", "run", "slow", "slow", "quit"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[tokio::test(start_paused = true)]
async fn test_definition_tree_can_be_cancelled() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tree = Arc::new(
        TreeDefinition::from_yaml_str(PIPELINE)
            .unwrap()
            .build(&registry(&log), &FlowFactory::default())
            .unwrap(),
    );

    let mut handle = tree.clone().start(&Scope::new());
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();
    handle.wait().await;

    assert_eq!(log.lock().clone(), vec!["enter".to_string(), "run".to_string()]);
}

#[test]
fn test_definition_and_config_from_files() {
    let dir = std::env::temp_dir().join(format!("flowtree-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let tree_path = dir.join("pipeline.yaml");
    let config_path = dir.join("flowtree.yaml");
    std::fs::write(&tree_path, PIPELINE).unwrap();
    std::fs::write(&config_path, "max_children_per_node: 2\nlog_level: warn\n").unwrap();

    let definition = TreeDefinition::from_yaml_file(&tree_path).unwrap();
    let config = FlowConfig::from_yaml_file(&config_path).unwrap();
    assert_eq!(config.max_children_per_node, Some(2));

    let log = Arc::new(Mutex::new(Vec::new()));
    let factory = FlowFactory::new(config).unwrap();
    let err = definition.build(&registry(&log), &factory).unwrap_err();
    assert!(matches!(err, FlowError::LimitExceeded { ref resource, .. } if resource == "children"));

    assert!(matches!(
        TreeDefinition::from_yaml_file(dir.join("missing.yaml")),
        Err(FlowError::Io { .. })
    ));

    let _ = std::fs::remove_dir_all(&dir);
}
