//! Registry durability tests
//!
//! Save/load round trips, tolerance for missing and empty files, and the
//! atomic replace-on-write guarantee.

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use polycron::store::{DeploymentOptions, FunctionRegistry, StoreError, TaskRegistry};

#[test]
fn test_function_registry_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("functions.json");

    let registry = FunctionRegistry::at_path(&path);
    registry
        .upsert(
            "send-report",
            "aliyun-1",
            "https://a.example.com/invoke",
            DeploymentOptions {
                name: "send-report".to_string(),
                description: "nightly report".to_string(),
                memory_size: 128 * 1024 * 1024,
                environment: HashMap::from([("REGION".to_string(), "cn-hangzhou".to_string())]),
                initialization_timeout: Duration::from_secs(10),
                runtime_timeout: Duration::from_secs(30),
                http_port: 8080,
                file: "report.zip".to_string(),
            },
        )
        .unwrap();
    registry
        .upsert(
            "send-report",
            "tencent-1",
            "https://b.example.com/invoke",
            DeploymentOptions::default(),
        )
        .unwrap();

    let reloaded = FunctionRegistry::open(&path).unwrap();
    let deployments = reloaded.get("send-report").unwrap();
    assert_eq!(deployments.len(), 2);

    let aliyun = deployments
        .iter()
        .find(|d| d.platform_id == "aliyun-1")
        .unwrap();
    assert_eq!(aliyun.url, "https://a.example.com/invoke");
    assert_eq!(aliyun.environment["REGION"], "cn-hangzhou");
    assert_eq!(aliyun.runtime_timeout, Duration::from_secs(30));
}

#[test]
fn test_task_registry_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let registry = TaskRegistry::at_path(&path);
    registry
        .upsert("send-report", Duration::from_secs(60))
        .unwrap();
    registry.set_enabled("send-report", false).unwrap();

    let reloaded = TaskRegistry::open(&path).unwrap();
    let task = reloaded.get("send-report").unwrap();
    assert_eq!(task.period, Duration::from_secs(60));
    assert!(!task.enabled);
}

#[test]
fn test_missing_file_loads_empty_and_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/tasks.json");

    let registry = TaskRegistry::open(&path).unwrap();
    assert!(registry.is_empty());
    assert!(path.exists(), "load creates the backing file");
}

#[test]
fn test_empty_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("functions.json");
    fs::write(&path, "").unwrap();

    let registry = FunctionRegistry::open(&path).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_corrupt_file_surfaces_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "{not json").unwrap();

    assert!(matches!(
        TaskRegistry::open(&path),
        Err(StoreError::Json(_))
    ));
}

#[test]
fn test_duration_persisted_as_nanoseconds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    TaskRegistry::at_path(&path)
        .upsert("send-report", Duration::from_secs(60))
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["tasks"]["send-report"]["duration"], 60_000_000_000u64);
    assert_eq!(doc["tasks"]["send-report"]["enabled"], true);
    // Tab-indented on disk.
    assert!(content.contains("\n\t\"tasks\""));
}

#[test]
fn test_failed_save_leaves_original_and_no_temp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let registry = TaskRegistry::at_path(&path);
    registry
        .upsert("send-report", Duration::from_secs(60))
        .unwrap();

    // Swap in a directory at the destination: the final rename cannot land.
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();
    fs::write(path.join("marker"), "keep").unwrap();

    assert!(registry.set_enabled("send-report", false).is_err());

    // In-memory flag rolled back, destination untouched, no temp left over.
    assert!(registry.get("send-report").unwrap().enabled);
    assert_eq!(fs::read_to_string(path.join("marker")).unwrap(), "keep");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("tasks.json")]);
}

#[cfg(unix)]
#[test]
fn test_save_through_symlink_replaces_target() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real-tasks.json");
    let link = dir.path().join("tasks.json");
    fs::write(&real, "").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    TaskRegistry::open(&link)
        .unwrap()
        .upsert("send-report", Duration::from_secs(60))
        .unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().is_symlink());
    let content = fs::read_to_string(&real).unwrap();
    assert!(content.contains("send-report"));
}

#[test]
fn test_save_without_backing_path_fails() {
    let registry = FunctionRegistry::in_memory();
    assert!(matches!(registry.save(), Err(StoreError::NoBackingPath)));
}
