//! CLI command tests
//!
//! Drives `load`, `range`, `get` and `snapshot` end to end over a
//! file-backed store for every configured strategy.

use std::fs;
use std::path::{Path, PathBuf};

use chronoweave::cli::{execute, Command};
use serde_json::{json, Value};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test_data.csv")
}

fn write_config(dir: &Path, strategy: &str) -> PathBuf {
    let path = dir.join("chronoweave.json");
    let config = json!({
        "data_dir": dir.join("db"),
        "strategy": strategy,
        "namespace": "VW",
    });
    fs::write(&path, config.to_string()).unwrap();
    path
}

fn comments(response: &Value) -> Vec<(String, String)> {
    response["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["key"].as_str().unwrap().to_string(),
                row["value"]["comment"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn test_load_and_range_for_every_strategy() {
    for strategy in ["linear", "ladder", "weaver"] {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), strategy);

        let loaded = execute(Command::Load {
            config: config.clone(),
            csv: fixture(),
        })
        .unwrap();
        assert_eq!(loaded["rows"], 30);
        assert_eq!(loaded["keys"], 6);
        assert_eq!(loaded["latest_version"], 30);

        let response = execute(Command::Range {
            config: config.clone(),
            from: "KEY002".to_string(),
            to: "KEY004".to_string(),
            from_exclusive: false,
            to_exclusive: false,
            at: 20,
        })
        .unwrap();

        assert_eq!(
            comments(&response),
            vec![
                ("KEY002".to_string(), "Change 3 for key KEY002".to_string()),
                ("KEY003".to_string(), "Change 4 for key KEY003".to_string()),
                ("KEY004".to_string(), "Change 3 for key KEY004".to_string()),
            ],
            "strategy {}",
            strategy
        );
        assert_eq!(response["rows"][0]["value"]["timestamp"], 19);
    }
}

#[test]
fn test_snapshot_and_get_after_reopen() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "weaver");
    execute(Command::Load {
        config: config.clone(),
        csv: fixture(),
    })
    .unwrap();

    let snapshot = execute(Command::Snapshot {
        config: config.clone(),
        at: 30,
    })
    .unwrap();
    let rows = comments(&snapshot);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[5], ("KEY006".to_string(), "Change 1 for key KEY006".to_string()));

    let got = execute(Command::Get {
        config,
        key: "KEY005".to_string(),
        at: 15,
    })
    .unwrap();
    assert_eq!(got["found"], true);
    assert_eq!(got["value"]["comment"], "Change 3 for key KEY005");
    assert_eq!(got["metrics"]["point_lookups"], 1);
}

#[test]
fn test_bench_over_fixture() {
    let report = execute(Command::Bench {
        csv: Some(fixture()),
        runs: 1,
        probes: vec![5, 20, 30],
        rows: 0,
        keys: 0,
        seed: 0,
    })
    .unwrap();

    let strategies = report["strategies"].as_array().unwrap();
    assert_eq!(strategies.len(), 3);
    for strategy in strategies {
        // 5 keys at 5, 5 at 20, 6 at 30
        assert_eq!(strategy["rows_emitted"], 16);
    }
}
