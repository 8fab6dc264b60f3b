//! End-to-end tests for the `dusk` binary against a temporary store.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

fn dusk(store: &Path, args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_dusk"))
        .arg("--store-dir")
        .arg(store)
        .arg("--json")
        .args(args)
        .env_remove("DUSK_STORE_DIR")
        .env_remove("DUSK_CONFIG")
        .output()
        .expect("failed to run dusk");

    assert!(
        output.status.success(),
        "dusk {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("dusk printed invalid JSON")
}

#[test]
fn enable_persists_for_the_next_run() {
    let dir = TempDir::new().unwrap();

    let enabled = dusk(dir.path(), &["enable"]);
    assert_eq!(enabled["dark_mode"], true);
    assert_eq!(enabled["persistent"], true);

    let status = dusk(dir.path(), &["status"]);
    assert_eq!(status["dark_mode"], true);
    assert_eq!(status["seeded_from"], "persisted");

    let raw = std::fs::read_to_string(dir.path().join("default.json")).unwrap();
    let file: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(file["usehooks-ts-dark-mode"], "true");
}

#[test]
fn toggle_flips_the_stored_value() {
    let dir = TempDir::new().unwrap();

    let first = dusk(dir.path(), &["disable"]);
    assert_eq!(first["dark_mode"], false);

    let toggled = dusk(dir.path(), &["toggle"]);
    assert_eq!(toggled["dark_mode"], true);
    assert_eq!(toggled["color_mode"], "dark");
}

#[test]
fn explicit_default_seeds_a_fresh_origin() {
    let dir = TempDir::new().unwrap();

    let seeded = dusk(dir.path(), &["--origin", "admin", "--default", "true"]);
    assert_eq!(seeded["dark_mode"], true);
    assert_eq!(seeded["seeded_from"], "explicit");
    assert!(dir.path().join("admin.json").exists());
}

#[test]
fn config_file_sets_options() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("dusk.json");
    fs::write(
        &config,
        r#"{"default": true, "storage_key": "console-theme", "class_name": "theme-dark"}"#,
    )
    .unwrap();
    let store = dir.path().join("store");

    let seeded = dusk(&store, &["--config", config.to_str().unwrap()]);
    assert_eq!(seeded["dark_mode"], true);
    assert_eq!(seeded["seeded_from"], "explicit");

    let raw = fs::read_to_string(store.join("default.json")).unwrap();
    let file: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(file["console-theme"], "true");
    assert!(file.get("usehooks-ts-dark-mode").is_none());

    // --default beats the file's default on a fresh origin.
    let overridden = dusk(
        &store,
        &["--config", config.to_str().unwrap(), "--origin", "other", "--default", "false"],
    );
    assert_eq!(overridden["dark_mode"], false);
}

#[test]
fn watch_prints_external_changes() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_dusk"))
        .arg("--store-dir")
        .arg(dir.path())
        .args(["--json", "--default", "false", "watch", "--interval-ms", "20"])
        .env_remove("DUSK_STORE_DIR")
        .env_remove("DUSK_CONFIG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to run dusk watch");

    let stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    let next = || -> serde_json::Value {
        let line = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("dusk watch printed nothing");
        serde_json::from_str(&line).unwrap()
    };

    let initial = next();
    assert_eq!(initial["dark_mode"], false);

    // Another session enables dark mode; replace the file atomically.
    let path = dir.path().join("default.json");
    let tmp = dir.path().join("default.json.new");
    fs::write(&tmp, r#"{"usehooks-ts-dark-mode": "true"}"#).unwrap();
    fs::rename(&tmp, &path).unwrap();

    let changed = next();
    child.kill().unwrap();
    child.wait().unwrap();

    assert_eq!(changed["dark_mode"], true);
    assert_eq!(changed["persistent"], true);
}
