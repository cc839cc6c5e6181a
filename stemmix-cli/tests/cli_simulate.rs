use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

const SETTINGS: &str = r#"{
    "tracks": [
        {
            "name": "calm",
            "layers": [
                {"name": "pad", "clip": "pad_loop", "volume": 1.0, "rate": 0.0},
                {"name": "drums", "clip": "drum_loop", "volume": 0.0, "rate": 2.0}
            ]
        },
        {
            "name": "combat",
            "layers": [
                {"name": "lead", "clip": "lead_loop", "volume": 1.0, "rate": 4.0}
            ]
        }
    ]
}"#;

fn settings_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp settings");
    file.write_all(SETTINGS.as_bytes()).expect("write settings");
    file
}

#[test]
fn list_prints_tracks_and_layers() {
    let file = settings_file();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    cmd.arg(file.path())
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tracks"))
        .stdout(predicate::str::contains("\"calm\""))
        .stdout(predicate::str::contains("\"drums\""))
        .stdout(predicate::str::contains("\"lead_loop\""));
}

#[test]
fn simulation_reports_final_volumes_as_json() {
    let file = settings_file();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    let assert = cmd
        .arg(file.path())
        .args(["--ticks", "10", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json report");

    assert_eq!(report["active_index"], 0);
    let pad = &report["tracks"][0]["layers"][0];
    assert_eq!(pad["name"], "pad");
    assert_eq!(pad["handle_volume"], 1.0);
    let drums = &report["tracks"][0]["layers"][1];
    assert_eq!(drums["handle_volume"], 0.0);
}

#[test]
fn track_switching_silences_the_previous_track() {
    let file = settings_file();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    let assert = cmd
        .arg(file.path())
        .args(["--ticks", "10", "--next-track-every", "5", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json report");

    assert_eq!(report["active_index"], 1);
    assert_eq!(report["previous_index"], 0);
    assert_eq!(report["tracks"][0]["layers"][0]["handle_volume"], 0.0);
}

#[test]
fn toggle_schedule_enables_layers_mid_run() {
    let file = settings_file();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    let assert = cmd
        .arg(file.path())
        .args(["--ticks", "10", "--toggle", "3:1", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json report");

    // "drums" starts silent; toggled on at frame 3 it fades in at rate 2.
    let drums = &report["tracks"][0]["layers"][1];
    assert_eq!(drums["volume"], 1.0);
    let handle_volume = drums["handle_volume"].as_f64().expect("bound layer");
    assert!(handle_volume > 0.0 && handle_volume < 1.0);
}

#[test]
fn malformed_toggle_fails() {
    let file = settings_file();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    cmd.arg(file.path())
        .args(["--toggle", "nonsense"])
        .assert()
        .failure();
}

#[test]
fn missing_settings_file_fails() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stemmix"));
    cmd.arg("/no/such/settings.json").assert().failure();
}
