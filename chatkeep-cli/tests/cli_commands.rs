use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn chatkeep(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chatkeep"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT")
        .output()
        .expect("Failed to run chatkeep")
}

fn write_file_backend_config(dir: &Path) {
    std::fs::write(
        dir.join("config.json"),
        r#"{"session":{"backend":"file","max_messages":5}}"#,
    )
    .unwrap();
}

#[test]
fn test_config_prints_effective_settings() {
    let temp_dir = TempDir::new().unwrap();
    write_file_backend_config(temp_dir.path());

    let output = chatkeep(temp_dir.path(), &["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["session"]["backend"], "file");
    assert_eq!(value["session"]["max_messages"], 5);
}

#[test]
fn test_show_and_clear_file_session() {
    let temp_dir = TempDir::new().unwrap();
    write_file_backend_config(temp_dir.path());

    let sessions = temp_dir.path().join("sessions");
    std::fs::create_dir_all(&sessions).unwrap();
    std::fs::write(
        sessions.join("chat_messages.json"),
        r#"[{"id":"u1","role":"user","content":"Which ad set converts best?","timestamp":1700000000000}]"#,
    )
    .unwrap();

    let output = chatkeep(temp_dir.path(), &["show"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Which ad set converts best?"));

    let output = chatkeep(temp_dir.path(), &["clear"]);
    assert!(output.status.success());
    assert!(!sessions.join("chat_messages.json").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{"session":{"max_messages":0}}"#,
    )
    .unwrap();

    let output = chatkeep(temp_dir.path(), &["show"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_messages"));
}
