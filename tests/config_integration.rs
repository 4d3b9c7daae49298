//! Configuration loading tests

use lamco_input_capture::backend::BackendSettings;
use lamco_input_capture::config::Config;
use lamco_input_capture::input::ClampPolicy;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [devices]
        directory = "/run/test-input"
        prefix = "touch"

        [polling]
        timeout_ms = 25

        [pointer]
        throttle_ms = 16
        clamp_policy = "legacy"

        [logging]
        level = "debug"
        format = "json"
        file = "/tmp/lamco-input.log"
        "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.devices.directory, PathBuf::from("/run/test-input"));
    assert_eq!(config.devices.prefix, "touch");
    assert_eq!(config.polling.timeout_ms, 25);
    assert_eq!(config.pointer.clamp_policy, ClampPolicy::Legacy);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/lamco-input.log")));

    let settings = BackendSettings::from(&config);
    assert_eq!(settings.throttle, Duration::from_millis(16));
    assert_eq!(settings.device_prefix, "touch");
}

#[test]
fn test_load_empty_file_gives_defaults() {
    let file = write_config("");
    assert_eq!(Config::load(file.path()).unwrap(), Config::default());
}

#[test]
fn test_load_rejects_invalid_values() {
    let file = write_config(
        r#"
        [logging]
        level = "loud"
        "#,
    );
    assert!(Config::load(file.path()).is_err());

    let file = write_config(
        r#"
        [pointer]
        clamp_policy = "diagonal"
        "#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_load_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = Config::load(&missing).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.toml"));
}

#[test]
fn test_explicit_path_wins_over_default() {
    let file = write_config(
        r#"
        [polling]
        timeout_ms = 50
        "#,
    );
    let config = Config::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.polling.timeout_ms, 50);
}
