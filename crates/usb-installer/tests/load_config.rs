use std::fs;
use std::path::Path;

use tempfile::tempdir;
use usb_installer::{load_config, Error};

#[test]
fn a_missing_settings_file_falls_back_to_defaults() {
    let dir = tempdir().expect("temp dir");

    let config = load_config(dir.path()).expect("load defaults");
    assert_eq!(config.device_dir, "DVD");
    assert_eq!(config.catalog_name, "ul.cfg");
}

#[test]
fn settings_override_the_defaults() {
    let dir = tempdir().expect("temp dir");
    fs::write(
        dir.path().join("installer.toml"),
        r#"
[install]
device_dir = "GAMES"
catalog = "list.cfg"
staging_root = "/var/tmp"
"#,
    )
    .expect("write settings");

    let config = load_config(dir.path()).expect("load settings");
    assert_eq!(config.device_dir, "GAMES");
    assert_eq!(config.catalog_name, "list.cfg");
    assert_eq!(config.staging_root, Path::new("/var/tmp"));
}

#[test]
fn partial_settings_keep_the_remaining_defaults() {
    let dir = tempdir().expect("temp dir");
    fs::write(
        dir.path().join("installer.toml"),
        "[install]\ndevice_dir = \"GAMES\"\n",
    )
    .expect("write settings");

    let config = load_config(dir.path()).expect("load settings");
    assert_eq!(config.device_dir, "GAMES");
    assert_eq!(config.catalog_name, "ul.cfg");
}

#[test]
fn malformed_settings_surface_a_config_error() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join("installer.toml"), "not = [valid").expect("write settings");

    let err = load_config(dir.path()).expect_err("malformed settings must not load");
    assert!(matches!(err, Error::ConfigError(_)));
}
