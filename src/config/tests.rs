use {
    crate::{
        cli::VirtwlArgs,
        config::{Config, ConfigError, resolve_display_name},
    },
    clap::Parser,
    std::{fs, time::Duration},
};

fn temp_dir(name: &str) -> String {
    let dir = std::env::temp_dir().join(format!("virtwl-config-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir.to_str().unwrap().to_string()
}

#[test]
fn explicit_name_wins() {
    let name = resolve_display_name(Some("mine"), Some("env"), "/nonexistent").unwrap();
    assert_eq!(name, "mine");
    let name = resolve_display_name(None, Some("env"), "/nonexistent").unwrap();
    assert_eq!(name, "env");
    let name = resolve_display_name(Some(""), None, "/nonexistent").unwrap();
    assert_eq!(name, "wayland-2");
}

#[test]
fn first_unused_name_is_picked() {
    let dir = temp_dir("names");
    fs::write(format!("{}/wayland-2", dir), b"").unwrap();
    fs::write(format!("{}/wayland-3", dir), b"").unwrap();
    let name = resolve_display_name(None, None, &dir).unwrap();
    assert_eq!(name, "wayland-4");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn defaults() {
    let args = VirtwlArgs::parse_from(["virtwl", "--display-name", "test-0"]);
    let config = Config::from_args(&args).unwrap();
    assert_eq!((config.width, config.height), (640, 480));
    assert_eq!(config.display_name, "test-0");
    assert_eq!(config.startup_grace, Duration::ZERO);
    assert_eq!(config.frame_interval, Duration::from_secs(1) / 60);
    assert!(config.socket_path().ends_with("/test-0"));
}

#[test]
fn invalid_settings_are_rejected() {
    let args = VirtwlArgs::parse_from(["virtwl", "--display-name", "x", "--width", "0"]);
    assert!(matches!(Config::from_args(&args), Err(ConfigError::EmptyMonitor)));
    let args = VirtwlArgs::parse_from(["virtwl", "--display-name", "x", "--fps", "0"]);
    assert!(matches!(Config::from_args(&args), Err(ConfigError::ZeroFps)));
    let args = VirtwlArgs::parse_from([
        "virtwl",
        "--display-name",
        "x",
        "--will-show-app-at-startup",
    ]);
    assert_eq!(
        Config::from_args(&args).unwrap().startup_grace,
        Duration::from_millis(500)
    );
}
