use cardash::config::{AppConfig, ConfigManager, Theme};
use ratatui::style::Color;
use std::fs;
use tempfile::TempDir;

fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert_eq!(config.display.preview_rows, 10);
    assert_eq!(config.display.event_poll_interval_ms, 25);
    assert_eq!(config.theme.colors.primary, "cyan");
    assert_eq!(config.theme.colors.surface, "#303030");
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load_config().unwrap();
    assert_eq!(config.display.preview_rows, 10);
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::create_dir_all(config_manager.config_dir()).unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "[display]\npreview_rows = 5\n\n[theme.colors]\nprimary = \"#00ff00\"\n",
    )
    .unwrap();

    let config = config_manager.load_config().unwrap();
    assert_eq!(config.display.preview_rows, 5);
    assert_eq!(config.display.event_poll_interval_ms, 25);
    assert_eq!(config.theme.colors.primary, "#00ff00");
    assert_eq!(config.theme.colors.secondary, "magenta");

    let theme = Theme::from_config(&config.theme).unwrap();
    assert_eq!(theme.get("primary"), Color::Rgb(0, 255, 0));
}

#[test]
fn test_unparsable_config_is_an_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::create_dir_all(config_manager.config_dir()).unwrap();
    fs::write(
        config_manager.config_path("config.toml"),
        "display = \"not a table\"",
    )
    .unwrap();
    assert!(config_manager.load_config().is_err());
}

#[test]
fn test_invalid_color_is_a_theme_error() {
    let mut config = AppConfig::default();
    config.theme.colors.primary = "not-a-color".to_string();
    assert!(Theme::from_config(&config.theme).is_err());
}
