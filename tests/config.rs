//! Configuration system tests
//!
//! Tests for config paths and loading/saving the editor config.

use textarea_core::config::EditorConfig;
use textarea_core::config_paths;
use textarea_core::{Color, TextArea};

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("textarea-core"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert_eq!(path.file_name().unwrap(), "config.yaml");
}

#[test]
fn test_logs_dir_is_inside_config_dir() {
    let config = config_paths::config_dir().unwrap();
    let logs = config_paths::logs_dir().unwrap();
    assert!(logs.starts_with(&config));
}

// ========================================================================
// Load / Save Tests
// ========================================================================

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = EditorConfig::default();
    config.gutter.row_height = 18.0;
    config.bookmark_icon = "star".to_string();
    config.colors.mark_all = Color::rgba(0x12, 0x34, 0x56, 0x78);
    config.save_to(&path).unwrap();

    let loaded = EditorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_from_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EditorConfig::load_from(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(err.contains("Failed to read config"));
}

#[test]
fn test_load_from_invalid_yaml_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "max_compound_edits: lots\n").unwrap();
    let err = EditorConfig::load_from(&path).unwrap_err();
    assert!(err.contains("Failed to parse config"));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "max_compound_edits: 5\n").unwrap();

    let config = EditorConfig::load_from(&path).unwrap();
    assert_eq!(config.max_compound_edits, 5);
    assert_eq!(config.gutter, EditorConfig::default().gutter);
}

// ========================================================================
// Config Applied To Text Area
// ========================================================================

#[test]
fn test_bookmark_icon_name_from_config() {
    let config = EditorConfig::from_yaml_str("bookmark_icon: flag\n").unwrap();
    let mut area = TextArea::new("a\nb\nc", config).unwrap();
    area.add_icon_at_line(1, "bookmark", None).unwrap();
    assert!(area.bookmarks().unwrap().is_empty());

    area.toggle_bookmark(2).unwrap();
    assert_eq!(area.bookmarks().unwrap(), vec![2]);
    assert_eq!(area.gutter().icons.icons()[1].icon(), "flag");
}

#[test]
fn test_selection_color_from_config() {
    let config = EditorConfig::from_yaml_str("colors:\n  selection: \"#00FF00\"\n").unwrap();
    let mut area = TextArea::new("hello", config).unwrap();
    area.select_range(0, 5).unwrap();

    let layout = area.fixed_layout(400.0);
    let ops = area
        .paint_highlights(&layout, textarea_core::layout::Viewport::new(0.0, 50.0))
        .unwrap();
    assert_eq!(ops[0].painter.color(), Color::rgb(0, 0xFF, 0));
}
