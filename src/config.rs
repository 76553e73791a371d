//! Text area configuration
//!
//! Stored in `~/.config/textarea-core/config.yaml`. Every field has a
//! default, so a partial file (or none at all) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Color;
use crate::undo::DEFAULT_MAX_COMPOUND_EDITS;

/// Gutter geometry and lane options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    pub row_height: f32,
    pub inset_top: f32,
    pub char_width: f32,
    /// Number shown for the first line
    pub line_number_start: usize,
    pub line_number_padding: f32,
    pub fold_glyph_width: f32,
    /// Longest collapsed-fold preview, in lines
    pub fold_tooltip_max_lines: usize,
    pub icon_width: f32,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            row_height: 16.0,
            inset_top: 0.0,
            char_width: 8.0,
            line_number_start: 1,
            line_number_padding: 4.0,
            fold_glyph_width: 12.0,
            fold_tooltip_max_lines: 25,
            icon_width: 16.0,
        }
    }
}

/// Default paint colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub selection: Color,
    pub mark_all: Color,
    pub current_line: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            selection: Color::rgb(0x26, 0x4F, 0x78),
            mark_all: Color::rgba(0xFF, 0xC8, 0x00, 0x80),
            current_line: Color::rgb(0x2A, 0x2D, 0x2E),
        }
    }
}

/// Configuration for one text area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub gutter: GutterConfig,
    pub colors: ColorConfig,
    /// Compound edits kept in undo history
    pub max_compound_edits: usize,
    /// Icon name that marks a tracked icon as a bookmark
    pub bookmark_icon: String,
    /// Paint a `colors.current_line` background on the caret line. Off by
    /// default.
    pub highlight_current_line: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            gutter: GutterConfig::default(),
            colors: ColorConfig::default(),
            max_compound_edits: DEFAULT_MAX_COMPOUND_EDITS,
            bookmark_icon: "bookmark".to_string(),
            highlight_current_line: false,
        }
    }
}

impl EditorConfig {
    /// Load config from the user config dir, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        Self::from_yaml_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Save to the user config dir
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }
}
