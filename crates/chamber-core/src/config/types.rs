//! Configuration types for OpenChamber
//!
//! Defines the structure of `.openchamber.toml` configuration.

use crate::workspace::{DEFAULT_RIGHT_PANE_WIDTH, RIGHT_PANE_MAX_WIDTH, RIGHT_PANE_MIN_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChamberConfig {
    /// Report operations on unknown tabs or indices as errors instead of
    /// ignoring them
    #[serde(default)]
    pub strict: bool,

    /// Initial layout values used when nothing is persisted
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Layout persistence settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Layout defaults section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Whether the right pane starts visible
    #[serde(default = "default_right_pane_visible")]
    pub right_pane_visible: bool,

    /// Starting right pane width, clamped to the allowed range
    #[serde(default = "default_right_pane_width")]
    pub right_pane_width: u32,
}

fn default_right_pane_visible() -> bool {
    true
}

fn default_right_pane_width() -> u32 {
    DEFAULT_RIGHT_PANE_WIDTH
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            right_pane_visible: default_right_pane_visible(),
            right_pane_width: default_right_pane_width(),
        }
    }
}

impl LayoutConfig {
    /// Configured width, forced into the allowed range
    pub fn clamped_width(&self) -> u32 {
        self.right_pane_width
            .clamp(RIGHT_PANE_MIN_WIDTH, RIGHT_PANE_MAX_WIDTH)
    }
}

/// Persistence section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Whether the layout is written to disk at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Quiet period before a pending layout is written
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Layout file location (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub path: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    250
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ms: default_debounce_ms(),
            path: None,
        }
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Configured layout path, or `<config dir>/openchamber/layout.json`
    pub fn layout_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => dirs::config_dir().map(|d| d.join("openchamber").join("layout.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChamberConfig::default();
        assert!(!config.strict);
        assert!(config.layout.right_pane_visible);
        assert_eq!(config.layout.right_pane_width, 400);
        assert!(config.persistence.enabled);
        assert_eq!(config.persistence.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ChamberConfig = toml::from_str("[layout]\nright_pane_width = 5000\n").unwrap();
        assert!(config.layout.right_pane_visible);
        assert_eq!(config.layout.clamped_width(), RIGHT_PANE_MAX_WIDTH);
        assert_eq!(config.persistence.debounce_ms, 250);
    }

    #[test]
    fn test_explicit_layout_path() {
        let config = PersistenceConfig {
            path: Some("/tmp/layout.json".into()),
            ..Default::default()
        };
        assert_eq!(config.layout_path(), Some(PathBuf::from("/tmp/layout.json")));
    }
}
