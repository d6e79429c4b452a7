//! Layout persistence layer
//!
//! Handles loading and saving the tab layout to disk. Reads never fail the
//! caller: a missing, unreadable or malformed file yields the default layout.

use super::pane::PaneId;
use super::registry::WorkspaceKey;
use super::store::DEFAULT_RIGHT_PANE_WIDTH;
use super::tab::{Tab, TabId};
use crate::error::{ChamberError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted form of one pane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPane {
    #[serde(default)]
    pub tabs: Vec<Tab>,

    #[serde(default)]
    pub active_tab_id: Option<TabId>,
}

/// Persisted form of one workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedWorkspace {
    #[serde(default)]
    pub left: PersistedPane,

    #[serde(default)]
    pub right: PersistedPane,
}

impl PersistedWorkspace {
    pub fn pane(&self, id: PaneId) -> &PersistedPane {
        match id {
            PaneId::Left => &self.left,
            PaneId::Right => &self.right,
        }
    }
}

/// Everything about the layout that survives a restart
///
/// The focused pane is deliberately absent; it always starts on `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    #[serde(default)]
    pub workspaces: BTreeMap<WorkspaceKey, PersistedWorkspace>,

    #[serde(default = "default_right_pane_visible")]
    pub right_pane_visible: bool,

    #[serde(default = "default_right_pane_width")]
    pub right_pane_width: i64,
}

fn default_right_pane_visible() -> bool {
    true
}

fn default_right_pane_width() -> i64 {
    DEFAULT_RIGHT_PANE_WIDTH as i64
}

impl Default for PersistedLayout {
    fn default() -> Self {
        Self {
            workspaces: BTreeMap::new(),
            right_pane_visible: default_right_pane_visible(),
            right_pane_width: default_right_pane_width(),
        }
    }
}

/// Storage backend for the layout file
#[derive(Debug, Clone)]
pub struct LayoutStorage {
    /// Path to the layout file
    path: PathBuf,
}

impl LayoutStorage {
    /// Storage at the default location, `<config dir>/openchamber/layout.json`
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChamberError::config("Could not determine config directory"))?;

        Ok(Self {
            path: config_dir.join("openchamber").join("layout.json"),
        })
    }

    /// Create with a custom file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the layout file, `Ok(None)` if there is none
    pub fn try_load(&self) -> Result<Option<PersistedLayout>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ChamberError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read layout: {}", e),
            ))
        })?;

        let layout = serde_json::from_str(&content).map_err(|e| {
            ChamberError::Serialization(format!("Failed to parse layout: {}", e))
        })?;

        Ok(Some(layout))
    }

    /// Read the layout file, falling back to defaults on any problem
    pub fn load(&self) -> PersistedLayout {
        match self.try_load() {
            Ok(Some(layout)) => layout,
            Ok(None) => PersistedLayout::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable layout");
                PersistedLayout::default()
            }
        }
    }

    /// Write the layout atomically via a temp file
    pub fn save(&self, layout: &PersistedLayout) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    ChamberError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create layout directory: {}", e),
                    ))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(layout).map_err(|e| {
            ChamberError::Serialization(format!("Failed to serialize layout: {}", e))
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            ChamberError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write layout: {}", e),
            ))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ChamberError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to save layout: {}", e),
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "layout saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tab::{TabDraft, TabType};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fields_use_defaults() {
        let layout: PersistedLayout = serde_json::from_str("{}").unwrap();
        assert!(layout.workspaces.is_empty());
        assert!(layout.right_pane_visible);
        assert_eq!(layout.right_pane_width, 400);

        let layout: PersistedLayout =
            serde_json::from_str(r#"{"workspaces":{"a":{"left":{}}}}"#).unwrap();
        let ws = &layout.workspaces[&WorkspaceKey::from("a")];
        assert!(ws.left.tabs.is_empty());
        assert!(ws.right.active_tab_id.is_none());
    }

    #[test]
    fn test_storage_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LayoutStorage::with_path(temp_dir.path().join("nested").join("layout.json"));

        let tab = Tab::from_draft(TabDraft::new(TabType::Terminal, "Terminal"), 7);
        let mut layout = PersistedLayout::default();
        layout.right_pane_width = 512;
        layout.workspaces.insert(
            WorkspaceKey::from("proj"),
            PersistedWorkspace {
                left: PersistedPane {
                    active_tab_id: Some(tab.id.clone()),
                    tabs: vec![tab],
                },
                right: PersistedPane::default(),
            },
        );

        storage.save(&layout).unwrap();
        assert_eq!(storage.try_load().unwrap(), Some(layout));
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LayoutStorage::with_path(temp_dir.path().join("layout.json"));
        assert_eq!(storage.try_load().unwrap(), None);
        assert_eq!(storage.load(), PersistedLayout::default());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.json");
        fs::write(&path, "{ not json").unwrap();

        let storage = LayoutStorage::with_path(&path);
        assert!(storage.try_load().is_err());
        assert_eq!(storage.load(), PersistedLayout::default());
    }
}
