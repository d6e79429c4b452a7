//! Workspace-scoped access to the store
//!
//! Front ends never touch the registry directly. They ask the store for a
//! [`WorkspaceHandle`], which ensures the workspace exists and exposes every
//! operation pre-bound to its key.

use super::drag::{DragPayload, DropTarget};
use super::pane::PaneId;
use super::registry::WorkspaceKey;
use super::store::WorkspaceStore;
use super::tab::{Tab, TabDraft, TabId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Resolved, read-only view of one pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneView {
    pub pane: PaneId,
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<TabId>,
    pub version: u64,
}

impl PaneView {
    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_ref()?;
        self.tabs.iter().find(|tab| &tab.id == id)
    }
}

impl WorkspaceStore {
    /// Handle bound to `key`, creating the workspace on first access
    pub fn workspace(&mut self, key: impl Into<WorkspaceKey>) -> WorkspaceHandle<'_> {
        let key = key.into();
        self.ensure_workspace(&key);
        WorkspaceHandle { store: self, key }
    }

    /// Handle for the selected directory, or the global workspace when none is
    /// selected
    pub fn workspace_for_directory(&mut self, dir: Option<&Path>) -> WorkspaceHandle<'_> {
        self.workspace(WorkspaceKey::from_directory(dir))
    }

    /// View of a pane, if the workspace exists
    pub fn pane_view(&self, key: &WorkspaceKey, pane: PaneId) -> Option<PaneView> {
        let state = self.panes(key)?.pane(pane);
        Some(PaneView {
            pane,
            tabs: self.tabs_in(key, pane).into_iter().cloned().collect(),
            active_tab_id: state.active_tab_id().cloned(),
            version: state.version(),
        })
    }
}

/// A store borrowed for one workspace
pub struct WorkspaceHandle<'a> {
    store: &'a mut WorkspaceStore,
    key: WorkspaceKey,
}

impl WorkspaceHandle<'_> {
    pub fn key(&self) -> &WorkspaceKey {
        &self.key
    }

    pub fn pane(&self, pane: PaneId) -> PaneView {
        self.store.pane_view(&self.key, pane).unwrap_or_else(|| PaneView {
            pane,
            tabs: Vec::new(),
            active_tab_id: None,
            version: 0,
        })
    }

    pub fn left(&self) -> PaneView {
        self.pane(PaneId::Left)
    }

    pub fn right(&self) -> PaneView {
        self.pane(PaneId::Right)
    }

    pub fn focused_pane(&self) -> PaneId {
        self.store.focused_pane()
    }

    pub fn right_pane_visible(&self) -> bool {
        self.store.right_pane_visible()
    }

    pub fn right_pane_width(&self) -> u32 {
        self.store.right_pane_width()
    }

    pub fn add_tab(&mut self, pane: PaneId, draft: TabDraft) -> Result<TabId> {
        self.store.add_tab(&self.key, pane, draft)
    }

    pub fn close_tab(&mut self, pane: PaneId, tab_id: &TabId) -> Result<()> {
        self.store.close_tab(&self.key, pane, tab_id)
    }

    pub fn set_active_tab(&mut self, pane: PaneId, tab_id: &TabId) -> Result<()> {
        self.store.set_active_tab(&self.key, pane, tab_id)
    }

    pub fn update_tab_title(&mut self, pane: PaneId, tab_id: &TabId, title: impl Into<String>) -> Result<()> {
        self.store.update_tab_title(&self.key, pane, tab_id, title)
    }

    pub fn update_tab_metadata(&mut self, pane: PaneId, tab_id: &TabId, patch: Map<String, Value>) -> Result<()> {
        self.store.update_tab_metadata(&self.key, pane, tab_id, patch)
    }

    pub fn move_tab(&mut self, source: PaneId, target: PaneId, tab_id: &TabId, index: Option<usize>) -> Result<()> {
        self.store.move_tab(&self.key, source, target, tab_id, index)
    }

    pub fn reorder_tabs(&mut self, pane: PaneId, source_id: &TabId, target_id: &TabId) -> Result<()> {
        self.store.reorder_tabs(&self.key, pane, source_id, target_id)
    }

    pub fn open_chat_session(&mut self, pane: PaneId, session_id: &str, title: Option<&str>) -> Result<TabId> {
        self.store.open_chat_session(&self.key, pane, session_id, title)
    }

    pub fn find_tab_by_session_id(&self, session_id: &str) -> Option<(PaneId, &Tab)> {
        self.store.find_tab_by_session_id(&self.key, session_id)
    }

    pub fn activate_tab_by_index(&mut self, index: usize) -> Result<()> {
        self.store.activate_tab_by_index(&self.key, index)
    }

    pub fn close_active_tab(&mut self) -> Result<()> {
        self.store.close_active_tab(&self.key)
    }

    pub fn apply_drop(&mut self, payload: &DragPayload, target: &DropTarget) -> Result<()> {
        self.store.apply_drop(&self.key, payload, target)
    }

    pub fn set_focused_pane(&mut self, pane: PaneId) {
        self.store.set_focused_pane(pane);
    }

    pub fn toggle_right_pane(&mut self) {
        self.store.toggle_right_pane();
    }

    pub fn set_right_pane_width(&mut self, width: i64) -> u32 {
        self.store.set_right_pane_width(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tab::TabType;

    #[test]
    fn test_handle_ensures_workspace() {
        let mut store = WorkspaceStore::new();
        let handle = store.workspace("proj-a");
        assert_eq!(handle.left().tabs.len(), 4);
        assert!(handle.right().tabs.is_empty());
        assert_eq!(handle.focused_pane(), PaneId::Left);
        assert_eq!(handle.right_pane_width(), 400);
        assert!(store.panes(&WorkspaceKey::from("proj-a")).is_some());
    }

    #[test]
    fn test_no_directory_maps_to_global() {
        let mut store = WorkspaceStore::new();
        let handle = store.workspace_for_directory(None);
        assert!(handle.key().is_global());
    }

    #[test]
    fn test_handle_operations_are_bound() {
        let mut store = WorkspaceStore::new();
        let mut a = store.workspace("a");
        let chat = a.open_chat_session(PaneId::Left, "s1", Some("One")).unwrap();
        a.move_tab(PaneId::Left, PaneId::Right, &chat, None).unwrap();
        assert_eq!(a.right().active_tab().map(|t| t.title.as_str()), Some("One"));
        assert_eq!(a.find_tab_by_session_id("s1").map(|(p, _)| p), Some(PaneId::Right));

        let b = store.workspace("b");
        assert!(b.find_tab_by_session_id("s1").is_none());
        assert!(b.right().tabs.is_empty());
        // focus is shared across workspaces
        assert_eq!(b.focused_pane(), PaneId::Right);
    }

    #[test]
    fn test_pane_view_tracks_version() {
        let mut store = WorkspaceStore::new();
        let mut handle = store.workspace("v");
        let before = handle.left().version;
        let id = handle
            .add_tab(PaneId::Left, TabDraft::new(TabType::Terminal, "T2"))
            .unwrap();
        let view = handle.left();
        assert!(view.version > before);
        assert_eq!(view.active_tab_id, Some(id));
    }
}
