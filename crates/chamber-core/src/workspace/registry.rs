//! Workspace registry
//!
//! Maps workspace keys to their pane pair and owns the tab arena that every
//! pane references into.

use super::pane::{PaneId, PaneState};
use super::tab::{default_tabs, Tab, TabId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Key used when no directory is selected
pub const GLOBAL_WORKSPACE_KEY: &str = "global";

/// Opaque workspace identity, usually a project or worktree directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceKey(String);

impl WorkspaceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The sentinel workspace used when no directory is selected
    pub fn global() -> Self {
        Self(GLOBAL_WORKSPACE_KEY.to_string())
    }

    /// Key for the current directory selection
    pub fn from_directory(dir: Option<&Path>) -> Self {
        match dir {
            Some(path) if !path.as_os_str().is_empty() => {
                Self(path.to_string_lossy().into_owned())
            }
            _ => Self::global(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_WORKSPACE_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkspaceKey {
    fn default() -> Self {
        Self::global()
    }
}

impl From<&str> for WorkspaceKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorkspaceKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&WorkspaceKey> for WorkspaceKey {
    fn from(key: &WorkspaceKey) -> Self {
        key.clone()
    }
}

impl std::fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The left and right panes of one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePanes {
    pub left: PaneState,
    pub right: PaneState,
}

impl WorkspacePanes {
    pub fn pane(&self, id: PaneId) -> &PaneState {
        match id {
            PaneId::Left => &self.left,
            PaneId::Right => &self.right,
        }
    }

    pub fn pane_mut(&mut self, id: PaneId) -> &mut PaneState {
        match id {
            PaneId::Left => &mut self.left,
            PaneId::Right => &mut self.right,
        }
    }

    /// Total tabs across both panes
    pub fn tab_count(&self) -> usize {
        self.left.len() + self.right.len()
    }

    /// Which pane holds `id`, checking left first
    pub fn locate(&self, id: &TabId) -> Option<PaneId> {
        PaneId::ALL
            .into_iter()
            .find(|pane| self.pane(*pane).contains(id))
    }
}

/// All workspaces seen during this process plus the tab arena
#[derive(Debug, Clone, Default)]
pub struct WorkspaceRegistry {
    workspaces: HashMap<WorkspaceKey, WorkspacePanes>,

    /// Tab contents by id, shared by every pane of every workspace
    tabs: HashMap<TabId, Tab>,
}

impl WorkspaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the panes for `key`, creating them on first access
    ///
    /// A new workspace gets the default tab set in `left` with the first tab
    /// active and an empty `right`. This is the only way entries are created.
    pub fn ensure(&mut self, key: &WorkspaceKey, now_ms: i64) -> &mut WorkspacePanes {
        if !self.workspaces.contains_key(key) {
            let ids: Vec<TabId> = default_tabs(now_ms)
                .into_iter()
                .map(|tab| self.insert_tab(tab))
                .collect();
            let first = ids.first().cloned();

            tracing::info!(workspace = %key, "created workspace with default tabs");
            self.workspaces.insert(
                key.clone(),
                WorkspacePanes {
                    left: PaneState::from_parts(ids, first),
                    right: PaneState::default(),
                },
            );
        }

        self.workspaces.entry(key.clone()).or_default()
    }

    /// Insert a restored workspace as-is
    pub fn restore(&mut self, key: WorkspaceKey, panes: WorkspacePanes) {
        self.workspaces.insert(key, panes);
    }

    /// Drop a workspace and every tab its panes reference
    pub fn discard(&mut self, key: &WorkspaceKey) -> Option<WorkspacePanes> {
        let panes = self.workspaces.remove(key)?;
        for id in panes.left.tabs().iter().chain(panes.right.tabs()) {
            self.tabs.remove(id);
        }
        tracing::debug!(workspace = %key, "discarded workspace");
        Some(panes)
    }

    pub fn contains(&self, key: &WorkspaceKey) -> bool {
        self.workspaces.contains_key(key)
    }

    pub fn get(&self, key: &WorkspaceKey) -> Option<&WorkspacePanes> {
        self.workspaces.get(key)
    }

    pub fn get_mut(&mut self, key: &WorkspaceKey) -> Option<&mut WorkspacePanes> {
        self.workspaces.get_mut(key)
    }

    /// Workspace keys in sorted order
    pub fn keys(&self) -> Vec<&WorkspaceKey> {
        let mut keys: Vec<_> = self.workspaces.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    pub fn tab_mut(&mut self, id: &TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(id)
    }

    pub fn contains_tab(&self, id: &TabId) -> bool {
        self.tabs.contains_key(id)
    }

    /// Add a tab to the arena, re-rolling its id until it is unused
    pub fn insert_tab(&mut self, mut tab: Tab) -> TabId {
        while self.tabs.contains_key(&tab.id) {
            tracing::debug!(tab_id = %tab.id, "tab id collision, regenerating");
            tab.id = TabId::generate(tab.tab_type, tab.created_at);
        }
        let id = tab.id.clone();
        self.tabs.insert(id.clone(), tab);
        id
    }

    pub fn remove_tab(&mut self, id: &TabId) -> Option<Tab> {
        self.tabs.remove(id)
    }

    /// Resolve a pane's ids into tabs, in display order
    pub fn resolve<'a>(&'a self, pane: &'a PaneState) -> impl Iterator<Item = &'a Tab> + 'a {
        pane.tabs().iter().filter_map(move |id| self.tabs.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tab::{TabDraft, TabType};

    #[test]
    fn test_key_from_directory() {
        assert!(WorkspaceKey::from_directory(None).is_global());
        assert!(WorkspaceKey::from_directory(Some(Path::new(""))).is_global());
        assert_eq!(
            WorkspaceKey::from_directory(Some(Path::new("/tmp/proj"))).as_str(),
            "/tmp/proj"
        );
    }

    #[test]
    fn test_ensure_seeds_left_only() {
        let mut registry = WorkspaceRegistry::new();
        let key = WorkspaceKey::from("proj-a");
        let panes = registry.ensure(&key, 1000).clone();

        assert_eq!(panes.left.len(), 4);
        assert_eq!(panes.left.active_tab_id(), panes.left.tab_at(0));
        assert!(panes.right.is_empty());
        assert_eq!(panes.right.active_tab_id(), None);

        let types: Vec<TabType> = registry.resolve(&panes.left).map(|t| t.tab_type).collect();
        assert_eq!(
            types,
            vec![TabType::Files, TabType::Diff, TabType::Terminal, TabType::Git]
        );
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut registry = WorkspaceRegistry::new();
        let key = WorkspaceKey::from("proj-a");
        let first = registry.ensure(&key, 1000).clone();
        let second = registry.ensure(&key, 2000).clone();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_tab_rerolls_collision() {
        let mut registry = WorkspaceRegistry::new();
        let tab = Tab::from_draft(TabDraft::new(TabType::Git, "Git"), 0);
        let mut dup = tab.clone();
        dup.title = "Other".into();

        let a = registry.insert_tab(tab);
        let b = registry.insert_tab(dup);
        assert_ne!(a, b);
        assert_eq!(registry.tab(&b).unwrap().title, "Other");
    }

    #[test]
    fn test_discard_removes_tabs() {
        let mut registry = WorkspaceRegistry::new();
        let key = WorkspaceKey::from("w");
        let first = registry.ensure(&key, 0).left.tab_at(0).cloned().unwrap();

        assert!(registry.discard(&key).is_some());
        assert!(!registry.contains(&key));
        assert!(!registry.contains_tab(&first));
        assert!(registry.discard(&key).is_none());
    }

    #[test]
    fn test_locate() {
        let mut registry = WorkspaceRegistry::new();
        let key = WorkspaceKey::from("w");
        let panes = registry.ensure(&key, 0);
        let id = panes.left.tab_at(2).cloned().unwrap();
        assert_eq!(panes.locate(&id), Some(PaneId::Left));
        assert_eq!(panes.locate(&TabId::from("nope")), None);
    }
}
