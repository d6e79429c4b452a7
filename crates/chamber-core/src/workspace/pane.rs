//! Pane state
//!
//! A pane is an ordered list of tab ids plus an active-tab pointer. Tab
//! contents live in the registry's arena; panes only hold references.

use super::tab::TabId;
use serde::{Deserialize, Serialize};

/// One of the two pane slots in a workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneId {
    #[default]
    Left,
    Right,
}

impl PaneId {
    /// Both panes in lookup order
    pub const ALL: [PaneId; 2] = [PaneId::Left, PaneId::Right];

    /// The opposite pane
    pub fn other(&self) -> Self {
        match self {
            PaneId::Left => PaneId::Right,
            PaneId::Right => PaneId::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaneId::Left => "left",
            PaneId::Right => "right",
        }
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered tabs and the active pointer of a single pane
///
/// Invariant: `active_tab_id`, when set, names an entry of `tabs`, and it is
/// `None` whenever `tabs` is empty. `version` increases on every observable
/// change so readers can detect updates without diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneState {
    tabs: Vec<TabId>,
    active_tab_id: Option<TabId>,
    version: u64,
}

impl PaneState {
    /// Build a pane from restored parts, repairing a dangling active pointer
    pub fn from_parts(tabs: Vec<TabId>, active_tab_id: Option<TabId>) -> Self {
        let active_tab_id = match active_tab_id {
            Some(id) if tabs.contains(&id) => Some(id),
            Some(_) => tabs.first().cloned(),
            None => None,
        };
        Self {
            tabs,
            active_tab_id,
            version: 0,
        }
    }

    pub fn tabs(&self) -> &[TabId] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> Option<&TabId> {
        self.active_tab_id.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn contains(&self, id: &TabId) -> bool {
        self.tabs.contains(id)
    }

    pub fn position(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t == id)
    }

    pub fn tab_at(&self, index: usize) -> Option<&TabId> {
        self.tabs.get(index)
    }

    pub fn is_active(&self, id: &TabId) -> bool {
        self.active_tab_id.as_ref() == Some(id)
    }

    /// Mark the pane as changed without structural edits (e.g. a title update)
    pub fn touch(&mut self) {
        self.version += 1;
    }

    /// Append a tab and make it active
    pub fn push(&mut self, id: TabId) {
        self.insert(None, id);
    }

    /// Insert at `index` (clamped to the current length, or the end when
    /// `None`) and make the tab active
    pub fn insert(&mut self, index: Option<usize>, id: TabId) {
        let index = index.map_or(self.tabs.len(), |i| i.min(self.tabs.len()));
        self.tabs.insert(index, id.clone());
        self.active_tab_id = Some(id);
        self.touch();
    }

    /// Remove a tab, returning the index it occupied
    ///
    /// When the removed tab was active, focus moves to the tab now at the same
    /// index, or the new last tab, or nothing if the pane is empty.
    pub fn remove(&mut self, id: &TabId) -> Option<usize> {
        let index = self.position(id)?;
        self.tabs.remove(index);

        if self.is_active(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[index.min(self.tabs.len() - 1)].clone())
            };
        }

        self.touch();
        Some(index)
    }

    /// Point the active tab at `id` if the pane holds it
    pub fn set_active(&mut self, id: &TabId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.is_active(id) {
            self.active_tab_id = Some(id.clone());
            self.touch();
        }
        true
    }

    /// Move `source` to the slot `target` holds once `source` is taken out
    pub fn reorder(&mut self, source: &TabId, target: &TabId) -> bool {
        if source == target {
            return false;
        }
        let Some(from) = self.position(source) else {
            return false;
        };
        if !self.contains(target) {
            return false;
        }

        let moved = self.tabs.remove(from);
        let to = self.position(target).unwrap_or(self.tabs.len());
        self.tabs.insert(to, moved);
        self.touch();
        true
    }
}
