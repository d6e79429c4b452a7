//! WorkspaceStore - all pane/tab mutations and queries
//!
//! The store is an explicit context object: front ends own one (or share one
//! behind a lock) and pass it to whatever needs it. Every operation ensures
//! its workspace exists before acting on it.
//!
//! Operations that name a tab or index which does not resolve are no-ops.
//! In strict mode they return [`ChamberError::TabNotFound`] or
//! [`ChamberError::IndexOutOfRange`] instead. State is unchanged either way;
//! a workspace created by a failing strict operation is dropped again.

use super::drag::{DragPayload, DropTarget};
use super::pane::{PaneId, PaneState};
use super::registry::{WorkspaceKey, WorkspacePanes, WorkspaceRegistry};
use super::storage::{PersistedLayout, PersistedPane, PersistedWorkspace};
use super::tab::{now_ms, Tab, TabDraft, TabId, TabType};
use crate::config::ChamberConfig;
use crate::error::{ChamberError, Result};
use serde_json::{Map, Value};

/// Narrowest allowed right pane width
pub const RIGHT_PANE_MIN_WIDTH: u32 = 280;

/// Widest allowed right pane width
pub const RIGHT_PANE_MAX_WIDTH: u32 = 800;

/// Right pane width when nothing else is known
pub const DEFAULT_RIGHT_PANE_WIDTH: u32 = 400;

/// Force a requested width into the allowed range
pub fn clamp_right_pane_width(width: i64) -> u32 {
    width.clamp(RIGHT_PANE_MIN_WIDTH as i64, RIGHT_PANE_MAX_WIDTH as i64) as u32
}

/// Registry of every workspace plus the workspace-independent UI state
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    registry: WorkspaceRegistry,

    /// Pane holding keyboard focus, shared by all workspaces
    focused_pane: PaneId,

    right_pane_visible: bool,

    right_pane_width: u32,

    /// Bumped on any change to the three fields above
    ui_version: u64,

    /// Bumped when visibility or width change (the persisted subset)
    ui_layout_changes: u64,

    strict: bool,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self {
            registry: WorkspaceRegistry::new(),
            focused_pane: PaneId::Left,
            right_pane_visible: true,
            right_pane_width: DEFAULT_RIGHT_PANE_WIDTH,
            ui_version: 0,
            ui_layout_changes: 0,
            strict: false,
        }
    }
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store using the configured layout defaults
    pub fn from_config(config: &ChamberConfig) -> Self {
        Self {
            right_pane_visible: config.layout.right_pane_visible,
            right_pane_width: config.layout.clamped_width(),
            strict: config.strict,
            ..Self::default()
        }
    }

    /// Rebuild a store from a persisted layout
    ///
    /// Tabs whose id already appeared earlier in the layout are dropped, and
    /// dangling active pointers fall back to the first tab of their pane.
    pub fn from_layout(layout: PersistedLayout, config: &ChamberConfig) -> Self {
        let mut store = Self {
            right_pane_visible: layout.right_pane_visible,
            right_pane_width: clamp_right_pane_width(layout.right_pane_width),
            strict: config.strict,
            ..Self::default()
        };

        for (key, workspace) in layout.workspaces {
            let left = store.restore_pane(&key, PaneId::Left, workspace.left);
            let right = store.restore_pane(&key, PaneId::Right, workspace.right);
            store.registry.restore(key, WorkspacePanes { left, right });
        }

        tracing::info!(workspaces = store.registry.len(), "restored layout");
        store
    }

    fn restore_pane(&mut self, key: &WorkspaceKey, pane: PaneId, persisted: PersistedPane) -> PaneState {
        let mut ids = Vec::with_capacity(persisted.tabs.len());
        for tab in persisted.tabs {
            if self.registry.contains_tab(&tab.id) {
                tracing::warn!(workspace = %key, %pane, tab_id = %tab.id, "dropping duplicate tab id");
                continue;
            }
            ids.push(self.registry.insert_tab(tab));
        }
        PaneState::from_parts(ids, persisted.active_tab_id)
    }

    /// The persistable part of the store
    pub fn snapshot(&self) -> PersistedLayout {
        let workspaces = self
            .registry
            .keys()
            .into_iter()
            .filter_map(|key| {
                let panes = self.registry.get(key)?;
                Some((
                    key.clone(),
                    PersistedWorkspace {
                        left: self.persist_pane(&panes.left),
                        right: self.persist_pane(&panes.right),
                    },
                ))
            })
            .collect();

        PersistedLayout {
            workspaces,
            right_pane_visible: self.right_pane_visible,
            right_pane_width: self.right_pane_width as i64,
        }
    }

    fn persist_pane(&self, pane: &PaneState) -> PersistedPane {
        PersistedPane {
            tabs: self.registry.resolve(pane).cloned().collect(),
            active_tab_id: pane.active_tab_id().cloned(),
        }
    }

    // ========== Accessors ==========

    pub fn registry(&self) -> &WorkspaceRegistry {
        &self.registry
    }

    pub fn focused_pane(&self) -> PaneId {
        self.focused_pane
    }

    pub fn right_pane_visible(&self) -> bool {
        self.right_pane_visible
    }

    pub fn right_pane_width(&self) -> u32 {
        self.right_pane_width
    }

    pub fn ui_version(&self) -> u64 {
        self.ui_version
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Monotonic counter that increases whenever the persisted layout changes
    pub fn layout_revision(&self) -> u64 {
        let panes: u64 = self
            .registry
            .keys()
            .into_iter()
            .filter_map(|key| self.registry.get(key))
            .map(|p| p.left.version() + p.right.version())
            .sum();
        panes + self.registry.len() as u64 + self.ui_layout_changes
    }

    /// Panes of an existing workspace
    pub fn panes(&self, key: &WorkspaceKey) -> Option<&WorkspacePanes> {
        self.registry.get(key)
    }

    pub fn pane_version(&self, key: &WorkspaceKey, pane: PaneId) -> Option<u64> {
        self.registry.get(key).map(|p| p.pane(pane).version())
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.registry.tab(id)
    }

    /// Tabs of a pane in display order (empty for unknown workspaces)
    pub fn tabs_in(&self, key: &WorkspaceKey, pane: PaneId) -> Vec<&Tab> {
        match self.registry.get(key) {
            Some(panes) => self.registry.resolve(panes.pane(pane)).collect(),
            None => Vec::new(),
        }
    }

    /// Active tab of a pane, if any
    pub fn active_tab(&self, key: &WorkspaceKey, pane: PaneId) -> Option<&Tab> {
        let id = self.registry.get(key)?.pane(pane).active_tab_id()?;
        self.registry.tab(id)
    }

    // ========== Workspace lifecycle ==========

    /// Create the workspace on first access; later calls are no-ops
    pub fn ensure_workspace(&mut self, key: &WorkspaceKey) -> &WorkspacePanes {
        self.registry.ensure(key, now_ms())
    }

    fn pane_mut(&mut self, key: &WorkspaceKey, pane: PaneId) -> &mut PaneState {
        self.registry.ensure(key, now_ms()).pane_mut(pane)
    }

    fn pane_ref(&mut self, key: &WorkspaceKey, pane: PaneId) -> &PaneState {
        self.pane_mut(key, pane)
    }

    /// Swallow or report a reference that did not resolve
    fn missing(&self, err: ChamberError) -> Result<()> {
        if self.strict {
            return Err(err);
        }
        tracing::debug!(error = %err, "ignoring operation on missing reference");
        Ok(())
    }

    fn focus(&mut self, pane: PaneId) {
        if self.focused_pane != pane {
            self.focused_pane = pane;
            self.ui_version += 1;
        }
    }

    // ========== Tab operations ==========

    /// Run `op`, dropping the workspace again if `op` created it and failed
    fn rollback_on_error<T>(
        &mut self,
        key: &WorkspaceKey,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let existed = self.registry.contains(key);
        let result = op(self);
        if result.is_err() && !existed {
            self.registry.discard(key);
        }
        result
    }

    /// Append a tab to `pane` and make it active, returning its id
    pub fn add_tab(&mut self, key: &WorkspaceKey, pane: PaneId, draft: TabDraft) -> Result<TabId> {
        self.ensure_workspace(key);
        let tab = Tab::from_draft(draft, now_ms());
        let id = self.registry.insert_tab(tab);
        self.pane_mut(key, pane).push(id.clone());

        tracing::debug!(workspace = %key, %pane, tab_id = %id, "tab added");
        Ok(id)
    }

    /// Remove a tab; if it was active, its right-hand neighbour (or the new
    /// last tab) becomes active
    pub fn close_tab(&mut self, key: &WorkspaceKey, pane: PaneId, tab_id: &TabId) -> Result<()> {
        self.rollback_on_error(key, |store| {
            if store.pane_mut(key, pane).remove(tab_id).is_none() {
                return store.missing(ChamberError::tab_not_found(tab_id, pane));
            }
            store.registry.remove_tab(tab_id);

            tracing::debug!(workspace = %key, %pane, %tab_id, "tab closed");
            Ok(())
        })
    }

    /// Activate a tab and focus its pane
    pub fn set_active_tab(&mut self, key: &WorkspaceKey, pane: PaneId, tab_id: &TabId) -> Result<()> {
        self.rollback_on_error(key, |store| {
            if !store.pane_mut(key, pane).set_active(tab_id) {
                return store.missing(ChamberError::tab_not_found(tab_id, pane));
            }
            store.focus(pane);
            Ok(())
        })
    }

    pub fn update_tab_title(
        &mut self,
        key: &WorkspaceKey,
        pane: PaneId,
        tab_id: &TabId,
        title: impl Into<String>,
    ) -> Result<()> {
        let title = title.into();
        self.rollback_on_error(key, |store| {
            if !store.pane_ref(key, pane).contains(tab_id) {
                return store.missing(ChamberError::tab_not_found(tab_id, pane));
            }

            let changed = match store.registry.tab_mut(tab_id) {
                Some(tab) if tab.title != title => {
                    tab.title = title;
                    true
                }
                _ => false,
            };
            if changed {
                store.pane_mut(key, pane).touch();
            }
            Ok(())
        })
    }

    /// Shallow-merge `patch` into a tab's metadata
    pub fn update_tab_metadata(
        &mut self,
        key: &WorkspaceKey,
        pane: PaneId,
        tab_id: &TabId,
        patch: Map<String, Value>,
    ) -> Result<()> {
        self.rollback_on_error(key, |store| {
            if !store.pane_ref(key, pane).contains(tab_id) {
                return store.missing(ChamberError::tab_not_found(tab_id, pane));
            }

            let changed = store
                .registry
                .tab_mut(tab_id)
                .is_some_and(|tab| tab.merge_metadata(patch));
            if changed {
                store.pane_mut(key, pane).touch();
            }
            Ok(())
        })
    }

    /// Move a tab to `target` at `index` (end when `None`, clamped otherwise)
    ///
    /// The tab becomes active in `target` and `target` gets focus. The source
    /// pane re-selects by the same neighbour rule as [`Self::close_tab`].
    pub fn move_tab(
        &mut self,
        key: &WorkspaceKey,
        source: PaneId,
        target: PaneId,
        tab_id: &TabId,
        index: Option<usize>,
    ) -> Result<()> {
        self.rollback_on_error(key, |store| {
            let panes = store.registry.ensure(key, now_ms());
            if panes.pane_mut(source).remove(tab_id).is_none() {
                return store.missing(ChamberError::tab_not_found(tab_id, source));
            }
            panes.pane_mut(target).insert(index, tab_id.clone());
            store.focus(target);

            tracing::debug!(workspace = %key, from = %source, to = %target, %tab_id, "tab moved");
            Ok(())
        })
    }

    /// Move `source_id` into the slot `target_id` holds once `source_id` is
    /// taken out
    pub fn reorder_tabs(
        &mut self,
        key: &WorkspaceKey,
        pane: PaneId,
        source_id: &TabId,
        target_id: &TabId,
    ) -> Result<()> {
        if source_id == target_id {
            return Ok(());
        }

        self.rollback_on_error(key, |store| {
            let state = store.pane_ref(key, pane);
            let missing = [source_id, target_id]
                .into_iter()
                .find(|id| !state.contains(id))
                .cloned();
            if let Some(id) = missing {
                return store.missing(ChamberError::tab_not_found(&id, pane));
            }

            store.pane_mut(key, pane).reorder(source_id, target_id);
            Ok(())
        })
    }

    /// First chat tab bound to `session_id`, searching left then right
    pub fn find_tab_by_session_id(&self, key: &WorkspaceKey, session_id: &str) -> Option<(PaneId, &Tab)> {
        let panes = self.registry.get(key)?;
        PaneId::ALL.into_iter().find_map(|pane| {
            self.registry
                .resolve(panes.pane(pane))
                .find(|tab| tab.is_chat_for(session_id))
                .map(|tab| (pane, tab))
        })
    }

    /// Focus the chat tab for `session_id`, creating it in `pane` if the
    /// workspace has none
    pub fn open_chat_session(
        &mut self,
        key: &WorkspaceKey,
        pane: PaneId,
        session_id: &str,
        title: Option<&str>,
    ) -> Result<TabId> {
        self.ensure_workspace(key);

        let existing = self
            .find_tab_by_session_id(key, session_id)
            .map(|(pane, tab)| (pane, tab.id.clone()));

        match existing {
            Some((owner, id)) => {
                self.set_active_tab(key, owner, &id)?;
                Ok(id)
            }
            None => {
                let title = title.unwrap_or_else(|| TabType::Chat.default_title());
                self.add_tab(key, pane, TabDraft::chat(session_id, title))
            }
        }
    }

    /// Activate the tab at `index` in the focused pane
    pub fn activate_tab_by_index(&mut self, key: &WorkspaceKey, index: usize) -> Result<()> {
        let pane = self.focused_pane;
        self.rollback_on_error(key, |store| {
            let state = store.pane_ref(key, pane);
            match state.tab_at(index).cloned() {
                Some(id) => store.set_active_tab(key, pane, &id),
                None => {
                    let len = state.len();
                    store.missing(ChamberError::IndexOutOfRange { index, len })
                }
            }
        })
    }

    /// Close the active tab of the focused pane, if there is one
    pub fn close_active_tab(&mut self, key: &WorkspaceKey) -> Result<()> {
        let pane = self.focused_pane;
        match self.pane_ref(key, pane).active_tab_id().cloned() {
            Some(id) => self.close_tab(key, pane, &id),
            None => Ok(()),
        }
    }

    /// Apply a finished drag
    ///
    /// Dropping on a tab in the same pane reorders. Anything else moves the
    /// tab; dropping on a tab in the other pane inserts at that tab's index.
    pub fn apply_drop(&mut self, key: &WorkspaceKey, payload: &DragPayload, target: &DropTarget) -> Result<()> {
        let source = payload.source_pane;
        self.rollback_on_error(key, |store| match target {
            DropTarget::Tab { pane, tab_id } if *pane == source => {
                store.reorder_tabs(key, source, &payload.tab_id, tab_id)
            }
            DropTarget::Tab { pane, tab_id } => {
                let index = store.pane_ref(key, *pane).position(tab_id);
                store.move_tab(key, source, *pane, &payload.tab_id, index)
            }
            DropTarget::Pane { pane, index } => {
                store.move_tab(key, source, *pane, &payload.tab_id, *index)
            }
        })
    }

    // ========== Global UI state ==========

    /// Give a pane keyboard focus
    pub fn set_focused_pane(&mut self, pane: PaneId) {
        self.focus(pane);
    }

    pub fn toggle_right_pane(&mut self) {
        let visible = !self.right_pane_visible;
        self.set_right_pane_visible(visible);
    }

    pub fn set_right_pane_visible(&mut self, visible: bool) {
        if self.right_pane_visible != visible {
            self.right_pane_visible = visible;
            self.ui_version += 1;
            self.ui_layout_changes += 1;
        }
    }

    /// Set the right pane width, clamped to `[280, 800]`; returns the stored width
    pub fn set_right_pane_width(&mut self, width: i64) -> u32 {
        let width = clamp_right_pane_width(width);
        if self.right_pane_width != width {
            self.right_pane_width = width;
            self.ui_version += 1;
            self.ui_layout_changes += 1;
        }
        width
    }
}
