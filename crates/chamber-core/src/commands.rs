//! Commands that any front end can send to the workspace service
//!
//! These mirror the store operations one-to-one. They are serializable so a
//! front end in another process can drive the store over JSON.

use crate::workspace::{DragPayload, DropTarget, PaneId, TabDraft, TabId, WorkspaceKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Commands that a front end sends to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Command {
    /// Create the workspace if needed and report its panes
    EnsureWorkspace { workspace: WorkspaceKey },

    /// Append a tab to a pane and activate it
    AddTab {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab: TabDraft,
    },

    /// Close a tab
    CloseTab {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab_id: TabId,
    },

    /// Activate a tab (also focuses its pane)
    SetActiveTab {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab_id: TabId,
    },

    /// Rename a tab
    UpdateTabTitle {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab_id: TabId,
        title: String,
    },

    /// Shallow-merge keys into a tab's metadata
    UpdateTabMetadata {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab_id: TabId,
        metadata: Map<String, Value>,
    },

    /// Move a tab between panes
    MoveTab {
        workspace: WorkspaceKey,
        source_pane: PaneId,
        target_pane: PaneId,
        tab_id: TabId,

        /// Insert position in the target pane; end of the pane when absent
        #[serde(default)]
        index: Option<usize>,
    },

    /// Drag one tab onto another within a pane
    ReorderTabs {
        workspace: WorkspaceKey,
        pane: PaneId,
        source_id: TabId,
        target_id: TabId,
    },

    /// A finished drag-and-drop gesture
    DropTab {
        workspace: WorkspaceKey,
        payload: DragPayload,
        target: DropTarget,
    },

    /// Focus the chat tab for a session, opening one if needed
    OpenChatSession {
        workspace: WorkspaceKey,
        pane: PaneId,
        session_id: String,
        #[serde(default)]
        title: Option<String>,
    },

    /// Look up the chat tab for a session
    FindTabBySession {
        workspace: WorkspaceKey,
        session_id: String,
    },

    /// Activate the n-th tab of the focused pane
    ActivateTabByIndex { workspace: WorkspaceKey, index: usize },

    /// Close the active tab of the focused pane
    CloseActiveTab { workspace: WorkspaceKey },

    /// Give a pane keyboard focus
    FocusPane { pane: PaneId },

    /// Show or hide the right pane
    ToggleRightPane,

    /// Resize the right pane (clamped)
    SetRightPaneWidth { width: i64 },

    /// Report the full state of a workspace
    GetSnapshot { workspace: WorkspaceKey },

    /// Write the layout to disk now
    Flush,
}

impl Command {
    /// Workspace the command is scoped to, if any
    pub fn workspace(&self) -> Option<&WorkspaceKey> {
        match self {
            Command::EnsureWorkspace { workspace }
            | Command::AddTab { workspace, .. }
            | Command::CloseTab { workspace, .. }
            | Command::SetActiveTab { workspace, .. }
            | Command::UpdateTabTitle { workspace, .. }
            | Command::UpdateTabMetadata { workspace, .. }
            | Command::MoveTab { workspace, .. }
            | Command::ReorderTabs { workspace, .. }
            | Command::DropTab { workspace, .. }
            | Command::OpenChatSession { workspace, .. }
            | Command::FindTabBySession { workspace, .. }
            | Command::ActivateTabByIndex { workspace, .. }
            | Command::CloseActiveTab { workspace }
            | Command::GetSnapshot { workspace } => Some(workspace),
            Command::FocusPane { .. }
            | Command::ToggleRightPane
            | Command::SetRightPaneWidth { .. }
            | Command::Flush => None,
        }
    }

    /// Open a chat tab for `session_id` in `workspace`
    pub fn open_chat(workspace: impl Into<WorkspaceKey>, pane: PaneId, session_id: impl Into<String>) -> Self {
        Command::OpenChatSession {
            workspace: workspace.into(),
            pane,
            session_id: session_id.into(),
            title: None,
        }
    }
}
