//! Notifications that the workspace service sends to any front end
//!
//! These report state changes after a command is applied. They are
//! serializable for front ends in another process.

use crate::workspace::{PaneId, PaneView, TabId, WorkspaceKey};
use serde::{Deserialize, Serialize};

/// Notifications that the service sends to the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Notification {
    /// A tab was created or re-focused by `AddTab` / `OpenChatSession`
    TabOpened {
        workspace: WorkspaceKey,
        pane: PaneId,
        tab_id: TabId,
    },

    /// A pane's tabs or active tab changed
    PaneChanged {
        workspace: WorkspaceKey,
        view: PaneView,
    },

    /// Focused pane or right pane visibility/width changed
    UiChanged {
        focused_pane: PaneId,
        right_pane_visible: bool,
        right_pane_width: u32,
    },

    /// Result of a session lookup
    SessionTab {
        workspace: WorkspaceKey,
        session_id: String,

        /// Owning pane and tab, absent when no chat tab is bound
        found: Option<(PaneId, TabId)>,
    },

    /// Full state of one workspace (in response to GetSnapshot/EnsureWorkspace)
    Snapshot {
        workspace: WorkspaceKey,
        left: PaneView,
        right: PaneView,
        focused_pane: PaneId,
        right_pane_visible: bool,
        right_pane_width: u32,
    },

    /// Layout written to disk (in response to Flush)
    Persisted,

    /// A command could not be applied
    Error {
        /// Error message
        message: String,
    },
}

impl Notification {
    /// Create an error notification
    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_tag() {
        let json = serde_json::to_string(&Notification::error("boom")).unwrap();
        assert!(json.contains("\"type\":\"Error\""));
        assert!(json.contains("boom"));
    }

    #[test]
    fn test_session_tab_json() {
        let notif = Notification::SessionTab {
            workspace: WorkspaceKey::from("p"),
            session_id: "s1".into(),
            found: Some((PaneId::Right, TabId::from("chat-x"))),
        };
        let value = serde_json::to_value(&notif).unwrap();
        assert_eq!(value["found"][0], "right");
        assert_eq!(value["found"][1], "chat-x");
        assert_eq!(value["sessionId"], "s1");
    }
}
