//! Drag-and-drop messages
//!
//! A drag carries the tab identity from the source tab bar to wherever it is
//! dropped. Front ends encode the payload under [`TAB_DRAG_MIME`] and hand the
//! decoded message to [`WorkspaceStore::apply_drop`](super::WorkspaceStore::apply_drop).

use super::pane::PaneId;
use super::tab::{Tab, TabId};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Transfer type under which drag payloads are carried
pub const TAB_DRAG_MIME: &str = "application/x-openchamber-tab";

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub tab_id: TabId,

    pub source_pane: PaneId,

    /// Copy of the tab for drag previews; the store only trusts `tab_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<Tab>,
}

impl DragPayload {
    pub fn new(tab_id: TabId, source_pane: PaneId) -> Self {
        Self {
            tab_id,
            source_pane,
            tab: None,
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = Some(tab);
        self
    }

    /// Encode for a drag data transfer
    pub fn to_transfer_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a drag data transfer
    pub fn from_transfer_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Where a drag ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropTarget {
    /// A pane's tab bar, optionally at a position (end of the bar otherwise)
    #[serde(rename_all = "camelCase")]
    Pane {
        pane: PaneId,
        #[serde(default)]
        index: Option<usize>,
    },

    /// On top of another tab
    #[serde(rename_all = "camelCase")]
    Tab { pane: PaneId, tab_id: TabId },
}

impl DropTarget {
    pub fn pane(&self) -> PaneId {
        match self {
            DropTarget::Pane { pane, .. } | DropTarget::Tab { pane, .. } => *pane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tab::{TabDraft, TabType};

    #[test]
    fn test_transfer_string() {
        let tab = Tab::from_draft(TabDraft::new(TabType::Diff, "Diff"), 1);
        let payload = DragPayload::new(tab.id.clone(), PaneId::Left).with_tab(tab.clone());
        let data = payload.to_transfer_string().unwrap();
        assert!(data.contains("\"sourcePane\":\"left\""));

        let decoded = DragPayload::from_transfer_str(&data).unwrap();
        assert_eq!(decoded.tab_id, tab.id);
        assert_eq!(decoded.tab.as_ref().map(|t| t.title.as_str()), Some("Diff"));
    }

    #[test]
    fn test_garbage_transfer_is_error() {
        assert!(DragPayload::from_transfer_str("not json").is_err());
    }

    #[test]
    fn test_drop_target_json() {
        let target: DropTarget =
            serde_json::from_str(r#"{"kind":"tab","pane":"right","tabId":"git-1"}"#).unwrap();
        assert_eq!(
            target,
            DropTarget::Tab {
                pane: PaneId::Right,
                tab_id: TabId::from("git-1"),
            }
        );

        let target: DropTarget = serde_json::from_str(r#"{"kind":"pane","pane":"left"}"#).unwrap();
        assert_eq!(target.pane(), PaneId::Left);
    }
}
