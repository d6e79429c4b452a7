//! Pane/tab workspace model
//!
//! Every project directory (or the global workspace when none is selected)
//! gets a left and a right pane, each an ordered list of tabs with one active
//! tab. The store also tracks which pane has focus and the right pane's
//! visibility and width, shared across workspaces.
//!
//! # Architecture
//!
//! ```text
//! WorkspaceStore
//!     │
//!     ├── WorkspaceRegistry
//!     │   ├── HashMap<WorkspaceKey, WorkspacePanes>   (left/right PaneState)
//!     │   └── HashMap<TabId, Tab>                     (tab arena)
//!     │
//!     ├── focused pane / right pane visibility + width
//!     │
//!     └── snapshot() ──→ Persister ──→ LayoutStorage (layout.json)
//! ```
//!
//! # Example
//!
//! ```
//! use chamber_core::workspace::{PaneId, TabDraft, WorkspaceStore};
//!
//! let mut store = WorkspaceStore::new();
//! let mut ws = store.workspace("/home/me/project");
//!
//! let chat = ws.open_chat_session(PaneId::Left, "session-1", Some("Fix tests")).unwrap();
//! ws.move_tab(PaneId::Left, PaneId::Right, &chat, None).unwrap();
//!
//! assert_eq!(ws.right().active_tab_id, Some(chat));
//! assert_eq!(ws.focused_pane(), PaneId::Right);
//! ```

mod accessor;
mod drag;
mod pane;
mod persist;
mod registry;
mod storage;
mod store;
mod tab;

pub use accessor::{PaneView, WorkspaceHandle};
pub use drag::{DragPayload, DropTarget, TAB_DRAG_MIME};
pub use pane::{PaneId, PaneState};
pub use persist::Persister;
pub use registry::{WorkspaceKey, WorkspacePanes, WorkspaceRegistry, GLOBAL_WORKSPACE_KEY};
pub use storage::{LayoutStorage, PersistedLayout, PersistedPane, PersistedWorkspace};
pub use store::{
    clamp_right_pane_width, WorkspaceStore, DEFAULT_RIGHT_PANE_WIDTH, RIGHT_PANE_MAX_WIDTH,
    RIGHT_PANE_MIN_WIDTH,
};
pub use tab::{default_tabs, now_ms, Tab, TabDraft, TabId, TabType};
