//! Chamber Core - Pane/tab workspace model for OpenChamber
//!
//! This crate provides the UI-agnostic layout state:
//! - Per-workspace left/right panes of ordered, typed tabs
//! - Tab operations (add, close, activate, move, reorder, drag-and-drop)
//! - Chat tab lookup by session id
//! - Debounced layout persistence
//! - Configuration loading
//!
//! Front ends either hold a [`WorkspaceStore`] directly or drive a
//! [`WorkspaceService`] through commands.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   Command     ┌──────────────────┐
//! │   Any UI          │ ─────────────→│   chamber-core   │
//! │ (Web, TUI, CLI)   │               │ WorkspaceService │
//! │                   │ ←─────────────│                  │
//! └───────────────────┘  Notification └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chamber_core::{ChamberConfig, Command, Notification, PaneId, WorkspaceService};
//!
//! let service = WorkspaceService::with_storage(&ChamberConfig::default(), None)?;
//! service.send(Command::open_chat("/home/me/project", PaneId::Right, "ses_1"))?;
//!
//! while let Some(notif) = service.poll_notification() {
//!     if let Notification::TabOpened { tab_id, .. } = notif {
//!         println!("opened {}", tab_id);
//!     }
//! }
//! # Ok::<(), chamber_core::ChamberError>(())
//! ```

// Public API modules
pub mod commands;
pub mod error;
pub mod notifications;

pub mod config;

// Pane/tab model
pub mod workspace;

// Re-export commonly used types
pub use commands::Command;
pub use error::{ChamberError, Result};
pub use notifications::Notification;

pub use config::{ChamberConfig, LayoutConfig, PersistenceConfig};

pub use workspace::{
    DragPayload, DropTarget, LayoutStorage, PaneId, PaneView, Tab, TabDraft, TabId, TabType,
    WorkspaceHandle, WorkspaceKey, WorkspaceStore,
};

// Main service facade
pub mod service;
pub use service::WorkspaceService;

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
