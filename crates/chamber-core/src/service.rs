//! WorkspaceService - command-driven facade over the store
//!
//! Front ends that do not want to hold the store directly send [`Command`]s
//! and poll [`Notification`]s. The service restores the layout on start,
//! reports only real changes (by comparing version counters before and after
//! each command) and schedules persistence when the persisted layout moved.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   Command     ┌──────────────────┐
//! │   Any front end   │ ─────────────→│ WorkspaceService │──→ Persister
//! │                   │ ←─────────────│  (store + lock)  │
//! └───────────────────┘  Notification └──────────────────┘
//! ```

use crate::commands::Command;
use crate::config::ChamberConfig;
use crate::error::{ChamberError, Result};
use crate::notifications::Notification;
use crate::workspace::{LayoutStorage, PaneId, PaneView, Persister, WorkspaceKey, WorkspaceStore};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{RwLock, RwLockReadGuard};

/// Versions observed around a command
struct Observed {
    panes: Option<(u64, u64)>,
    ui: u64,
    revision: u64,
}

/// Command/notification facade over a shared [`WorkspaceStore`]
pub struct WorkspaceService {
    store: RwLock<WorkspaceStore>,

    /// Background writer, absent when persistence is disabled
    persister: Option<Persister>,

    notification_tx: Sender<Notification>,

    notification_rx: Receiver<Notification>,
}

impl WorkspaceService {
    /// Create a service persisting to the configured layout path
    pub fn new(config: &ChamberConfig) -> Result<Self> {
        let storage = if config.persistence.enabled {
            let path = config
                .persistence
                .layout_path()
                .ok_or_else(|| ChamberError::config("Could not determine layout path"))?;
            Some(LayoutStorage::with_path(path))
        } else {
            None
        };
        Self::with_storage(config, storage)
    }

    /// Create with explicit storage (`None` keeps everything in memory)
    pub fn with_storage(config: &ChamberConfig, storage: Option<LayoutStorage>) -> Result<Self> {
        let store = match &storage {
            Some(storage) => match storage.try_load() {
                Ok(Some(layout)) => WorkspaceStore::from_layout(layout, config),
                Ok(None) => WorkspaceStore::from_config(config),
                Err(e) => {
                    tracing::warn!(path = %storage.path().display(), error = %e, "starting with default layout");
                    WorkspaceStore::from_config(config)
                }
            },
            None => WorkspaceStore::from_config(config),
        };

        let persister = match storage {
            Some(storage) => Some(Persister::spawn(storage, config.persistence.debounce())?),
            None => None,
        };

        let (notification_tx, notification_rx) = bounded(1000);

        Ok(Self {
            store: RwLock::new(store),
            persister,
            notification_tx,
            notification_rx,
        })
    }

    /// Read access to the store
    ///
    /// Mutations go through [`Self::send`] so they are reported and persisted.
    pub fn read(&self) -> RwLockReadGuard<'_, WorkspaceStore> {
        self.store.read()
    }

    /// Receiver for notifications
    pub fn notifications(&self) -> &Receiver<Notification> {
        &self.notification_rx
    }

    /// Next pending notification, if any
    pub fn poll_notification(&self) -> Option<Notification> {
        self.notification_rx.try_recv().ok()
    }

    /// Apply a command and emit the resulting notifications
    ///
    /// Errors from the store (strict mode) are reported as
    /// [`Notification::Error`]; only persistence flush failures are returned.
    pub fn send(&self, command: Command) -> Result<()> {
        let key = command.workspace().cloned();

        let mut store = self.store.write();
        let before = observe(&store, key.as_ref());
        let outcome = apply(&mut store, &command);
        let after = observe(&store, key.as_ref());

        match outcome {
            Ok(extra) => {
                if let Some(key) = &key {
                    self.emit_pane_changes(&store, key, &before, &after);
                }
                if after.ui != before.ui {
                    self.emit(Notification::UiChanged {
                        focused_pane: store.focused_pane(),
                        right_pane_visible: store.right_pane_visible(),
                        right_pane_width: store.right_pane_width(),
                    });
                }
                for notif in extra {
                    self.emit(notif);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "command rejected");
                self.emit(Notification::error(e.to_string()));
            }
        }

        if after.revision != before.revision {
            if let Some(persister) = &self.persister {
                persister.schedule(store.snapshot());
            }
        }
        drop(store);

        if matches!(command, Command::Flush) {
            self.flush()?;
            self.emit(Notification::Persisted);
        }

        Ok(())
    }

    /// Write any pending layout immediately
    pub fn flush(&self) -> Result<()> {
        match &self.persister {
            Some(persister) => persister.flush(),
            None => Ok(()),
        }
    }

    fn emit_pane_changes(&self, store: &WorkspaceStore, key: &WorkspaceKey, before: &Observed, after: &Observed) {
        let Some((left, right)) = after.panes else {
            return;
        };
        let changed = match before.panes {
            Some((l, r)) => [left != l, right != r],
            None => [true, true],
        };

        for (pane, changed) in PaneId::ALL.into_iter().zip(changed) {
            if !changed {
                continue;
            }
            if let Some(view) = store.pane_view(key, pane) {
                self.emit(Notification::PaneChanged {
                    workspace: key.clone(),
                    view,
                });
            }
        }
    }

    fn emit(&self, notification: Notification) {
        match self.notification_tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("notification queue full, dropping notification");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

fn observe(store: &WorkspaceStore, key: Option<&WorkspaceKey>) -> Observed {
    let panes = key.and_then(|key| {
        Some((
            store.pane_version(key, PaneId::Left)?,
            store.pane_version(key, PaneId::Right)?,
        ))
    });
    Observed {
        panes,
        ui: store.ui_version(),
        revision: store.layout_revision(),
    }
}

/// Run one command against the store, returning command-specific notifications
fn apply(store: &mut WorkspaceStore, command: &Command) -> Result<Vec<Notification>> {
    let mut extra = Vec::new();

    match command {
        Command::EnsureWorkspace { workspace } | Command::GetSnapshot { workspace } => {
            store.ensure_workspace(workspace);
            extra.push(snapshot(store, workspace));
        }
        Command::AddTab {
            workspace,
            pane,
            tab,
        } => {
            let tab_id = store.add_tab(workspace, *pane, tab.clone())?;
            extra.push(Notification::TabOpened {
                workspace: workspace.clone(),
                pane: *pane,
                tab_id,
            });
        }
        Command::CloseTab {
            workspace,
            pane,
            tab_id,
        } => store.close_tab(workspace, *pane, tab_id)?,
        Command::SetActiveTab {
            workspace,
            pane,
            tab_id,
        } => store.set_active_tab(workspace, *pane, tab_id)?,
        Command::UpdateTabTitle {
            workspace,
            pane,
            tab_id,
            title,
        } => store.update_tab_title(workspace, *pane, tab_id, title.clone())?,
        Command::UpdateTabMetadata {
            workspace,
            pane,
            tab_id,
            metadata,
        } => store.update_tab_metadata(workspace, *pane, tab_id, metadata.clone())?,
        Command::MoveTab {
            workspace,
            source_pane,
            target_pane,
            tab_id,
            index,
        } => store.move_tab(workspace, *source_pane, *target_pane, tab_id, *index)?,
        Command::ReorderTabs {
            workspace,
            pane,
            source_id,
            target_id,
        } => store.reorder_tabs(workspace, *pane, source_id, target_id)?,
        Command::DropTab {
            workspace,
            payload,
            target,
        } => store.apply_drop(workspace, payload, target)?,
        Command::OpenChatSession {
            workspace,
            pane,
            session_id,
            title,
        } => {
            let tab_id = store.open_chat_session(workspace, *pane, session_id, title.as_deref())?;
            let owner = store
                .panes(workspace)
                .and_then(|panes| panes.locate(&tab_id))
                .unwrap_or(*pane);
            extra.push(Notification::TabOpened {
                workspace: workspace.clone(),
                pane: owner,
                tab_id,
            });
        }
        Command::FindTabBySession {
            workspace,
            session_id,
        } => {
            store.ensure_workspace(workspace);
            let found = store
                .find_tab_by_session_id(workspace, session_id)
                .map(|(pane, tab)| (pane, tab.id.clone()));
            extra.push(Notification::SessionTab {
                workspace: workspace.clone(),
                session_id: session_id.clone(),
                found,
            });
        }
        Command::ActivateTabByIndex { workspace, index } => {
            store.activate_tab_by_index(workspace, *index)?
        }
        Command::CloseActiveTab { workspace } => store.close_active_tab(workspace)?,
        Command::FocusPane { pane } => store.set_focused_pane(*pane),
        Command::ToggleRightPane => store.toggle_right_pane(),
        Command::SetRightPaneWidth { width } => {
            store.set_right_pane_width(*width);
        }
        Command::Flush => {}
    }

    Ok(extra)
}

fn snapshot(store: &WorkspaceStore, key: &WorkspaceKey) -> Notification {
    let view = |pane| {
        store.pane_view(key, pane).unwrap_or_else(|| PaneView {
            pane,
            tabs: Vec::new(),
            active_tab_id: None,
            version: 0,
        })
    };
    Notification::Snapshot {
        workspace: key.clone(),
        left: view(PaneId::Left),
        right: view(PaneId::Right),
        focused_pane: store.focused_pane(),
        right_pane_visible: store.right_pane_visible(),
        right_pane_width: store.right_pane_width(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{TabDraft, TabId, TabType};
    use tempfile::TempDir;

    fn drain(service: &WorkspaceService) -> Vec<Notification> {
        std::iter::from_fn(|| service.poll_notification()).collect()
    }

    fn in_memory() -> WorkspaceService {
        WorkspaceService::with_storage(&ChamberConfig::default(), None).unwrap()
    }

    fn key() -> WorkspaceKey {
        WorkspaceKey::from("proj-a")
    }

    #[test]
    fn test_first_command_reports_both_panes() {
        let service = in_memory();
        service
            .send(Command::AddTab {
                workspace: key(),
                pane: PaneId::Left,
                tab: TabDraft::chat("s1", "Chat 1"),
            })
            .unwrap();

        let notifs = drain(&service);
        let changed: Vec<PaneId> = notifs
            .iter()
            .filter_map(|n| match n {
                Notification::PaneChanged { view, .. } => Some(view.pane),
                _ => None,
            })
            .collect();
        assert_eq!(changed, vec![PaneId::Left, PaneId::Right]);

        let opened = notifs.iter().find_map(|n| match n {
            Notification::TabOpened { tab_id, .. } => Some(tab_id.clone()),
            _ => None,
        });
        let left = notifs.iter().find_map(|n| match n {
            Notification::PaneChanged { view, .. } if view.pane == PaneId::Left => Some(view.clone()),
            _ => None,
        });
        let left = left.unwrap();
        assert_eq!(left.tabs.len(), 5);
        assert_eq!(left.active_tab_id, opened);
    }

    #[test]
    fn test_noop_command_reports_nothing() {
        let service = in_memory();
        service
            .send(Command::EnsureWorkspace { workspace: key() })
            .unwrap();
        drain(&service);

        service
            .send(Command::CloseTab {
                workspace: key(),
                pane: PaneId::Left,
                tab_id: TabId::from("ghost"),
            })
            .unwrap();
        assert!(drain(&service).is_empty());
    }

    #[test]
    fn test_strict_errors_become_notifications() {
        let mut config = ChamberConfig::default();
        config.strict = true;
        let service = WorkspaceService::with_storage(&config, None).unwrap();

        service
            .send(Command::ActivateTabByIndex {
                workspace: key(),
                index: 42,
            })
            .unwrap();
        let notifs = drain(&service);
        assert!(notifs
            .iter()
            .any(|n| matches!(n, Notification::Error { message } if message.contains("42"))));
    }

    #[test]
    fn test_strict_rejection_on_unseen_workspace_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let storage = LayoutStorage::with_path(dir.path().join("layout.json"));
        let mut config = ChamberConfig::default();
        config.strict = true;
        let service = WorkspaceService::with_storage(&config, Some(storage.clone())).unwrap();

        service
            .send(Command::CloseTab {
                workspace: WorkspaceKey::from("never-seen"),
                pane: PaneId::Left,
                tab_id: TabId::from("ghost"),
            })
            .unwrap();
        service.send(Command::Flush).unwrap();

        let notifs = drain(&service);
        assert!(matches!(notifs[0], Notification::Error { .. }));
        assert_eq!(notifs[1], Notification::Persisted);
        assert_eq!(notifs.len(), 2);
        assert!(service.read().registry().is_empty());
        assert!(storage.try_load().unwrap().is_none());
    }

    #[test]
    fn test_non_utf8_file_path_does_not_block_saves() {
        let dir = TempDir::new().unwrap();
        let storage = LayoutStorage::with_path(dir.path().join("layout.json"));
        let service =
            WorkspaceService::with_storage(&ChamberConfig::default(), Some(storage.clone())).unwrap();

        #[cfg(unix)]
        let odd = {
            use std::os::unix::ffi::OsStrExt;
            std::path::PathBuf::from(std::ffi::OsStr::from_bytes(b"/tmp/\xff.rs"))
        };
        #[cfg(not(unix))]
        let odd = std::path::PathBuf::from("/tmp/odd.rs");

        service
            .send(Command::AddTab {
                workspace: WorkspaceKey::from("a"),
                pane: PaneId::Left,
                tab: TabDraft::new(TabType::Files, "odd").with_file_path(&odd),
            })
            .unwrap();
        service
            .send(Command::open_chat("b", PaneId::Right, "s1"))
            .unwrap();
        service.send(Command::Flush).unwrap();

        let layout = storage.try_load().unwrap().unwrap();
        assert_eq!(layout.workspaces.len(), 2);
        assert_eq!(layout.workspaces[&WorkspaceKey::from("b")].right.tabs.len(), 1);
    }

    #[test]
    fn test_open_chat_twice_reports_same_tab() {
        let service = in_memory();
        for _ in 0..2 {
            service
                .send(Command::open_chat(key(), PaneId::Right, "s1"))
                .unwrap();
        }
        let opened: Vec<TabId> = drain(&service)
            .into_iter()
            .filter_map(|n| match n {
                Notification::TabOpened { tab_id, .. } => Some(tab_id),
                _ => None,
            })
            .collect();
        assert_eq!(opened.len(), 2);
        assert_eq!(opened[0], opened[1]);
    }

    #[test]
    fn test_ui_changes_reported() {
        let service = in_memory();
        service
            .send(Command::SetRightPaneWidth { width: 9999 })
            .unwrap();
        let notifs = drain(&service);
        assert_eq!(
            notifs,
            vec![Notification::UiChanged {
                focused_pane: PaneId::Left,
                right_pane_visible: true,
                right_pane_width: 800,
            }]
        );
    }

    #[test]
    fn test_find_tab_by_session() {
        let service = in_memory();
        service
            .send(Command::FindTabBySession {
                workspace: key(),
                session_id: "s1".into(),
            })
            .unwrap();
        let found = drain(&service).into_iter().find_map(|n| match n {
            Notification::SessionTab { found, .. } => Some(found),
            _ => None,
        });
        assert_eq!(found, Some(None));
    }

    #[test]
    fn test_layout_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layout.json");
        let config = ChamberConfig::default();

        let tab_id = {
            let service =
                WorkspaceService::with_storage(&config, Some(LayoutStorage::with_path(&path))).unwrap();
            service
                .send(Command::AddTab {
                    workspace: key(),
                    pane: PaneId::Right,
                    tab: TabDraft::new(TabType::Browser, "Docs").with_url("https://docs.rs"),
                })
                .unwrap();
            service.send(Command::ToggleRightPane).unwrap();
            service.send(Command::Flush).unwrap();
            assert!(drain(&service).contains(&Notification::Persisted));

            let store = service.read();
            let id = store.panes(&key()).unwrap().right.active_tab_id().cloned();
            id.unwrap()
        };

        let service =
            WorkspaceService::with_storage(&config, Some(LayoutStorage::with_path(&path))).unwrap();
        let store = service.read();
        assert!(!store.right_pane_visible());
        assert_eq!(store.tab(&tab_id).unwrap().url.as_deref(), Some("https://docs.rs"));
        assert_eq!(store.tabs_in(&key(), PaneId::Left).len(), 4);
    }

    #[test]
    fn test_corrupt_layout_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let service =
            WorkspaceService::with_storage(&ChamberConfig::default(), Some(LayoutStorage::with_path(&path)))
                .unwrap();
        assert!(service.read().registry().is_empty());
    }
}
