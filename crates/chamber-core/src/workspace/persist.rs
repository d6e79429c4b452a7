//! Debounced background persistence
//!
//! Callers hand over layout snapshots and move on. A worker thread keeps only
//! the newest one and writes it once no new snapshot has arrived for the
//! debounce interval. Write failures are logged, never returned.

use super::storage::{LayoutStorage, PersistedLayout};
use crate::error::{ChamberError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

enum PersistMsg {
    Save(PersistedLayout),
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the persistence worker
pub struct Persister {
    tx: Sender<PersistMsg>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    /// Start the worker thread
    pub fn spawn(storage: LayoutStorage, debounce: Duration) -> Result<Self> {
        let (tx, rx) = bounded(64);
        let worker = std::thread::Builder::new()
            .name("layout-persist".into())
            .spawn(move || run(storage, debounce, rx))?;

        Ok(Self {
            tx,
            worker: Some(worker),
        })
    }

    /// Queue a snapshot for writing
    pub fn schedule(&self, layout: PersistedLayout) {
        if let Err(e) = self.tx.send(PersistMsg::Save(layout)) {
            tracing::warn!(error = %e, "layout persistence worker is gone");
        }
    }

    /// Write any pending snapshot now and wait for it
    pub fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.tx.send(PersistMsg::Flush(ack_tx))?;
        ack_rx
            .recv()
            .map_err(|e| ChamberError::channel(format!("Flush not acknowledged: {}", e)))
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        let _ = self.tx.send(PersistMsg::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run(storage: LayoutStorage, debounce: Duration, rx: Receiver<PersistMsg>) {
    let mut pending: Option<PersistedLayout> = None;

    loop {
        let msg = if pending.is_some() {
            match rx.recv_timeout(debounce) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => {
                    write(&storage, pending.take());
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    write(&storage, pending.take());
                    break;
                }
            }
        } else {
            match rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            }
        };

        match msg {
            PersistMsg::Save(layout) => pending = Some(layout),
            PersistMsg::Flush(ack) => {
                write(&storage, pending.take());
                let _ = ack.send(());
            }
            PersistMsg::Shutdown => {
                write(&storage, pending.take());
                break;
            }
        }
    }
}

fn write(storage: &LayoutStorage, layout: Option<PersistedLayout>) {
    let Some(layout) = layout else {
        return;
    };
    if let Err(e) = storage.save(&layout) {
        tracing::warn!(path = %storage.path().display(), error = %e, "failed to persist layout");
    }
}
