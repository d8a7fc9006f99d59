//! Persistence of per-monitor tiling records.
//!
//! The core never touches disk on its own schedule; the orchestrator hands
//! records to a [`StateStore`] when monitors disconnect or tiling stops and
//! asks for them back when a monitor reappears. Stale window ids inside a
//! restored record are harmless: they simply never match a live window.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::collections::HashMap;
use crate::common::error::Error;
use crate::model::layout::LayoutId;
use crate::model::monitor::{LayoutMemory, MonitorTilingState, OrientationMemory};
use crate::sys::screen::MonitorId;

/// Everything worth keeping about one monitor's tiling: the active layout,
/// the per-layout window→container memory, and the accordion direction per
/// container position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub active_layout: LayoutId,
    pub layout_memory: LayoutMemory,
    pub orientation_memory: OrientationMemory,
}

impl MonitorTilingState {
    /// Snapshot for persistence, with the live assignment folded into the
    /// memory under the active layout.
    pub fn to_record(&self) -> MonitorRecord {
        let mut layout_memory = self.layout_memory().clone();
        layout_memory.insert(
            self.active_layout,
            self.containers().iter().map(|c| c.windows().to_vec()).collect(),
        );
        let mut orientation_memory = self.orientation_memory().clone();
        orientation_memory.insert(
            self.active_layout,
            self.containers().iter().map(|c| c.orientation).collect(),
        );
        MonitorRecord {
            active_layout: self.active_layout,
            layout_memory,
            orientation_memory,
        }
    }

    pub fn from_record(monitor_id: MonitorId, record: &MonitorRecord) -> MonitorTilingState {
        let mut state = MonitorTilingState::new(monitor_id);
        state.active_layout = record.active_layout;
        state.restore_memories(record.layout_memory.clone(), record.orientation_memory.clone());
        state
    }
}

/// The state-persistence collaborator.
pub trait StateStore: Send + Sync {
    fn load(&self, monitor: MonitorId) -> Option<MonitorRecord>;
    fn save(&self, monitor: MonitorId, record: &MonitorRecord);
    fn remove(&self, monitor: MonitorId);
}

/// Keeps nothing. Used by tests and by hosts that manage persistence
/// themselves.
#[derive(Default)]
pub struct NullStore;

impl StateStore for NullStore {
    fn load(&self, _monitor: MonitorId) -> Option<MonitorRecord> { None }

    fn save(&self, _monitor: MonitorId, _record: &MonitorRecord) {}

    fn remove(&self, _monitor: MonitorId) {}
}

/// JSON file store: one file holding every monitor's record. Load and save
/// failures are logged, never surfaced to tiling.
pub struct FileStore {
    path: PathBuf,
    records: parking_lot::Mutex<HashMap<u64, MonitorRecord>>,
}

impl FileStore {
    /// Opens (or initializes) the store at `path`.
    pub fn open(path: PathBuf) -> Result<FileStore, Error> {
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::default(),
            Err(source) => return Err(Error::StateRead { path, source }),
        };
        Ok(FileStore {
            path,
            records: parking_lot::Mutex::new(records),
        })
    }

    /// The conventional location under the platform data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("concertina").join("state.json"))
    }

    fn flush(&self, records: &HashMap<u64, MonitorRecord>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::StateWrite {
                path: self.path.clone(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, contents).map_err(|source| Error::StateWrite {
            path: self.path.clone(),
            source,
        })
    }
}

impl StateStore for FileStore {
    fn load(&self, monitor: MonitorId) -> Option<MonitorRecord> {
        self.records.lock().get(&monitor.get()).cloned()
    }

    fn save(&self, monitor: MonitorId, record: &MonitorRecord) {
        let mut records = self.records.lock();
        records.insert(monitor.get(), record.clone());
        if let Err(err) = self.flush(&records) {
            warn!(%monitor, %err, "failed to persist tiling state");
        } else {
            debug!(%monitor, "persisted tiling state");
        }
    }

    fn remove(&self, monitor: MonitorId) {
        let mut records = self.records.lock();
        if records.remove(&monitor.get()).is_some() {
            if let Err(err) = self.flush(&records) {
                warn!(%monitor, %err, "failed to persist tiling state");
            }
        }
    }
}
