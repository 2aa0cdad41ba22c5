//! JSON-file-backed collection store.
//!
//! The whole store is one JSON document holding named collections of
//! records, read into memory on open and rewritten through a temp-file
//! rename on every mutation. An internal lock serializes writers, and the
//! single-record `append`/`remove_where` primitives do their
//! read-modify-write under that lock, so concurrent callers cannot clobber
//! each other's inserts the way wholesale rewrites can. Wholesale `set`
//! remains available (last writer wins) alongside a compare-and-set
//! variant keyed on the per-collection version counter.
//!
//! Every successful write broadcasts a [`CollectionChanged`] event.
//! Delivery is fire-and-forget: closed or lagging subscribers miss it.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard, broadcast};
use tracing::{debug, info};

use crate::domain::events::CollectionChanged;

/// Collection key for wardrobe items.
pub const WARDROBE_COLLECTION: &str = "wardrobe";

/// Collection key for outfits.
pub const OUTFITS_COLLECTION: &str = "outfits";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("version conflict on '{collection}': expected {expected}, found {actual}")]
    VersionConflict {
        collection: String,
        expected: u64,
        actual: u64,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    collections: HashMap<String, CollectionState>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CollectionState {
    /// Bumped on every write; `0` means never written.
    version: u64,
    records: Vec<Value>,
}

/// Persistent store of named record collections.
pub struct CollectionStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
    events: broadcast::Sender<CollectionChanged>,
}

impl CollectionStore {
    /// Open the store at `path`, loading existing contents when present.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let state = if fs::try_exists(&path).await? {
            let raw = fs::read_to_string(&path).await?;
            serde_json::from_str(&raw)?
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            StoreFile::default()
        };
        info!("collection store opened at {}", path.display());

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            state: Mutex::new(state),
            events,
        })
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChanged> {
        self.events.subscribe()
    }

    /// Whole-collection read. Unknown collections read as empty.
    pub async fn get(&self, collection: &str) -> Vec<Value> {
        let guard = self.state.lock().await;
        guard
            .collections
            .get(collection)
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    /// Current version of a collection (`0` when never written).
    pub async fn version(&self, collection: &str) -> u64 {
        let guard = self.state.lock().await;
        guard
            .collections
            .get(collection)
            .map_or(0, |state| state.version)
    }

    /// Wholesale replace; last writer wins. Returns the new version.
    pub async fn set(&self, collection: &str, records: Vec<Value>) -> StoreResult<u64> {
        let mut guard = self.state.lock().await;
        let state = guard.collections.entry(collection.to_string()).or_default();
        state.records = records;
        self.commit(guard, collection).await
    }

    /// Wholesale replace that refuses stale writers.
    pub async fn set_if_version(
        &self,
        collection: &str,
        records: Vec<Value>,
        expected: u64,
    ) -> StoreResult<u64> {
        let mut guard = self.state.lock().await;
        let state = guard.collections.entry(collection.to_string()).or_default();
        if state.version != expected {
            return Err(StoreError::VersionConflict {
                collection: collection.to_string(),
                expected,
                actual: state.version,
            });
        }
        state.records = records;
        self.commit(guard, collection).await
    }

    /// Atomically add one record.
    pub async fn append(&self, collection: &str, record: Value) -> StoreResult<u64> {
        let mut guard = self.state.lock().await;
        let state = guard.collections.entry(collection.to_string()).or_default();
        state.records.push(record);
        self.commit(guard, collection).await
    }

    /// Atomically remove every record matching the predicate, preserving
    /// the order of the remainder. Returns (removed count, new version);
    /// a no-match removal does not bump the version or notify.
    pub async fn remove_where<F>(&self, collection: &str, predicate: F) -> StoreResult<(usize, u64)>
    where
        F: Fn(&Value) -> bool,
    {
        let mut guard = self.state.lock().await;
        let state = guard.collections.entry(collection.to_string()).or_default();
        let before = state.records.len();
        state.records.retain(|record| !predicate(record));
        let removed = before - state.records.len();
        if removed == 0 {
            let version = state.version;
            return Ok((0, version));
        }
        let version = self.commit(guard, collection).await?;
        Ok((removed, version))
    }

    /// Bump the version, rewrite the file, notify subscribers.
    async fn commit(
        &self,
        mut guard: MutexGuard<'_, StoreFile>,
        collection: &str,
    ) -> StoreResult<u64> {
        let state = guard.collections.entry(collection.to_string()).or_default();
        state.version += 1;
        let version = state.version;
        let count = state.records.len();

        let snapshot = serde_json::to_string_pretty(&*guard)?;
        self.write_atomic(&snapshot).await?;
        drop(guard);

        debug!("collection '{collection}' committed at version {version} ({count} records)");
        let _ = self.events.send(CollectionChanged {
            collection: collection.to_string(),
            version,
            count,
        });
        Ok(version)
    }

    /// Durable write: temp file in the same directory, then rename over.
    async fn write_atomic(&self, contents: &str) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
