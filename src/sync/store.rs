//! Remote key-value store holding one match record per match id.
//!
//! The store is opaque: whole documents are replaced, and every replace or
//! delete is pushed to subscribers. `MemoryStore` is an in-process
//! implementation used for hot-seat replication and tests.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::broadcast;

use crate::core::StoreError;

use super::dto::MatchStateDto;

/// Buffered events per subscriber before it starts lagging.
pub const EVENT_BUFFER: usize = 64;

/// Change pushed to subscribers of a match record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// The record was replaced.
    Updated(Box<MatchStateDto>),
    /// The record was deleted.
    Removed,
}

/// A shared document store keyed by match id.
pub trait RemoteStore: Send + Sync + 'static {
    /// Current record, if one exists.
    fn fetch(&self, match_id: &str) -> Result<Option<MatchStateDto>, StoreError>;

    /// Replace the whole record.
    fn replace(&self, match_id: &str, record: &MatchStateDto) -> Result<(), StoreError>;

    /// Delete the record.
    fn remove(&self, match_id: &str) -> Result<(), StoreError>;

    /// Receive every later change to the record.
    fn subscribe(&self, match_id: &str) -> Result<broadcast::Receiver<StoreEvent>, StoreError>;
}

struct Entry {
    /// Encoded document; `None` until first written or after removal.
    document: Option<Vec<u8>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Entry {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            document: None,
            events,
        }
    }
}

/// In-process store. Documents are held in their bincode encoding.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, Entry>>,
    offline: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection to the store.
    pub fn set_available(&self, available: bool) {
        *self.offline.lock() = !available;
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if *self.offline.lock() {
            Err(StoreError::Unavailable("store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl RemoteStore for MemoryStore {
    fn fetch(&self, match_id: &str) -> Result<Option<MatchStateDto>, StoreError> {
        self.ensure_online()?;
        let entries = self.entries.lock();
        match entries.get(match_id).and_then(|e| e.document.as_deref()) {
            Some(bytes) => MatchStateDto::from_bytes(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn replace(&self, match_id: &str, record: &MatchStateDto) -> Result<(), StoreError> {
        self.ensure_online()?;
        let bytes = record.to_bytes()?;
        let mut entries = self.entries.lock();
        let entry = entries.entry(match_id.to_string()).or_insert_with(Entry::new);
        entry.document = Some(bytes);
        // no subscribers is fine
        let _ = entry.events.send(StoreEvent::Updated(Box::new(record.clone())));
        Ok(())
    }

    fn remove(&self, match_id: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut entries = self.entries.lock();
        let entry = entries
            .get_mut(match_id)
            .filter(|e| e.document.is_some())
            .ok_or_else(|| StoreError::RecordMissing(match_id.to_string()))?;
        entry.document = None;
        let _ = entry.events.send(StoreEvent::Removed);
        Ok(())
    }

    fn subscribe(&self, match_id: &str) -> Result<broadcast::Receiver<StoreEvent>, StoreError> {
        self.ensure_online()?;
        let mut entries = self.entries.lock();
        let entry = entries.entry(match_id.to_string()).or_insert_with(Entry::new);
        Ok(entry.events.subscribe())
    }
}
