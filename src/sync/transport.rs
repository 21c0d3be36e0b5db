//! Where committed states go.
//!
//! - `LocalTransport`: single-device play, nothing leaves the process
//! - `ReplicatedTransport`: every commit replaces the record in a
//!   [`RemoteStore`] and remote changes arrive through a subscription

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::core::StoreError;

use super::dto::MatchStateDto;
use super::store::{RemoteStore, StoreEvent};

/// Publication channel for committed states.
pub trait Transport: Send + Sync + 'static {
    /// Publish a committed state.
    fn publish(&self, record: &MatchStateDto) -> Result<(), StoreError>;

    /// Current shared record, if the transport has one.
    fn fetch(&self) -> Result<Option<MatchStateDto>, StoreError>;

    /// Remote changes, or `None` when nothing is shared.
    fn subscribe(&self) -> Result<Option<broadcast::Receiver<StoreEvent>>, StoreError>;

    fn is_replicated(&self) -> bool;
}

/// Single-device transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTransport;

impl Transport for LocalTransport {
    fn publish(&self, _record: &MatchStateDto) -> Result<(), StoreError> {
        Ok(())
    }

    fn fetch(&self) -> Result<Option<MatchStateDto>, StoreError> {
        Ok(None)
    }

    fn subscribe(&self) -> Result<Option<broadcast::Receiver<StoreEvent>>, StoreError> {
        Ok(None)
    }

    fn is_replicated(&self) -> bool {
        false
    }
}

/// Transport backed by a shared store record.
pub struct ReplicatedTransport<S: RemoteStore> {
    store: Arc<S>,
    match_id: String,
}

impl<S: RemoteStore> ReplicatedTransport<S> {
    pub fn new(store: Arc<S>, match_id: impl Into<String>) -> Self {
        Self {
            store,
            match_id: match_id.into(),
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }
}

impl<S: RemoteStore> Transport for ReplicatedTransport<S> {
    fn publish(&self, record: &MatchStateDto) -> Result<(), StoreError> {
        self.store.replace(&self.match_id, record)
    }

    fn fetch(&self) -> Result<Option<MatchStateDto>, StoreError> {
        self.store.fetch(&self.match_id)
    }

    fn subscribe(&self) -> Result<Option<broadcast::Receiver<StoreEvent>>, StoreError> {
        self.store.subscribe(&self.match_id).map(Some)
    }

    fn is_replicated(&self) -> bool {
        true
    }
}
