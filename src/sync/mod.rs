//! Coordination of local intents, remote replicas and timers.
//!
//! - `coordinator`: the turn-ownership protocol and serialization window
//! - `transport`: local or store-replicated publication of commits
//! - `store`: the remote record interface and an in-process store
//! - `dto`: serializable form of the match record
//! - `observer`: presentation and statistics hooks
//! - `timer`: cancellable one-shot timers

pub mod coordinator;
pub mod dto;
pub mod observer;
pub mod store;
pub mod timer;
pub mod transport;

pub use coordinator::{
    Coordinator, CoordinatorBuilder, CoordinatorConfig, CoordinatorPhase, Submission,
};
pub use dto::{MatchSnapshot, MatchStateDto, SeatIdentity};
pub use observer::{
    ChannelObserver, MatchObserver, NullObserver, NullStats, ObserverEvent, StatsReporter,
    TerminationReason,
};
pub use store::{MemoryStore, RemoteStore, StoreEvent};
pub use timer::{sleep_or_cancel, OneShotTimer};
pub use transport::{LocalTransport, ReplicatedTransport, Transport};
