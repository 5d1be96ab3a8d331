//! Client-side synchronization between todo views and the REST resource.
//!
//! # Overview
//! [`TodoStore`] pairs the stateless `todo_core::TodoClient` with a
//! [`Transport`] that performs the I/O, and keeps one [`QueryCache`] per
//! resource shape (collection pages keyed by `ListParams`, single records
//! keyed by id).
//!
//! # Design
//! - Reads are coalesced per key; concurrent readers share one request.
//! - Mutations are confirmed by the server before anything changes locally,
//!   then invalidate every collection view and the touched record.
//! - Each mutation ends in exactly one [`Notification`].
//! - The caches belong to a store instance with an explicit
//!   `new`/`teardown` boundary.

pub mod cache;
pub mod config;
pub mod notify;
pub mod store;
pub mod transport;

pub use cache::{EntryState, QueryCache};
pub use config::{ConfigError, SyncConfig};
pub use notify::{ChannelNotifier, Level, LogNotifier, MutationKind, Notification, Notifier};
pub use store::TodoStore;
pub use transport::{ReqwestTransport, Transport};
