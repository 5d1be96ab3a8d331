//! Keyed cache of remote reads with request coalescing.
//!
//! Each key moves through `Empty -> Loading -> Fresh | Errored`. A mutation
//! invalidates `Fresh` entries to `Stale` and the next read goes back to
//! `Loading`. `Errored` is left only through [`QueryCache::refetch`].
//!
//! Fetches run on spawned tasks. Dropping every caller does not abort the
//! request; its result is written back only if the entry still points at
//! that fetch, so a read that raced an invalidation is never stored as
//! fresh data.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use todo_core::ApiError;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, ApiError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Empty,
    Loading,
    Fresh,
    Stale,
    Errored,
}

enum Slot<V> {
    Empty,
    Fresh { data: V, fetched_at: Instant },
    Stale { data: V },
    Errored { error: ApiError, last_data: Option<V> },
}

impl<V> Slot<V> {
    fn data(&self) -> Option<&V> {
        match self {
            Slot::Fresh { data, .. } | Slot::Stale { data } => Some(data),
            Slot::Errored { last_data, .. } => last_data.as_ref(),
            Slot::Empty => None,
        }
    }

    fn take_data(&mut self) -> Option<V> {
        match std::mem::replace(self, Slot::Empty) {
            Slot::Fresh { data, .. } | Slot::Stale { data } => Some(data),
            Slot::Errored { last_data, .. } => last_data,
            Slot::Empty => None,
        }
    }
}

struct Inflight<V> {
    token: u64,
    fetch: SharedFetch<V>,
}

struct Entry<V> {
    slot: Slot<V>,
    inflight: Option<Inflight<V>>,
}

impl<V> Entry<V> {
    fn empty() -> Self {
        Self {
            slot: Slot::Empty,
            inflight: None,
        }
    }

    /// Fresh data becomes stale and any in-flight fetch is detached.
    fn invalidate(&mut self) {
        self.slot = match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Fresh { data, .. } => Slot::Stale { data },
            other => other,
        };
        self.inflight = None;
    }
}

struct Inner<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    next_token: AtomicU64,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    async fn settle(&self, key: &K, token: u64, result: &Result<V, ApiError>) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            debug!(?key, token, "cache cleared before fetch finished");
            return;
        };
        if !entry.inflight.as_ref().is_some_and(|i| i.token == token) {
            debug!(?key, token, "discarding result of invalidated fetch");
            return;
        }
        entry.inflight = None;
        entry.slot = match result {
            Ok(data) => Slot::Fresh {
                data: data.clone(),
                fetched_at: Instant::now(),
            },
            Err(error) => {
                debug!(?key, token, "fetch failed: {error}");
                Slot::Errored {
                    error: error.clone(),
                    last_data: entry.slot.take_data(),
                }
            }
        };
    }
}

pub struct QueryCache<K, V> {
    inner: Arc<Inner<K, V>>,
    stale_after: Option<Duration>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            stale_after: self.stale_after,
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// `stale_after` ages fresh entries out. `None` keeps them fresh until
    /// they are invalidated.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
            }),
            stale_after,
        }
    }

    fn is_expired(&self, fetched_at: Instant) -> bool {
        self.stale_after
            .is_some_and(|ttl| fetched_at.elapsed() >= ttl)
    }

    /// Serves fresh data, joins a fetch already in flight for `key`, or
    /// starts one with `fetcher`. An errored entry returns its error.
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<V, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let fetch = {
            let mut entries = self.inner.entries.lock().await;
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            if let Some(inflight) = &entry.inflight {
                debug!(?key, token = inflight.token, "joining in-flight fetch");
                inflight.fetch.clone()
            } else {
                let cached = match &entry.slot {
                    Slot::Fresh { data, fetched_at } if !self.is_expired(*fetched_at) => {
                        Some(Ok(data.clone()))
                    }
                    Slot::Errored { error, .. } => Some(Err(error.clone())),
                    _ => None,
                };
                if let Some(result) = cached {
                    return result;
                }
                self.start(&key, entry, fetcher())
            }
        };
        fetch.await
    }

    /// Manual retry: starts a new fetch whatever the entry holds, unless one
    /// is already in flight.
    pub async fn refetch<F, Fut>(&self, key: K, fetcher: F) -> Result<V, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let fetch = {
            let mut entries = self.inner.entries.lock().await;
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            if let Some(inflight) = &entry.inflight {
                inflight.fetch.clone()
            } else {
                self.start(&key, entry, fetcher())
            }
        };
        fetch.await
    }

    fn start<Fut>(&self, key: &K, entry: &mut Entry<V>, fut: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        debug!(?key, token, "starting fetch");

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            inner.settle(&task_key, token, &result).await;
            result
        });

        let fetch = async move {
            handle
                .await
                .unwrap_or_else(|err| Err(ApiError::transport(format!("fetch task failed: {err}"))))
        }
        .boxed()
        .shared();
        entry.inflight = Some(Inflight {
            token,
            fetch: fetch.clone(),
        });
        fetch
    }

    pub async fn invalidate(&self, key: &K) {
        if let Some(entry) = self.inner.entries.lock().await.get_mut(key) {
            debug!(?key, "invalidating");
            entry.invalidate();
        }
    }

    pub async fn invalidate_all(&self) {
        let mut entries = self.inner.entries.lock().await;
        debug!(count = entries.len(), "invalidating every entry");
        for entry in entries.values_mut() {
            entry.invalidate();
        }
    }

    pub async fn state(&self, key: &K) -> EntryState {
        let entries = self.inner.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return EntryState::Empty;
        };
        if entry.inflight.is_some() {
            return EntryState::Loading;
        }
        match &entry.slot {
            Slot::Empty => EntryState::Empty,
            Slot::Fresh { fetched_at, .. } if self.is_expired(*fetched_at) => EntryState::Stale,
            Slot::Fresh { .. } => EntryState::Fresh,
            Slot::Stale { .. } => EntryState::Stale,
            Slot::Errored { .. } => EntryState::Errored,
        }
    }

    /// Last data stored for `key`, fresh or not. Never fetches.
    pub async fn peek(&self, key: &K) -> Option<V> {
        let entries = self.inner.entries.lock().await;
        entries.get(key).and_then(|e| e.slot.data().cloned())
    }

    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }
}
