//! Single-slot cart cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

use crate::wire::CartSnapshot;

/// Observable fetch status of the cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data yet and no failure recorded.
    Loading,
    /// The last read failed.
    Error,
    /// Data is present.
    Success,
}

/// Who wrote the data currently in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// A successful backend read.
    Server,
    /// Rehydration from the local mirror.
    Mirror,
    /// An optimistic mutation write.
    Optimistic,
    /// A mutation restoring its pre-mutation snapshot.
    Rollback,
    /// An explicit client-side reset.
    Reset,
}

/// Contents of the cache slot.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// Last known cart, authoritative or optimistic.
    pub data: Option<CartSnapshot>,
    pub status: QueryStatus,
    /// Message of the last failed read.
    pub error: Option<String>,
    pub origin: Option<DataOrigin>,
    /// Bumped on every data write.
    pub version: u64,
    /// When the last successful backend read landed.
    pub fetched_at: Option<Instant>,
    /// Set by [`CartQueryCache::invalidate`], cleared by the next successful read.
    pub invalidated: bool,
    pub is_fetching: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Loading,
            error: None,
            origin: None,
            version: 0,
            fetched_at: None,
            invalidated: false,
            is_fetching: false,
        }
    }
}

impl QueryState {
    /// True only for the first load, before any data is present.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Whether a backend read has ever succeeded.
    pub fn has_server_data(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Collapse the state into the three observable outcomes.
    pub fn result(&self) -> QueryResult {
        match (self.status, &self.data) {
            (QueryStatus::Error, _) => {
                QueryResult::Error(self.error.clone().unwrap_or_default())
            }
            (QueryStatus::Success, Some(data)) => QueryResult::Success(data.clone()),
            _ => QueryResult::Loading,
        }
    }
}

/// Outcome of a cart read as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Loading,
    Error(String),
    Success(CartSnapshot),
}

impl QueryResult {
    /// Data if the read succeeded.
    pub fn data(&self) -> Option<&CartSnapshot> {
        match self {
            QueryResult::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// Receives every data write, synchronously, after it lands.
pub trait CacheObserver: Send + Sync {
    fn on_change(&self, state: &QueryState);
}

/// Proof that a read started under a given fetch epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
}

/// The cache entry holding the cart.
///
/// The slot is a watch channel, so any number of consumers can
/// [`subscribe`](Self::subscribe) to state changes. All writes are
/// synchronous; observers run after the slot is updated, outside its lock.
pub struct CartQueryCache {
    slot: watch::Sender<QueryState>,
    epoch: AtomicU64,
    stale_time: Duration,
    observers: Mutex<Vec<Arc<dyn CacheObserver>>>,
}

impl fmt::Debug for CartQueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartQueryCache")
            .field("state", &*self.slot.borrow())
            .field("epoch", &self.epoch.load(Ordering::SeqCst))
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl CartQueryCache {
    /// Create an empty cache with the given freshness window.
    pub fn new(stale_time: Duration) -> Self {
        let (slot, _) = watch::channel(QueryState::default());
        Self {
            slot,
            epoch: AtomicU64::new(0),
            stale_time,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Current state.
    pub fn state(&self) -> QueryState {
        self.slot.borrow().clone()
    }

    /// Current data, if any.
    pub fn data(&self) -> Option<CartSnapshot> {
        self.slot.borrow().data.clone()
    }

    /// Current data version.
    pub fn version(&self) -> u64 {
        self.slot.borrow().version
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.slot.subscribe()
    }

    /// Register an observer for data writes.
    pub fn add_observer(&self, observer: Arc<dyn CacheObserver>) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(observer);
        }
    }

    /// Replace the cached data. Returns the new version.
    pub fn overwrite(&self, data: CartSnapshot, origin: DataOrigin) -> u64 {
        let mut written = QueryState::default();
        self.slot.send_modify(|state| {
            write_data(state, data, origin);
            written = state.clone();
        });
        debug!(?origin, version = written.version, "cart cache overwritten");
        self.notify(&written);
        written.version
    }

    /// Edit the cached data in place, starting from an empty cart if none is
    /// present. Returns the new version.
    pub fn patch(&self, origin: DataOrigin, f: impl FnOnce(&mut CartSnapshot)) -> u64 {
        let mut written = QueryState::default();
        self.slot.send_modify(|state| {
            let mut data = state.data.take().unwrap_or_default();
            f(&mut data);
            write_data(state, data, origin);
            written = state.clone();
        });
        debug!(?origin, version = written.version, "cart cache patched");
        self.notify(&written);
        written.version
    }

    /// Replace the data only if nothing else wrote since `expected`.
    pub fn overwrite_if_version(&self, expected: u64, data: CartSnapshot) -> bool {
        let mut written = None;
        self.slot.send_if_modified(|state| {
            if state.version != expected {
                return false;
            }
            write_data(state, data, DataOrigin::Rollback);
            written = Some(state.clone());
            true
        });
        match written {
            Some(state) => {
                debug!(expected, "cart cache restored");
                self.notify(&state);
                true
            }
            None => false,
        }
    }

    /// Whether the next `fetch` should hit the backend.
    pub fn needs_fetch(&self) -> bool {
        let state = self.slot.borrow();
        if state.data.is_none() || state.invalidated {
            return true;
        }
        match state.fetched_at {
            Some(at) => at.elapsed() >= self.stale_time,
            None => true,
        }
    }

    /// Mark a read as started.
    ///
    /// Returns `None` if a read is already in flight under the current
    /// epoch; callers should [`settle`](Self::settle) on that one instead.
    pub fn begin_fetch(&self) -> Option<FetchTicket> {
        let mut ticket = None;
        self.slot.send_if_modified(|state| {
            if state.is_fetching {
                return false;
            }
            state.is_fetching = true;
            ticket = Some(FetchTicket {
                epoch: self.epoch.load(Ordering::SeqCst),
            });
            true
        });
        ticket
    }

    /// Wait until no read is in flight and return the state it left behind.
    ///
    /// A read cancelled while waiting also ends the wait.
    pub async fn settle(&self) -> QueryState {
        let mut rx = self.slot.subscribe();
        let settled = match rx.wait_for(|state| !state.is_fetching).await {
            Ok(state) => QueryState::clone(&state),
            Err(_) => self.state(),
        };
        settled
    }

    /// Land the outcome of a read. Returns false if the read was cancelled
    /// after it started, in which case the outcome is discarded.
    pub fn finish_fetch(&self, ticket: FetchTicket, outcome: Result<CartSnapshot, String>) -> bool {
        let mut current = true;
        let mut written = None;
        self.slot.send_if_modified(|state| {
            if ticket.epoch != self.epoch.load(Ordering::SeqCst) {
                current = false;
                return false;
            }
            state.is_fetching = false;
            match outcome {
                Ok(data) => {
                    write_data(state, data, DataOrigin::Server);
                    state.fetched_at = Some(Instant::now());
                    state.invalidated = false;
                    written = Some(state.clone());
                }
                Err(message) => {
                    state.status = QueryStatus::Error;
                    state.error = Some(message);
                }
            }
            true
        });
        if !current {
            debug!(epoch = ticket.epoch, "discarding cancelled cart read");
            return false;
        }
        if let Some(state) = written {
            self.notify(&state);
        }
        true
    }

    /// Drop any reads in flight; their results will be discarded.
    pub fn cancel_fetches(&self) {
        self.slot.send_if_modified(|state| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            let was_fetching = state.is_fetching;
            state.is_fetching = false;
            was_fetching
        });
    }

    /// Mark the data stale and cancel reads in flight.
    pub fn invalidate(&self) {
        self.cancel_fetches();
        self.slot.send_if_modified(|state| {
            let changed = !state.invalidated;
            state.invalidated = true;
            changed
        });
    }

    /// Replace the data with an empty cart and mark it stale.
    pub fn reset(&self) {
        self.cancel_fetches();
        let mut written = QueryState::default();
        self.slot.send_modify(|state| {
            write_data(state, CartSnapshot::empty(), DataOrigin::Reset);
            state.invalidated = true;
            written = state.clone();
        });
        debug!("cart cache reset");
        self.notify(&written);
    }

    /// Hand the state produced by one write to every observer. Observers run
    /// outside the slot lock, so concurrent writes may arrive out of order;
    /// `version` tells them apart.
    fn notify(&self, state: &QueryState) {
        let observers = match self.observers.lock() {
            Ok(observers) => observers.clone(),
            Err(_) => return,
        };
        for observer in observers {
            observer.on_change(state);
        }
    }
}

fn write_data(state: &mut QueryState, data: CartSnapshot, origin: DataOrigin) {
    state.data = Some(data);
    state.status = QueryStatus::Success;
    state.error = None;
    state.origin = Some(origin);
    state.version += 1;
}
