use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::key::{QueryFilter, QueryKey};

struct Entry<V> {
    value: Option<V>,
    stale: bool,
    generation: u64,
}

impl<V> Entry<V> {
    fn empty() -> Self {
        Self {
            value: None,
            stale: true,
            generation: 0,
        }
    }
}

/// Keyed read cache with optimistic writes.
///
/// Every entry carries a generation. A read remembers the generation it
/// started under and only stores its result if the entry has not moved on,
/// so a cancelled or optimistically overwritten entry never regresses to an
/// older server answer.
pub struct QueryCache<V> {
    entries: Mutex<HashMap<QueryKey, Entry<V>>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        self.lock().get(key).and_then(|entry| entry.value.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().get(key).map_or(true, |entry| entry.stale)
    }

    /// Returns the cached value if it is fresh, otherwise runs `fetcher`.
    pub async fn fetch<F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let generation = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            match &entry.value {
                Some(value) if !entry.stale => return Ok(value.clone()),
                _ => entry.generation,
            }
        };

        let fetched = fetcher().await?;

        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
        if entry.generation != generation {
            tracing::debug!(?key, "discarding superseded read");
            return Ok(entry.value.clone().unwrap_or(fetched));
        }
        entry.value = Some(fetched.clone());
        entry.stale = false;
        Ok(fetched)
    }

    /// Supersedes in-flight reads of matching entries.
    pub fn cancel(&self, filter: &QueryFilter) {
        for (_, entry) in self.lock().iter_mut().filter(|(key, _)| filter.matches(key)) {
            entry.generation += 1;
        }
    }

    /// Marks matching entries stale so the next `fetch` goes to the server.
    ///
    /// Reads already in flight started before the invalidation and are
    /// superseded too.
    pub fn invalidate(&self, filter: &QueryFilter) {
        for (_, entry) in self.lock().iter_mut().filter(|(key, _)| filter.matches(key)) {
            entry.generation += 1;
            entry.stale = true;
        }
    }

    /// Writes a value, superseding any read in flight for the key.
    pub fn set(&self, key: &QueryKey, value: V) {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.generation += 1;
        entry.value = Some(value);
        entry.stale = false;
    }

    /// Runs `action` with `optimistic` applied to the cached value of `key`.
    ///
    /// In-flight reads of `key` and of everything in `settle` are cancelled
    /// first. While the action runs the optimistic value is served as fresh.
    /// A failed action restores the previous value. Success or not, `settle`
    /// is invalidated afterwards so the server answer wins.
    pub async fn mutate<O, A, Fut, T, E>(
        &self,
        key: &QueryKey,
        optimistic: O,
        action: A,
        settle: &[QueryFilter],
    ) -> Result<T, E>
    where
        O: FnOnce(&V) -> V,
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cancel(&QueryFilter::Exact(key.clone()));
        for filter in settle {
            self.cancel(filter);
        }

        let (snapshot, was_stale) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            let snapshot = entry.value.clone();
            let was_stale = entry.stale;
            if let Some(previous) = &snapshot {
                entry.generation += 1;
                entry.value = Some(optimistic(previous));
                entry.stale = false;
            }
            (snapshot, was_stale)
        };

        let result = action().await;

        if result.is_err() {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            entry.generation += 1;
            entry.value = snapshot;
            entry.stale = was_stale;
        }
        for filter in settle {
            self.invalidate(filter);
        }
        result
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;
    use uuid::Uuid;

    use kernel::prelude::entity::{BookingId, ListingId};

    use crate::cache::QueryCache;
    use crate::key::{QueryFilter, QueryKey};

    fn key() -> QueryKey {
        QueryKey::Booking(BookingId::new(Uuid::new_v4()))
    }

    #[tokio::test]
    async fn fresh_values_are_served_from_cache() {
        let cache = QueryCache::<u32>::new();
        let key = key();
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(7)
        };

        assert_eq!(cache.fetch(&key, fetch).await, Ok(7));
        assert_eq!(cache.fetch(&key, fetch).await, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&QueryFilter::Exact(key.clone()));
        assert!(cache.is_stale(&key));
        assert_eq!(cache.peek(&key), Some(7));
        assert_eq!(cache.fetch(&key, fetch).await, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superseded_reads_are_discarded() {
        let cache = QueryCache::<&str>::new();
        let key = key();
        let (tx, rx) = oneshot::channel::<()>();

        let read = cache.fetch(&key, || async move {
            let _ = rx.await;
            Ok::<_, ()>("server")
        });
        let write = async {
            tokio::task::yield_now().await;
            cache.set(&key, "optimistic");
            let _ = tx.send(());
        };
        let (read, ()) = tokio::join!(read, write);

        assert_eq!(read, Ok("optimistic"));
        assert_eq!(cache.peek(&key), Some("optimistic"));
    }

    #[tokio::test]
    async fn failed_mutation_restores_snapshot() {
        let cache = QueryCache::<&str>::new();
        let key = key();
        cache.set(&key, "pending");

        let (observed, observed_key) = (&cache, &key);
        let result = cache
            .mutate(
                &key,
                |_| "approved",
                || async move {
                    assert_eq!(observed.peek(observed_key), Some("approved"));
                    Err::<(), _>("conflict")
                },
                &[QueryFilter::Exact(key.clone())],
            )
            .await;

        assert_eq!(result, Err("conflict"));
        assert_eq!(cache.peek(&key), Some("pending"));
        assert!(cache.is_stale(&key));
    }

    #[tokio::test]
    async fn settled_mutation_defers_to_server() {
        let cache = QueryCache::<&str>::new();
        let key = key();
        let listing = ListingId::new(Uuid::new_v4());
        let approved = QueryKey::ApprovedBookings(listing.clone());
        cache.set(&key, "pending");
        cache.set(&approved, "[]");

        cache
            .mutate(
                &key,
                |_| "approved",
                || async { Ok::<_, ()>(()) },
                &[QueryFilter::Exact(key.clone()), QueryFilter::Exact(approved.clone())],
            )
            .await
            .unwrap();

        assert_eq!(cache.peek(&key), Some("approved"));
        assert!(cache.is_stale(&key));
        assert!(cache.is_stale(&approved));
        let refreshed = cache.fetch(&key, || async { Ok::<_, ()>("approved*") }).await;
        assert_eq!(refreshed, Ok("approved*"));
    }

    #[tokio::test]
    async fn reads_overlapping_a_mutation_are_not_kept() {
        let cache = QueryCache::<&str>::new();
        let key = key();
        let approved = QueryKey::ApprovedBookings(ListingId::new(Uuid::new_v4()));
        cache.set(&key, "pending");
        cache.set(&approved, "[]");
        cache.invalidate(&QueryFilter::Exact(approved.clone()));

        let (action_started, wait_action_started) = oneshot::channel::<()>();
        let (release_action, action_gate) = oneshot::channel::<()>();
        let (read_started, wait_read_started) = oneshot::channel::<()>();
        let (release_read, read_gate) = oneshot::channel::<()>();
        let (settled, wait_settled) = oneshot::channel::<()>();
        let settle = [
            QueryFilter::Exact(key.clone()),
            QueryFilter::Exact(approved.clone()),
        ];

        let mutation = async {
            let result = cache
                .mutate(
                    &key,
                    |_| "approved",
                    || async move {
                        let _ = action_started.send(());
                        let _ = action_gate.await;
                        Ok::<_, ()>(())
                    },
                    &settle,
                )
                .await;
            let _ = settled.send(());
            result
        };
        let overlapping = async {
            let _ = wait_action_started.await;
            let during = cache.fetch(&key, || async { Ok::<_, ()>("pending (server)") }).await;
            let before = cache
                .fetch(&approved, || async move {
                    let _ = read_started.send(());
                    let _ = read_gate.await;
                    Ok::<_, ()>("[] (before approval)")
                })
                .await;
            (during, before)
        };
        let schedule = async {
            let _ = wait_read_started.await;
            let _ = release_action.send(());
            let _ = wait_settled.await;
            let _ = release_read.send(());
        };
        let (mutation, (during, _), ()) = tokio::join!(mutation, overlapping, schedule);

        assert_eq!(mutation, Ok(()));
        assert_eq!(during, Ok("approved"));
        assert_eq!(cache.peek(&approved), Some("[]"));
        assert!(cache.is_stale(&approved));
        assert!(cache.is_stale(&key));
        let refreshed = cache
            .fetch(&approved, || async { Ok::<_, ()>("[booking]") })
            .await;
        assert_eq!(refreshed, Ok("[booking]"));
    }
}
