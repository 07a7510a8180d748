//! Generic keyed node cache with a per-key lifecycle state machine.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use crate::error::HierarchyError;

/// Lifecycle state of one cached key.
///
/// `Empty --(request)--> Loading --(success)--> Loaded`
/// `Loading --(failure)--> Errored`; `Loaded` and `Errored` are
/// terminal until an explicit [`NodeCache::invalidate`]. Collapsing a
/// node in the UI never transitions its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Key has never been requested (or was invalidated).
    Empty,
    /// A loader call is in flight; it is the single source of truth.
    Loading,
    /// Children are cached.
    Loaded,
    /// The last fetch failed; the error is retained.
    Errored,
}

/// Snapshot of one key's entry.
///
/// Data is shared (`Rc<[T]>`), so snapshots are cheap and two reads of
/// a `Loaded` key observe identical data.
pub struct CacheEntry<T> {
    status: FetchStatus,
    data: Option<Rc<[T]>>,
    error: Option<HierarchyError>,
}

impl<T> CacheEntry<T> {
    pub(crate) fn empty() -> Self {
        Self {
            status: FetchStatus::Empty,
            data: None,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            status: FetchStatus::Loading,
            data: None,
            error: None,
        }
    }

    fn loaded(items: Vec<T>) -> Self {
        Self {
            status: FetchStatus::Loaded,
            data: Some(Rc::from(items)),
            error: None,
        }
    }

    fn errored(error: HierarchyError) -> Self {
        Self {
            status: FetchStatus::Errored,
            data: None,
            error: Some(error),
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Cached children, present only when `Loaded`.
    pub fn data(&self) -> Option<&[T]> {
        self.data.as_deref()
    }

    /// Retained error, present only when `Errored`.
    pub fn error(&self) -> Option<&HierarchyError> {
        self.error.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FetchStatus::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }
}

// Manual impl: cloning shares the Rc, so no `T: Clone` bound.
impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("status", &self.status)
            .field("len", &self.data.as_ref().map(|d| d.len()))
            .field("error", &self.error)
            .finish()
    }
}

struct Slot<T> {
    /// Monotonic request marker; a resolution whose generation no
    /// longer matches the slot's is stale and must not be committed.
    generation: u64,
    entry: CacheEntry<T>,
}

/// Keyed cache with fetch deduplication.
///
/// One instance serves one hierarchy level; the key is the structural
/// path of the parent node. All mutation happens through `&self` on a
/// single logical thread - the interior `RefCell` is never held across
/// an await.
pub struct NodeCache<K, T> {
    slots: RefCell<HashMap<K, Slot<T>>>,
    next_generation: Cell<u64>,
}

impl<K, T> Default for NodeCache<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> NodeCache<K, T> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            next_generation: Cell::new(0),
        }
    }

    fn bump_generation(&self) -> u64 {
        let generation = self.next_generation.get() + 1;
        self.next_generation.set(generation);
        generation
    }
}

impl<K, T> NodeCache<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Snapshot of the entry for `key`; `Empty` if never requested.
    pub fn entry(&self, key: &K) -> CacheEntry<T> {
        self.slots
            .borrow()
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_else(CacheEntry::empty)
    }

    /// Current lifecycle status for `key`.
    pub fn status(&self, key: &K) -> FetchStatus {
        self.slots
            .borrow()
            .get(key)
            .map(|slot| slot.entry.status)
            .unwrap_or(FetchStatus::Empty)
    }

    /// Read the entry, issuing the loader only when the key is `Empty`.
    ///
    /// - `Empty`: transitions to `Loading`, awaits `loader` exactly
    ///   once, commits `Loaded`/`Errored`, returns the final snapshot.
    /// - `Loading`: the in-flight call is the single source of truth;
    ///   returns the `Loading` snapshot without touching the loader.
    /// - `Loaded`/`Errored`: returns the terminal snapshot immediately.
    ///
    /// A resolution arriving after [`invalidate`](Self::invalidate)
    /// removed (or a new request replaced) the slot is discarded: the
    /// last-issued loader wins.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, loader: F) -> CacheEntry<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, HierarchyError>>,
    {
        let generation = {
            let mut slots = self.slots.borrow_mut();
            if let Some(slot) = slots.get(key) {
                if slot.entry.status != FetchStatus::Empty {
                    return slot.entry.clone();
                }
            }
            let generation = self.bump_generation();
            slots.insert(
                key.clone(),
                Slot {
                    generation,
                    entry: CacheEntry::loading(),
                },
            );
            generation
        };
        debug!(?key, generation, "hierarchy fetch started");

        // The only suspension point; the borrow above is already gone.
        let result = loader().await;

        let mut slots = self.slots.borrow_mut();
        match slots.get_mut(key) {
            Some(slot)
                if slot.generation == generation
                    && slot.entry.status == FetchStatus::Loading =>
            {
                slot.entry = match result {
                    Ok(items) => {
                        debug!(?key, count = items.len(), "hierarchy fetch loaded");
                        CacheEntry::loaded(items)
                    }
                    Err(error) => {
                        debug!(?key, %error, "hierarchy fetch failed");
                        CacheEntry::errored(error)
                    }
                };
                slot.entry.clone()
            }
            // Invalidated or superseded while in flight: stale
            // resolution is a no-op write.
            Some(slot) => slot.entry.clone(),
            None => CacheEntry::empty(),
        }
    }

    /// Explicit cache-bust for one key. Returns true if an entry was
    /// dropped. Not used by normal expand/collapse flows.
    pub fn invalidate(&self, key: &K) -> bool {
        let dropped = self.slots.borrow_mut().remove(key).is_some();
        if dropped {
            debug!(?key, "hierarchy entry invalidated");
        }
        dropped
    }

    /// Drop every entry (session reset).
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_empty_key_loads_once_and_becomes_loaded() {
        let cache: NodeCache<&str, u32> = NodeCache::new();
        assert_eq!(cache.status(&"k"), FetchStatus::Empty);

        let entry = cache.get_or_fetch(&"k", || async { Ok(vec![1, 2, 3]) }).await;
        assert_eq!(entry.status(), FetchStatus::Loaded);
        assert_eq!(entry.data(), Some(&[1, 2, 3][..]));
        assert_eq!(cache.status(&"k"), FetchStatus::Loaded);
    }

    #[tokio::test]
    async fn test_loaded_key_never_reissues_the_loader() {
        let cache: NodeCache<&str, u32> = NodeCache::new();
        let calls = Cell::new(0u32);

        for _ in 0..3 {
            let entry = cache
                .get_or_fetch(&"k", || {
                    calls.set(calls.get() + 1);
                    async { Ok(vec![7]) }
                })
                .await;
            assert_eq!(entry.data(), Some(&[7][..]));
        }
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_deduplicate_to_one_loader_call() {
        let cache: NodeCache<&str, u32> = NodeCache::new();
        let calls = Cell::new(0u32);

        let slow = cache.get_or_fetch(&"k", || {
            calls.set(calls.get() + 1);
            async {
                // Suspend once so the second request observes Loading.
                tokio::task::yield_now().await;
                Ok(vec![42])
            }
        });
        let fast = cache.get_or_fetch(&"k", || {
            calls.set(calls.get() + 1);
            async { Ok(vec![99]) }
        });

        let (first, second) = tokio::join!(slow, fast);
        assert_eq!(calls.get(), 1);
        assert_eq!(first.status(), FetchStatus::Loaded);
        assert_eq!(first.data(), Some(&[42][..]));
        // The concurrent caller saw the in-flight state, not a second fetch.
        assert_eq!(second.status(), FetchStatus::Loading);
        assert_eq!(cache.entry(&"k").data(), Some(&[42][..]));
    }

    #[tokio::test]
    async fn test_failure_is_retained_and_isolated() {
        let cache: NodeCache<&str, u32> = NodeCache::new();

        cache
            .get_or_fetch(&"good", || async { Ok(vec![1]) })
            .await;
        let failed = cache
            .get_or_fetch(&"bad", || async {
                Err(HierarchyError::loader("boom"))
            })
            .await;

        assert_eq!(failed.status(), FetchStatus::Errored);
        assert_eq!(failed.error(), Some(&HierarchyError::loader("boom")));
        assert!(failed.data().is_none());
        // Sibling key untouched.
        assert_eq!(cache.entry(&"good").status(), FetchStatus::Loaded);
    }

    #[tokio::test]
    async fn test_errored_key_requires_invalidate_to_retry() {
        let cache: NodeCache<&str, u32> = NodeCache::new();
        let calls = Cell::new(0u32);

        let load_failing = || {
            calls.set(calls.get() + 1);
            async { Err(HierarchyError::loader("down")) }
        };
        cache.get_or_fetch(&"k", load_failing).await;
        // Errored is terminal: no automatic retry.
        cache.get_or_fetch(&"k", load_failing).await;
        assert_eq!(calls.get(), 1);

        assert!(cache.invalidate(&"k"));
        let entry = cache
            .get_or_fetch(&"k", || {
                calls.set(calls.get() + 1);
                async { Ok(vec![5]) }
            })
            .await;
        assert_eq!(calls.get(), 2);
        assert_eq!(entry.status(), FetchStatus::Loaded);
    }

    #[tokio::test]
    async fn test_stale_resolution_after_invalidate_is_discarded() {
        let cache: NodeCache<&str, u32> = NodeCache::new();

        let slow = cache.get_or_fetch(&"k", || async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            Ok(vec![1])
        });
        let interloper = async {
            tokio::task::yield_now().await;
            // In-flight entry is dropped mid-load.
            cache.invalidate(&"k");
        };
        let (stale, ()) = tokio::join!(slow, interloper);

        // The stale resolution was not committed.
        assert_eq!(stale.status(), FetchStatus::Empty);
        assert_eq!(cache.status(&"k"), FetchStatus::Empty);
    }
}
