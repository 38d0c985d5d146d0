use crate::snapshot::Snapshot;
use parking_lot::{RwLock, RwLockWriteGuard};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// A thread-safe keyed store with lazily allocated backing
///
/// `SyncStore` wraps a `HashMap` behind a single readers-writer lock. Reads
/// (`get_current`, `contains_key`, `with`, `for_each`) take the lock in
/// shared mode; everything that mutates takes it exclusively. Shared
/// acquisitions are recursive: a reader already inside the lock never queues
/// behind a waiting writer, so reading from a `for_each` or `with` closure is
/// safe. A steady stream of overlapping readers can delay writers.
///
/// The backing map does not exist until the first `put`, `get_or_put` or
/// `preallocate`. Until then the store behaves as empty and costs nothing,
/// which is what lets [`SyncStore::new`] be a `const fn`:
///
/// ```
/// use sovran_syncstore::SyncStore;
///
/// static SESSIONS: SyncStore<u64, String> = SyncStore::new();
///
/// SESSIONS.put(7, "alice".to_string());
/// assert_eq!(SESSIONS.get_current(&7), Some("alice".to_string()));
/// assert_eq!(SESSIONS.get_current(&8), None);
/// ```
///
/// Share a store between threads with `Arc` or a `static`; the store itself
/// is not `Clone`.
pub struct SyncStore<K, V> {
    items: RwLock<Option<HashMap<K, V>>>,
}

impl<K, V> SyncStore<K, V> {
    /// Creates an empty store without allocating
    pub const fn new() -> Self {
        Self {
            items: parking_lot::const_rwlock(None),
        }
    }

    /// Returns the number of entries in the store
    pub fn len(&self) -> usize {
        self.items.read_recursive().as_ref().map_or(0, HashMap::len)
    }

    /// Returns true if the store contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `handler` for every entry while holding the shared lock
    ///
    /// The lock is held for the entire traversal, so writers on this store
    /// wait until `handler` has seen every entry. `handler` may read from the
    /// store (`get_current`, `len`, `contains_key`, ...) but must not call a
    /// mutating method on it: that would deadlock. Order is unspecified.
    ///
    /// Use [`SyncStore::iter`] instead when the traversal is slow or needs
    /// to write back into the store.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// store.put("a", 1);
    /// store.put("b", 2);
    ///
    /// let mut total = 0;
    /// store.for_each(|_, v| total += v);
    /// assert_eq!(total, 3);
    /// ```
    pub fn for_each<F>(&self, mut handler: F)
    where
        F: FnMut(&K, &V),
    {
        let guard = self.items.read_recursive();
        if let Some(map) = guard.as_ref() {
            for (key, value) in map {
                handler(key, value);
            }
        }
    }
}

impl<K, V> SyncStore<K, V>
where
    K: Eq + Hash,
{
    /// Creates a store whose backing is allocated up front for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(Some(HashMap::with_capacity(capacity))),
        }
    }

    fn materialize<'a>(
        guard: &'a mut RwLockWriteGuard<'_, Option<HashMap<K, V>>>,
        size_hint: usize,
    ) -> &'a mut HashMap<K, V> {
        guard.get_or_insert_with(|| {
            log::trace!("Allocating store backing for {} entries", size_hint);
            HashMap::with_capacity(size_hint)
        })
    }

    /// Allocates the backing map sized for `size_hint` entries
    ///
    /// Does nothing if the backing already exists, whatever its size.
    pub fn preallocate(&self, size_hint: usize) {
        let mut guard = self.items.write();
        Self::materialize(&mut guard, size_hint);
    }

    /// Inserts `val` under `key`, replacing any previous value
    ///
    /// The backing map is allocated on the first call.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// store.put("retries", 3);
    /// store.put("retries", 5);
    ///
    /// assert_eq!(store.get_current("retries"), Some(5));
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn put(&self, key: K, val: V) {
        let mut guard = self.items.write();
        Self::materialize(&mut guard, 0).insert(key, val);
    }

    /// Returns a clone of the value stored under `key`, if any
    ///
    /// Never allocates the backing map and never fails: an untouched store
    /// simply answers `None`.
    pub fn get_current<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        self.items.read_recursive().as_ref()?.get(key).cloned()
    }

    /// Returns true if the store holds a value for `key`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.items
            .read_recursive()
            .as_ref()
            .is_some_and(|map| map.contains_key(key))
    }

    /// Returns the value under `key`, constructing it with `factory` if absent
    ///
    /// Concurrent callers racing on the same missing key run `factory`
    /// exactly once between them and all receive clones of the value it
    /// produced. `factory` runs while the exclusive lock is held, so every
    /// caller that later reads the key observes the fully built value.
    ///
    /// `factory` must not touch this store. If it panics, nothing is
    /// inserted and the store stays usable.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// let first = store.get_or_put("config", || vec![1, 2, 3]);
    /// let second = store.get_or_put("config", || unreachable!());
    /// assert_eq!(first, second);
    /// ```
    pub fn get_or_put<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        if let Some(value) = self.get_current(&key) {
            return value;
        }

        // Another thread may insert the key between dropping the shared
        // lock above and acquiring the exclusive one, so check again
        let mut guard = self.items.write();
        let map = Self::materialize(&mut guard, 0);
        if let Some(value) = map.get(&key) {
            return value.clone();
        }

        log::trace!("Constructing missing store entry");
        let value = factory();
        map.insert(key, value.clone());
        value
    }

    /// Removes the value under `key`
    ///
    /// Removing a key that is not present is a no-op, including on a store
    /// that was never written to.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store: SyncStore<&str, i32> = SyncStore::new();
    /// store.remove("never-added");
    ///
    /// store.put("a", 1);
    /// store.remove("a");
    /// assert!(store.is_empty());
    /// ```
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if let Some(map) = self.items.write().as_mut() {
            map.remove(key);
        }
    }

    /// Runs `f` on the value under `key` with read access
    ///
    /// Useful when the value is large or not `Clone`. Returns `None` if the
    /// key is absent. The shared lock is held while `f` runs; `f` may read
    /// from the store but must not mutate it.
    pub fn with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let guard = self.items.read_recursive();
        let value = guard.as_ref()?.get(key)?;
        Some(f(value))
    }

    /// Runs `f` on the value under `key` with write access
    ///
    /// Returns `None` if the key is absent. The exclusive lock is held while
    /// `f` runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let hits: SyncStore<&str, u32> = SyncStore::new();
    /// hits.put("/", 0);
    /// hits.with_mut("/", |n| *n += 1);
    /// assert_eq!(hits.get_current("/"), Some(1));
    /// assert_eq!(hits.with_mut("/missing", |n| *n += 1), None);
    /// ```
    pub fn with_mut<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        let mut guard = self.items.write();
        let value = guard.as_mut()?.get_mut(key)?;
        Some(f(value))
    }

    /// Returns a snapshot of all values
    ///
    /// The values are cloned under the shared lock, which is released before
    /// this method returns. Order is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let prices = SyncStore::new();
    /// prices.put("apple", 3);
    /// prices.put("pear", 4);
    ///
    /// let total: i32 = prices.values().sum();
    /// assert_eq!(total, 7);
    /// ```
    pub fn values(&self) -> Snapshot<V>
    where
        V: Clone,
    {
        match self.items.read_recursive().as_ref() {
            Some(map) => Snapshot::new(map.values().cloned().collect()),
            None => Snapshot::empty(),
        }
    }

    /// Returns a snapshot of all keys
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// store.put("b".to_string(), ());
    /// store.put("a".to_string(), ());
    ///
    /// let mut keys: Vec<String> = store.keys().collect();
    /// keys.sort();
    /// assert_eq!(keys, ["a", "b"]);
    /// ```
    pub fn keys(&self) -> Snapshot<K>
    where
        K: Clone,
    {
        match self.items.read_recursive().as_ref() {
            Some(map) => Snapshot::new(map.keys().cloned().collect()),
            None => Snapshot::empty(),
        }
    }

    /// Returns a snapshot of all key-value pairs
    ///
    /// Mutating the store while iterating is safe; the iterator keeps
    /// yielding the entries as they were when `iter` was called.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncStore;
    ///
    /// let store = SyncStore::new();
    /// store.put(1, "one");
    /// store.put(2, "two");
    ///
    /// for (key, _) in store.iter() {
    ///     store.remove(&key);
    /// }
    /// assert!(store.is_empty());
    /// ```
    pub fn iter(&self) -> Snapshot<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        match self.items.read_recursive().as_ref() {
            Some(map) => Snapshot::new(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            None => Snapshot::empty(),
        }
    }
}

impl<K, V> Default for SyncStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SyncStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_do_not_allocate_backing() {
        let store = SyncStore::<String, i32>::new();

        assert_eq!(store.get_current("missing"), None);
        assert!(!store.contains_key("missing"));
        assert_eq!(store.values().count(), 0);
        store.remove("missing");
        store.for_each(|_, _| panic!("empty store has no entries"));

        assert!(store.items.read().is_none());
    }

    #[test]
    fn test_preallocate_sizes_backing_once() {
        let store = SyncStore::<u32, u32>::new();
        store.preallocate(64);
        let capacity = store.items.read().as_ref().map(HashMap::capacity);
        assert!(capacity.unwrap() >= 64);

        store.put(1, 1);
        store.preallocate(4096);
        let after = store.items.read().as_ref().map(HashMap::capacity);
        assert_eq!(after, capacity);
        assert_eq!(store.get_current(&1), Some(1));
    }

    #[test]
    fn test_put_materializes_backing() {
        let store = SyncStore::new();
        store.put("k", 'v');
        assert!(store.items.read().is_some());
    }

    #[test]
    fn test_remove_keeps_backing() {
        let store = SyncStore::new();
        store.put("k", 1);
        store.remove("k");
        assert!(store.is_empty());
        assert!(store.items.read().is_some());
    }

    #[test]
    fn test_debug_reports_len() {
        let store = SyncStore::new();
        store.put(1, ());
        assert_eq!(format!("{:?}", store), "SyncStore { len: 1, .. }");
    }
}
