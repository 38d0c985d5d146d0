use crate::error::Error;
use crate::snapshot::Snapshot;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;

/// A thread-safe growable sequence
///
/// `SyncVec` wraps a `Vec` behind a single mutex. Like
/// [`SyncStore`](crate::SyncStore) it can be used straight from
/// [`SyncVec::new`], which is `const` and allocates nothing; the backing
/// vector appears on the first [`push`](SyncVec::push) or
/// [`init_size`](SyncVec::init_size).
///
/// Indexing past the end with [`get`](SyncVec::get) or
/// [`set`](SyncVec::set) is a bug in the caller and panics, exactly like
/// indexing a slice. Use [`try_get`](SyncVec::try_get) and
/// [`try_set`](SyncVec::try_set) when the index comes from outside.
///
/// ```
/// use sovran_syncstore::SyncVec;
/// use std::sync::Arc;
/// use std::thread;
///
/// let results = Arc::new(SyncVec::new());
/// let handles: Vec<_> = (0..4)
///     .map(|worker| {
///         let results = Arc::clone(&results);
///         thread::spawn(move || results.push(worker * 10))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// let mut seen = results.to_vec();
/// seen.sort();
/// assert_eq!(seen, vec![0, 10, 20, 30]);
/// ```
pub struct SyncVec<T> {
    items: Mutex<Option<Vec<T>>>,
}

impl<T> SyncVec<T> {
    /// Creates an empty sequence without allocating
    pub const fn new() -> Self {
        Self {
            items: parking_lot::const_mutex(None),
        }
    }

    /// Creates a sequence whose backing is allocated up front for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Some(Vec::with_capacity(capacity))),
        }
    }

    fn materialize<'a>(guard: &'a mut MutexGuard<'_, Option<Vec<T>>>) -> &'a mut Vec<T> {
        guard.get_or_insert_with(|| {
            log::trace!("Allocating sequence backing");
            Vec::new()
        })
    }

    /// Allocates `len` default elements with room for `capacity`
    ///
    /// Only the first allocation counts: once the sequence has a backing
    /// vector (from an earlier `init_size`, a `push`, or `with_capacity`)
    /// this does nothing, so it never truncates existing elements. A
    /// `capacity` below `len` is raised to `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncVec;
    ///
    /// let slots: SyncVec<u8> = SyncVec::new();
    /// slots.init_size(3, 10);
    /// slots.init_size(5, 20);
    /// assert_eq!(slots.len(), 3);
    /// ```
    pub fn init_size(&self, len: usize, capacity: usize)
    where
        T: Default,
    {
        let mut guard = self.items.lock();
        if guard.is_none() {
            log::trace!("Allocating sequence backing with {} of {} slots", len, capacity);
            let mut items = Vec::with_capacity(capacity.max(len));
            items.resize_with(len, T::default);
            *guard = Some(items);
        }
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.items.lock().as_ref().map_or(0, Vec::len)
    }

    /// Returns true if the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the capacity of the backing vector, or 0 if none exists yet
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncVec;
    ///
    /// let seq: SyncVec<u32> = SyncVec::new();
    /// assert_eq!(seq.capacity(), 0);
    ///
    /// seq.init_size(2, 16);
    /// assert!(seq.capacity() >= 16);
    /// ```
    pub fn capacity(&self) -> usize {
        self.items.lock().as_ref().map_or(0, Vec::capacity)
    }

    /// Appends `val` to the end of the sequence
    ///
    /// The backing vector is allocated on the first call and grows as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncVec;
    ///
    /// let seq = SyncVec::new();
    /// seq.push("first");
    /// seq.push("second");
    ///
    /// assert_eq!(seq.len(), 2);
    /// assert_eq!(seq.get(1), "second");
    /// ```
    pub fn push(&self, val: T) {
        let mut guard = self.items.lock();
        Self::materialize(&mut guard).push(val);
    }

    /// Returns a clone of the element at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[track_caller]
    pub fn get(&self, index: usize) -> T
    where
        T: Clone,
    {
        match self.try_get(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Replaces the element at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. Nothing is modified in that case.
    #[track_caller]
    pub fn set(&self, index: usize, val: T) {
        if let Err(err) = self.try_set(index, val) {
            panic!("{}", err);
        }
    }

    /// Returns a clone of the element at `index`, or an error if out of range
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::{Error, SyncVec};
    ///
    /// let seq = SyncVec::from(vec!['a', 'b']);
    /// assert_eq!(seq.try_get(1), Ok('b'));
    /// assert_eq!(seq.try_get(2), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
    /// ```
    pub fn try_get(&self, index: usize) -> Result<T, Error>
    where
        T: Clone,
    {
        let guard = self.items.lock();
        let items = guard.as_deref().unwrap_or_default();
        Error::check_index(index, items.len())?;
        Ok(items[index].clone())
    }

    /// Replaces the element at `index`, or returns an error if out of range
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= self.len()`. The
    /// sequence is left untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::{Error, SyncVec};
    ///
    /// let seq = SyncVec::from(vec![1, 2]);
    /// assert_eq!(seq.try_set(0, 10), Ok(()));
    /// assert_eq!(seq.try_set(2, 30), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
    /// assert_eq!(seq.to_vec(), vec![10, 2]);
    /// ```
    pub fn try_set(&self, index: usize, val: T) -> Result<(), Error> {
        let mut guard = self.items.lock();
        let items = guard.as_deref_mut().unwrap_or_default();
        Error::check_index(index, items.len())?;
        items[index] = val;
        Ok(())
    }

    /// Calls `f` with each index and element while holding the lock
    ///
    /// `f` must not call back into this sequence: that would deadlock. Use
    /// [`SyncVec::iter`] when the traversal needs to.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &T),
    {
        let guard = self.items.lock();
        for (index, value) in guard.as_deref().unwrap_or_default().iter().enumerate() {
            f(index, value);
        }
    }

    /// Copies the current elements into a plain `Vec`
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.lock().as_deref().map_or_else(Vec::new, <[T]>::to_vec)
    }

    /// Returns a snapshot of the elements
    ///
    /// The elements are copied while the lock is held and the lock is
    /// released before this returns. Later pushes or sets are not seen by the
    /// returned iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_syncstore::SyncVec;
    ///
    /// let seq = SyncVec::from(vec![1, 2, 3]);
    /// let snapshot = seq.values();
    /// seq.push(4);
    /// assert_eq!(snapshot.collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    pub fn values(&self) -> Snapshot<T>
    where
        T: Clone,
    {
        Snapshot::new(self.to_vec())
    }

    /// Returns a snapshot of `(index, element)` pairs
    pub fn iter(&self) -> Snapshot<(usize, T)>
    where
        T: Clone,
    {
        Snapshot::new(self.to_vec().into_iter().enumerate().collect())
    }
}

impl<T> Default for SyncVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for SyncVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
        }
    }
}

impl<T> FromIterator<T> for SyncVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> fmt::Debug for SyncVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncVec")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_backing() {
        let seq = SyncVec::<i32>::new();
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.capacity(), 0);
        assert_eq!(seq.to_vec(), Vec::<i32>::new());
        assert!(seq.items.lock().is_none());
    }

    #[test]
    fn test_init_size_on_populated_backing() {
        let seq = SyncVec::new();
        *seq.items.lock() = Some(vec![1, 2, 3]);

        seq.init_size(5, 10);
        assert_eq!(seq.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_init_size_capacity_below_len() {
        let seq = SyncVec::<u16>::new();
        seq.init_size(8, 2);
        assert_eq!(seq.len(), 8);
        assert!(seq.capacity() >= 8);
        assert_eq!(seq.to_vec(), vec![0; 8]);
    }

    #[test]
    fn test_emptied_backing_still_blocks_init_size() {
        let seq = SyncVec::with_capacity(4);
        seq.push(1u8);
        seq.items.lock().as_mut().unwrap().clear();

        seq.init_size(3, 3);
        assert_eq!(seq.len(), 0);
    }

    #[test]
    fn test_failed_set_leaves_lock_free() {
        let seq = SyncVec::from(vec![1]);
        assert!(seq.try_set(3, 9).is_err());
        assert!(seq.items.try_lock().is_some());
        assert_eq!(seq.to_vec(), vec![1]);
    }
}
