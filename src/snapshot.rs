use std::fmt;
use std::iter::FusedIterator;
use std::vec;

/// An owned iterator over a point-in-time copy of a container
///
/// Both [`SyncStore`](crate::SyncStore) and [`SyncVec`](crate::SyncVec) hand
/// out a `Snapshot` from their `values`/`iter` methods. The copy is taken
/// while the container's lock is held and the lock is released before the
/// first element is yielded, so a `Snapshot` never blocks writers and never
/// observes mutations made after it was created. Dropping it early is the
/// way to stop a traversal.
pub struct Snapshot<T> {
    items: vec::IntoIter<T>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the remaining elements as a slice
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }
}

impl<T> Iterator for Snapshot<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.items.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> DoubleEndedIterator for Snapshot<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.items.next_back()
    }
}

impl<T> ExactSizeIterator for Snapshot<T> {}

impl<T> FusedIterator for Snapshot<T> {}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&self.as_slice()).finish()
    }
}
