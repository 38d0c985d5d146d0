//! # sovran-syncstore
//!
//! Thread-safe generic containers that work from their empty state.
//!
//! `sovran-syncstore` provides two small containers for sharing in-memory state
//! between threads without wiring up locks by hand:
//!
//! - [`SyncStore<K, V>`]: a keyed store behind a readers-writer lock, with
//!   deferred construction via [`SyncStore::get_or_put`]
//! - [`SyncVec<T>`]: a growable sequence behind a mutex
//!
//! ## Key Features
//!
//! - **Zero setup**: `new()` is a `const fn` and allocates nothing, so either
//!   container can live in a `static`
//! - **Construct once**: racing `get_or_put` callers run the factory exactly once
//! - **Snapshot iteration**: `values()`/`iter()` copy under the lock and release
//!   it before yielding, so iterating never blocks writers
//! - **Plain values**: lookups return `Option`, never a lock error;
//!   `parking_lot` locks cannot be poisoned
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_syncstore::SyncStore;
//!
//! let store = SyncStore::new();
//! store.put("a", 1);
//! store.put("b", 2);
//!
//! assert_eq!(store.get_current("a"), Some(1));
//!
//! store.remove("a");
//! assert_eq!(store.get_current("a"), None);
//! assert_eq!(store.get_current("b"), Some(2));
//!
//! // Removing something that isn't there is fine
//! store.remove("a");
//! ```
//!
//! ### Building Expensive Values Once
//!
//! ```rust
//! use sovran_syncstore::SyncStore;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let connections: Arc<SyncStore<String, Arc<String>>> = Arc::new(SyncStore::new());
//! let opened = Arc::new(AtomicUsize::new(0));
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|_| {
//!         let connections = Arc::clone(&connections);
//!         let opened = Arc::clone(&opened);
//!         thread::spawn(move || {
//!             connections.get_or_put("db".to_string(), || {
//!                 opened.fetch_add(1, Ordering::SeqCst);
//!                 Arc::new("postgres://localhost".to_string())
//!             })
//!         })
//!     })
//!     .collect();
//!
//! let conns: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
//! assert_eq!(opened.load(Ordering::SeqCst), 1);
//! assert!(conns.iter().all(|c| Arc::ptr_eq(c, &conns[0])));
//! ```
//!
//! ### Static Containers
//!
//! ```rust
//! use sovran_syncstore::{SyncStore, SyncVec};
//!
//! static EVENTS: SyncVec<&str> = SyncVec::new();
//! static COUNTERS: SyncStore<&str, u64> = SyncStore::new();
//!
//! fn record(event: &'static str) {
//!     EVENTS.push(event);
//!     COUNTERS.get_or_put(event, || 0);
//!     COUNTERS.with_mut(event, |n| *n += 1);
//! }
//!
//! record("login");
//! record("login");
//! record("logout");
//!
//! assert_eq!(EVENTS.len(), 3);
//! assert_eq!(COUNTERS.get_current("login"), Some(2));
//! ```
//!
//! ### Index Errors
//!
//! ```rust
//! use sovran_syncstore::{Error, SyncVec};
//!
//! let seq = SyncVec::from(vec![10, 20]);
//! assert_eq!(seq.get(1), 20);
//!
//! match seq.try_get(2) {
//!     Ok(value) => println!("Value: {}", value),
//!     Err(Error::IndexOutOfBounds { index, len }) => {
//!         println!("{} is past the end ({} elements)", index, len)
//!     }
//! }
//! ```
//!
//! ## Locking Rules
//!
//! Operations on one container are serialized by its single lock. Closures
//! passed to [`SyncStore::with_mut`], [`SyncStore::get_or_put`] and
//! [`SyncVec::for_each`] run while that lock is held exclusively, so they must
//! not call back into the same container at all. Closures passed to
//! [`SyncStore::for_each`] and [`SyncStore::with`] hold the store's lock in
//! shared mode: they may read from the store but must not mutate it. The
//! [`Snapshot`] iterators hold no lock and have no such restriction.

mod error;
mod snapshot;
mod store;
mod vec;

pub use error::Error;
pub use snapshot::Snapshot;
pub use store::SyncStore;
pub use vec::SyncVec;
