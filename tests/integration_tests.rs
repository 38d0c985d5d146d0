use sovran_syncstore::{SyncStore, SyncVec};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

static REGISTRY: SyncStore<&str, usize> = SyncStore::new();
static LOG: SyncVec<String> = SyncVec::new();

#[test]
fn test_end_to_end_scenario() {
    let store: SyncStore<&str, i32> = SyncStore::new();

    store.put("a", 1);
    store.put("b", 2);
    assert_eq!(store.get_current("a"), Some(1));

    store.remove("a");
    assert_eq!(store.get_current("a"), None);
    assert_eq!(store.get_current("b"), Some(2));
}

#[test]
fn test_static_containers() {
    REGISTRY.put("workers", 4);
    assert_eq!(REGISTRY.get_or_put("workers", || 0), 4);
    assert_eq!(REGISTRY.get_or_put("retries", || 3), 3);

    LOG.push("started".to_string());
    assert!(LOG.values().any(|line| line == "started"));
}

/// Workers share a cache of computed results and append what they finish to a
/// shared log, mirroring a job runner that deduplicates work.
#[test]
fn test_cache_and_log_together() {
    const WORKERS: usize = 8;
    const JOBS: usize = 20;

    let cache: Arc<SyncStore<usize, u64>> = Arc::new(SyncStore::new());
    let finished: Arc<SyncVec<(usize, usize)>> = Arc::new(SyncVec::new());
    let computations = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(WORKERS));

    cache.preallocate(JOBS);

    let mut handles = vec![];
    for worker in 0..WORKERS {
        let cache = Arc::clone(&cache);
        let finished = Arc::clone(&finished);
        let computations = Arc::clone(&computations);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for job in 0..JOBS {
                let result = cache.get_or_put(job, || {
                    computations.fetch_add(1, Ordering::SeqCst);
                    (job as u64).pow(2)
                });
                assert_eq!(result, (job as u64).pow(2));
                finished.push((worker, job));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Each job computed once no matter how many workers asked for it
    assert_eq!(computations.load(Ordering::SeqCst), JOBS);
    assert_eq!(cache.len(), JOBS);
    assert_eq!(finished.len(), WORKERS * JOBS);

    // Every worker logged every job
    for worker in 0..WORKERS {
        let done = finished.values().filter(|(w, _)| *w == worker).count();
        assert_eq!(done, JOBS);
    }
}

#[test]
fn test_writing_back_while_iterating() {
    let store: SyncStore<String, u32> = SyncStore::new();
    store.put("a".to_string(), 1);
    store.put("b".to_string(), 2);

    // Snapshot iteration holds no lock, so writing into the store is allowed
    for (key, value) in store.iter() {
        store.put(format!("{}{}", key, key), value * 10);
    }

    assert_eq!(store.len(), 4);
    assert_eq!(store.get_current("aa"), Some(10));
    assert_eq!(store.get_current("bb"), Some(20));
}

#[test]
fn test_containers_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<SyncStore<String, Vec<u8>>>();
    assert_send_sync::<SyncVec<String>>();
    assert_send_sync::<sovran_syncstore::Snapshot<String>>();
}
