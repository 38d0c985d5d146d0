use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sovran_syncstore::{SyncStore, SyncVec};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 4;

fn benchmark_get_or_put_hit(c: &mut Criterion) {
    let store = SyncStore::new();
    for i in 0..1_000u32 {
        store.put(i, i);
    }

    c.bench_function("SyncStore get_or_put hit", |b| {
        b.iter(|| {
            for i in 0..1_000u32 {
                black_box(store.get_or_put(i, || unreachable!()));
            }
        });
    });
}

fn benchmark_get_or_put_contended(c: &mut Criterion) {
    c.bench_function("SyncStore get_or_put 4 threads", |b| {
        b.iter(|| {
            let store: Arc<SyncStore<u32, u32>> = Arc::new(SyncStore::new());
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..1_000u32 {
                            black_box(store.get_or_put(i, || i * 2));
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
            store
        });
    });
}

fn benchmark_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("Push Comparison");

    group.bench_function("SyncVec", |b| {
        b.iter(|| {
            let seq = SyncVec::new();
            for i in 0..10_000 {
                seq.push(black_box(i));
            }
            seq
        });
    });

    group.bench_function("SyncVec 4 threads", |b| {
        b.iter(|| {
            let seq = Arc::new(SyncVec::new());
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let seq = Arc::clone(&seq);
                    thread::spawn(move || {
                        for i in 0..10_000 / THREADS {
                            seq.push(black_box(i));
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
            seq
        });
    });

    group.bench_function("std::Vec", |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for i in 0..10_000 {
                vec.push(black_box(i));
            }
            vec
        });
    });

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    let seq: SyncVec<u64> = (0..10_000).collect();

    c.bench_function("SyncVec values snapshot", |b| {
        b.iter(|| black_box(seq.values().sum::<u64>()));
    });
}

criterion_group!(
    benches,
    benchmark_get_or_put_hit,
    benchmark_get_or_put_contended,
    benchmark_push,
    benchmark_snapshot
);
criterion_main!(benches);
