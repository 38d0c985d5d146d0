//! Demonstrates SyncVec as a results table filled in by worker threads.
//!
//! The table is sized up front with `init_size` so each worker writes its own
//! slot with `set`. Failures are appended to a second, growable SyncVec.
//!
//! Run with: cargo run --example job_results

use sovran_syncstore::{Error, SyncVec};
use std::sync::Arc;
use std::thread;

const JOBS: usize = 8;

fn main() -> Result<(), Error> {
    let results: Arc<SyncVec<Option<u64>>> = Arc::new(SyncVec::new());
    let failures: Arc<SyncVec<String>> = Arc::new(SyncVec::new());
    results.init_size(JOBS, JOBS);

    let handles: Vec<_> = (0..JOBS)
        .map(|job| {
            let results = Arc::clone(&results);
            let failures = Arc::clone(&failures);
            thread::spawn(move || match run_job(job) {
                Ok(value) => results.set(job, Some(value)),
                Err(reason) => failures.push(format!("job {}: {}", job, reason)),
            })
        })
        .collect();

    for handle in handles {
        if let Err(e) = handle.join() {
            eprintln!("Worker panicked: {:?}", e);
        }
    }

    println!("Results:");
    for (job, result) in results.iter() {
        match result {
            Some(value) => println!("  job {} -> {}", job, value),
            None => println!("  job {} -> (no result)", job),
        }
    }

    println!("Failures:");
    failures.for_each(|_, line| println!("  {}", line));

    // Slots past the table size are rejected instead of growing it
    match results.try_set(JOBS, Some(0)) {
        Ok(()) => println!("Unexpectedly wrote past the end"),
        Err(e) => println!("Rejected write: {}", e),
    }

    let first = results.try_get(0)?;
    println!("First slot: {:?}", first);

    Ok(())
}

fn run_job(job: usize) -> Result<u64, String> {
    if job % 5 == 4 {
        return Err("input missing".to_string());
    }
    Ok((1..=job as u64 + 1).product())
}
