//! Demonstrates SyncStore as a lazily populated cache of shared clients.
//!
//! Request handlers ask for a client by tenant name. The first handler to ask
//! builds it; every other handler, even one racing on the same tenant, gets the
//! same `Arc` back.
//!
//! Run with: RUST_LOG=trace cargo run --example service_cache

use sovran_syncstore::SyncStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

static CLIENTS: SyncStore<String, Arc<TenantClient>> = SyncStore::new();
static CONNECTS: AtomicUsize = AtomicUsize::new(0);

fn main() {
    env_logger::init();

    let tenants = ["acme", "globex", "acme", "initech", "globex", "acme"];

    let handles: Vec<_> = tenants
        .into_iter()
        .enumerate()
        .map(|(request, tenant)| {
            thread::spawn(move || handle_request(request, tenant))
        })
        .collect();

    for handle in handles {
        if let Err(e) = handle.join() {
            eprintln!("Request handler panicked: {:?}", e);
        }
    }

    println!("\nClients built: {}", CONNECTS.load(Ordering::SeqCst));
    for (tenant, client) in CLIENTS.iter() {
        println!("  {} -> {} ({} requests)", tenant, client.endpoint, client.requests());
    }

    // Dropping a tenant is just a remove; a later request rebuilds it
    CLIENTS.remove("initech");
    println!("After eviction: {} clients cached", CLIENTS.len());
}

fn handle_request(request: usize, tenant: &str) {
    let client = CLIENTS.get_or_put(tenant.to_string(), || Arc::new(TenantClient::connect(tenant)));
    client.send(request);
}

// ============================================================================
// Client type - expensive to build, cheap to share
// ============================================================================

#[derive(Debug)]
struct TenantClient {
    endpoint: String,
    requests: AtomicUsize,
}

impl TenantClient {
    fn connect(tenant: &str) -> Self {
        CONNECTS.fetch_add(1, Ordering::SeqCst);
        println!("Connecting client for {}", tenant);
        Self {
            endpoint: format!("https://{}.example.internal", tenant),
            requests: AtomicUsize::new(0),
        }
    }

    fn send(&self, request: usize) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        println!("Request {} sent to {}", request, self.endpoint);
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}
