//! Per-client fixed-window admission control.
//!
//! Every client key owns a counter and a timer task. The timer zeroes the
//! counter once per window, counting from the client's first request, so
//! clients never reset in lockstep. A sweep task drops clients whose counter
//! is zero, which bounds the registry to recently active clients.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};
use crate::config::AdmissionConfig;
use crate::error::ConfigError;
use crate::metrics::{CLIENTS_EVICTED, REQUEST_DENIED, REQUEST_TOTAL, TRACKED_CLIENTS};

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

// Counter state of one client
struct ClientCounter {
    count: Arc<AtomicU64>,
    expiry: AbortHandle,
}

impl ClientCounter {
    // The timer only holds the count cell, never the registry, so a firing
    // that races an eviction cannot touch whatever later reuses the key.
    fn start(runtime: &Handle, window: Duration) -> Self {
        let count = Arc::new(AtomicU64::new(0));
        let cell = Arc::clone(&count);
        let expiry = runtime
            .spawn(async move {
                loop {
                    tokio::time::sleep(window).await;
                    cell.store(0, Ordering::Relaxed);
                }
            })
            .abort_handle();

        Self { count, expiry }
    }

    // Returns the post-increment value
    fn hit(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn current(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn is_idle(&self) -> bool {
        self.current() == 0
    }
}

impl Drop for ClientCounter {
    fn drop(&mut self) {
        self.expiry.abort();
    }
}

/// Shared admission controller.
///
/// Build one per service with [`AdmissionController::new`] and hand the
/// returned `Arc` to whatever handles requests. Calls for different keys
/// only meet on a [`DashMap`] shard lock and never on a global one.
///
/// The check is increment-then-compare: under a burst racing a window reset
/// a client can get slightly more than `limit` requests through in one
/// window. Requests are never lost or counted twice.
pub struct AdmissionController {
    registry: DashMap<String, ClientCounter>,
    limit: u64,
    window: Duration,
    runtime: Handle,
    sweeper: AbortHandle,
}

impl AdmissionController {
    /// Validates `config` and starts the sweep task on the current tokio
    /// runtime. The first sweep runs one `sweep_interval` from now.
    pub fn new(config: AdmissionConfig) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let controller = Arc::new_cyclic(|this: &Weak<Self>| {
            let sweeper = runtime
                .spawn(sweep_loop(this.clone(), config.sweep_interval))
                .abort_handle();

            Self {
                registry: DashMap::new(),
                limit: u64::from(config.limit),
                window: config.window,
                runtime,
                sweeper,
            }
        });

        info!(
            limit = config.limit,
            window = ?config.window,
            sweep_interval = ?config.sweep_interval,
            "Admission controller started"
        );
        Ok(controller)
    }

    /// Counts one request for `client_key` and decides whether it may pass.
    ///
    /// Rejected requests still count towards the window. Never blocks on
    /// I/O, and may be called from any thread.
    pub fn admit(&self, client_key: &str) -> Decision {
        REQUEST_TOTAL.inc();

        // The increment happens under the shard lock, so the sweep can't
        // evict the entry between lookup and count.
        let seen = if let Some(counter) = self.registry.get(client_key) {
            counter.hit()
        } else {
            self.registry
                .entry(client_key.to_owned())
                .or_insert_with(|| ClientCounter::start(&self.runtime, self.window))
                .hit()
        };

        if seen > self.limit {
            REQUEST_DENIED.inc();
            debug!(client = client_key, count = seen, limit = self.limit, "Request denied");
            return Decision::Deny;
        }

        Decision::Allow
    }

    /// Number of clients currently in the registry.
    pub fn tracked_clients(&self) -> usize {
        self.registry.len()
    }

    /// Requests counted for `client_key` in its current window, if tracked.
    pub fn request_count(&self, client_key: &str) -> Option<u64> {
        self.registry.get(client_key).map(|counter| counter.current())
    }

    /// Stops the sweep and every client timer and forgets all clients.
    ///
    /// Meant for service shutdown; it is also what dropping the last `Arc`
    /// does.
    pub fn shutdown(&self) {
        self.sweeper.abort();
        self.registry.clear();
        TRACKED_CLIENTS.set(0.0);
        info!("Admission controller stopped");
    }

    // Removes every client with an empty window. Dropping a removed counter
    // aborts its timer while the shard lock is still held.
    pub(crate) fn sweep(&self) -> usize {
        let mut evicted = 0;
        self.registry.retain(|_, counter| {
            if counter.is_idle() {
                evicted += 1;
                false
            } else {
                true
            }
        });

        let remaining = self.registry.len();
        CLIENTS_EVICTED.inc_by(evicted as f64);
        TRACKED_CLIENTS.set(remaining as f64);
        if evicted > 0 {
            debug!(evicted, remaining, "Swept idle clients");
        }
        evicted
    }
}

impl Drop for AdmissionController {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

// Holds only a weak reference so dropping the controller ends the loop
async fn sweep_loop(controller: Weak<AdmissionController>, every: Duration) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(controller) = controller.upgrade() else {
            break;
        };
        controller.sweep();
    }
}
