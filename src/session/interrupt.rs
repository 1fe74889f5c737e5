/*!
 * Interrupt handling.
 *
 * The binary races the pipeline against `InterruptHandler::wait`. Cache
 * mutations never span an await point, so when Ctrl-C wins the race the cache
 * is consistent and can be snapshotted directly.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::errors::CheckpointError;
use crate::translation::cache::SharedCache;

/// Writes a final checkpoint when the operator stops the run
#[derive(Debug, Clone)]
pub struct InterruptHandler {
    cache: SharedCache,
    store: CheckpointStore,
    fired: Arc<AtomicBool>,
}

impl InterruptHandler {
    /// Create a handler for the given cache and store
    pub fn new(cache: SharedCache, store: CheckpointStore) -> Self {
        Self {
            cache,
            store,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wait for the operator's termination signal
    pub async fn wait(&self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }

    /// Whether the handler has already run
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Save progress once
    ///
    /// Returns `Ok(false)` without touching the checkpoint if a previous
    /// call already handled the interrupt.
    pub fn handle(&self) -> Result<bool, CheckpointError> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        log::logger().flush();
        warn!("{}", "*".repeat(40));
        warn!("Program interrupted, saving progress...");

        let snapshot = self.cache.read().snapshot();
        self.store.save(&snapshot)?;

        info!("Progress saved ({} entries), exiting", snapshot.len());
        log::logger().flush();
        Ok(true)
    }
}
