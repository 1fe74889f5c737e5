/*!
 * Per-run translation state.
 *
 * This module handles:
 * - Restoring the cache from the last checkpoint
 * - Tracking failure counters for the retrying translator
 * - Time-gated and unconditional checkpoint writes
 * - Building the interrupt handler that shares the run's cache
 */

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::checkpoint::CheckpointStore;
use crate::errors::{AppError, CacheError};
use crate::translation::cache::{SharedCache, TranslationCache};
use crate::translation::language_gate::LanguageGate;

pub mod interrupt;

pub use interrupt::InterruptHandler;

/// Mutable counters for one run
#[derive(Debug, Clone)]
pub struct RunState {
    /// Failures since the last successful translation
    pub consecutive_failures: u32,
    /// Number of times the translator escalated
    pub escalations: u32,
    /// When the cache was last written to disk
    pub last_checkpoint: Instant,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            consecutive_failures: 0,
            escalations: 0,
            last_checkpoint: Instant::now(),
        }
    }
}

/// Everything a run carries between pipeline stages
#[derive(Debug)]
pub struct RunContext {
    cache: SharedCache,
    store: CheckpointStore,
    checkpoint_interval: Duration,
    /// Failure and checkpoint bookkeeping
    pub state: RunState,
}

impl RunContext {
    /// Create a context around an existing cache
    pub fn new(cache: TranslationCache, store: CheckpointStore, checkpoint_interval: Duration) -> Self {
        Self {
            cache: cache.into_shared(),
            store,
            checkpoint_interval,
            state: RunState::default(),
        }
    }

    /// Restore the cache from the store's last checkpoint
    pub fn resume(store: CheckpointStore, checkpoint_interval: Duration) -> Result<Self, AppError> {
        let snapshot = store.load()?;
        if let Some(saved_at) = snapshot.saved_at {
            info!(
                "Resuming from checkpoint saved at {} ({} entries)",
                saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
                snapshot.len()
            );
        }
        let cache = TranslationCache::restore(snapshot)?;
        Ok(Self::new(cache, store, checkpoint_interval))
    }

    /// Shared handle to the run's cache
    pub fn cache(&self) -> SharedCache {
        self.cache.clone()
    }

    /// The checkpoint store used by this run
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Check whether a text already has a cache entry
    pub fn is_cached(&self, text: &str) -> bool {
        self.cache.read().contains(text)
    }

    /// Check whether a text needs no further work
    ///
    /// Blank texts are never sent to the provider and count as resolved.
    pub fn is_resolved(&self, text: &str) -> bool {
        text.trim().is_empty() || self.is_cached(text)
    }

    /// Store a finished translation
    pub fn record_translation(&self, original: &str, translated: String) -> Result<(), CacheError> {
        self.cache.write().put(original, translated)
    }

    /// Run the consistency filter over the cache, returning how many entries were dropped
    pub fn filter_inconsistent(&self, gate: &LanguageGate) -> usize {
        self.cache.write().retain_consistent(gate)
    }

    /// Handler that writes this run's cache on interrupt
    pub fn interrupt_handler(&self) -> InterruptHandler {
        InterruptHandler::new(self.cache(), self.store.clone())
    }

    /// Write the cache to disk now
    pub fn checkpoint(&mut self) -> Result<(), AppError> {
        let snapshot = self.cache.read().snapshot();
        self.store.save(&snapshot)?;
        self.state.last_checkpoint = Instant::now();
        Ok(())
    }

    /// Write the cache if the checkpoint interval has elapsed
    ///
    /// Returns whether a checkpoint was written.
    pub fn maybe_checkpoint(&mut self) -> Result<bool, AppError> {
        if self.state.last_checkpoint.elapsed() < self.checkpoint_interval {
            return Ok(false);
        }
        debug!("Checkpoint interval elapsed");
        self.checkpoint()?;
        Ok(true)
    }
}
