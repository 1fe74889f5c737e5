/*!
 * Failure accounting and escalation around a translation client.
 *
 * Isolated failures are reported back to the caller, which skips the text
 * and retries it in a later sweep. A run of consecutive failures usually means
 * the provider is throttling or the quota is gone; instead of burning through
 * the dataset producing errors, the translator pauses until a `ResumeGate`
 * lets it continue.
 */

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{error, info, warn};
use rand::Rng;

use crate::errors::TranslationError;
use crate::providers::TranslationClient;
use crate::session::RunState;
use super::cache::truncate_text;

/// Default number of consecutive failures before escalation
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Acknowledgment step that ends an escalation pause
#[async_trait]
pub trait ResumeGate: Send + Sync + Debug {
    /// Block until translation may continue
    async fn wait_for_resume(&self, consecutive_failures: u32) -> Result<()>;
}

/// Waits for the operator to press Enter on stdin
#[derive(Debug, Default)]
pub struct OperatorPrompt;

#[async_trait]
impl ResumeGate for OperatorPrompt {
    async fn wait_for_resume(&self, consecutive_failures: u32) -> Result<()> {
        error!(
            "{} consecutive failures: the provider is probably rate limiting. Press Enter to resume.",
            consecutive_failures
        );

        let read = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)
        })
        .await
        .map_err(|e| anyhow!("Operator prompt task failed: {}", e))??;

        if read == 0 {
            return Err(anyhow!("stdin closed while waiting for operator acknowledgment"));
        }
        Ok(())
    }
}

/// Sleeps for a fixed duration plus random jitter, for unattended runs
#[derive(Debug, Clone)]
pub struct TimedBackoff {
    base: Duration,
    max_jitter_ms: u64,
}

impl TimedBackoff {
    /// Create a backoff gate
    pub fn new(base: Duration, max_jitter_ms: u64) -> Self {
        Self { base, max_jitter_ms }
    }

    /// Pick the actual wait for one escalation
    pub fn delay(&self) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.max_jitter_ms)
        };
        self.base + Duration::from_millis(jitter)
    }
}

#[async_trait]
impl ResumeGate for TimedBackoff {
    async fn wait_for_resume(&self, consecutive_failures: u32) -> Result<()> {
        let delay = self.delay();
        warn!(
            "{} consecutive failures, backing off for {:.1}s before resuming",
            consecutive_failures,
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Resumes immediately and records how often it was asked
#[derive(Debug, Clone, Default)]
pub struct AutoResume {
    calls: Arc<AtomicUsize>,
}

impl AutoResume {
    /// Create a new auto-resume gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of escalations acknowledged
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResumeGate for AutoResume {
    async fn wait_for_resume(&self, _consecutive_failures: u32) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Translator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorPhase {
    /// Accepting translation requests
    Active,
    /// Escalated; waiting for `resume`
    Paused {
        /// Failure count that triggered the pause
        consecutive_failures: u32,
    },
}

/// Translation client wrapper with failure counting and escalation
#[derive(Debug)]
pub struct RetryingTranslator {
    client: Arc<dyn TranslationClient>,
    gate: Box<dyn ResumeGate>,
    failure_threshold: u32,
    phase: TranslatorPhase,
}

impl RetryingTranslator {
    /// Create a new retrying translator
    pub fn new(client: Arc<dyn TranslationClient>, gate: Box<dyn ResumeGate>, failure_threshold: u32) -> Self {
        Self {
            client,
            gate,
            failure_threshold: failure_threshold.max(1),
            phase: TranslatorPhase::Active,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TranslatorPhase {
        self.phase
    }

    /// Leave the paused state and clear the failure counter
    pub fn resume(&mut self, state: &mut RunState) {
        if let TranslatorPhase::Paused { consecutive_failures } = self.phase {
            info!("Resuming translation after {} consecutive failures", consecutive_failures);
        }
        state.consecutive_failures = 0;
        self.phase = TranslatorPhase::Active;
    }

    /// Translate one text, updating the run's failure bookkeeping
    pub async fn safe_translate(
        &mut self,
        state: &mut RunState,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if let TranslatorPhase::Paused { consecutive_failures } = self.phase {
            return Err(TranslationError::Halted(format!(
                "translator paused after {} consecutive failures",
                consecutive_failures
            )));
        }

        info!("Translating: {}", truncate_text(text, 80));

        match self.client.translate(text, target_language).await {
            Ok(translated) => {
                state.consecutive_failures = 0;
                info!("Complete: {}", truncate_text(&translated, 80));
                Ok(translated)
            }
            Err(source) => {
                state.consecutive_failures += 1;
                let failures = state.consecutive_failures;
                let excerpt = truncate_text(text, 60);
                error!("Error translating [{}] ({} consecutive): {}", excerpt, failures, source);

                if failures >= self.failure_threshold {
                    self.escalate(state, failures).await?;
                }

                Err(TranslationError::Failed {
                    excerpt,
                    consecutive_failures: failures,
                    source,
                })
            }
        }
    }

    async fn escalate(&mut self, state: &mut RunState, failures: u32) -> Result<(), TranslationError> {
        self.phase = TranslatorPhase::Paused { consecutive_failures: failures };
        state.escalations += 1;
        error!("Consecutive failures: API call limit likely reached, translation paused");

        match self.gate.wait_for_resume(failures).await {
            Ok(()) => {
                self.resume(state);
                Ok(())
            }
            Err(e) => Err(TranslationError::Halted(e.to_string())),
        }
    }
}
