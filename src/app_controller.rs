use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::app_config::{Config, EscalationMode, TranslationProvider};
use crate::checkpoint::CheckpointStore;
use crate::dataset;
use crate::errors::AppError;
use crate::providers::TranslationClient;
use crate::providers::deepl::DeepL;
use crate::providers::mock::MockProvider;
use crate::session::RunContext;
use crate::translation::batch::{BatchOptions, BatchProcessor, BatchReport};
use crate::translation::cache::TranslationCache;
use crate::translation::language_gate::{HeuristicClassifier, LanguageGate};
use crate::translation::retry::{OperatorPrompt, ResumeGate, RetryingTranslator, TimedBackoff};

// Upper bound on random jitter added to timed backoff
const BACKOFF_JITTER_MS: u64 = 5_000;

/// Main application controller for review translation
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a controller from a validated configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    /// Build the translation client for the configured provider
    pub fn build_client(&self) -> Result<Arc<dyn TranslationClient>, AppError> {
        let client: Arc<dyn TranslationClient> = match self.config.effective_provider() {
            TranslationProvider::DeepL => Arc::new(DeepL::new(
                self.config.provider.api_key.clone(),
                self.config.provider.endpoint.clone(),
                self.config.provider.timeout(),
            )?),
            TranslationProvider::Mock => Arc::new(MockProvider::working()),
        };
        Ok(client)
    }

    /// Build the gate that ends an escalation pause
    pub fn build_resume_gate(&self) -> Box<dyn ResumeGate> {
        match self.config.pipeline.escalation {
            EscalationMode::Prompt => Box::new(OperatorPrompt),
            EscalationMode::Backoff => Box::new(TimedBackoff::new(
                self.config.pipeline.escalation_backoff(),
                BACKOFF_JITTER_MS,
            )),
        }
    }

    /// Build the language gate for the target language and locale markers
    pub fn build_language_gate(&self) -> LanguageGate {
        LanguageGate::new(
            Box::new(HeuristicClassifier::new()),
            self.config.target_language.clone(),
            &self.config.target_locale_markers,
        )
    }

    /// Assemble a batch processor around a client
    pub fn build_processor(&self, client: Arc<dyn TranslationClient>) -> BatchProcessor {
        let translator = RetryingTranslator::new(
            client,
            self.build_resume_gate(),
            self.config.pipeline.failure_threshold,
        );
        let options = BatchOptions {
            target_language: self.config.target_language.clone(),
            max_retry_rounds: self.config.pipeline.max_retry_rounds,
            consistency_check: self.config.pipeline.consistency_check,
        };
        BatchProcessor::new(self.build_language_gate(), translator, options)
    }

    /// Restore the run context from the checkpoint for the current mode
    pub fn open_context(&self) -> Result<RunContext> {
        let store = CheckpointStore::new(self.config.checkpoint_path());
        debug!("Checkpoint {:?}, run id {}", store.path(), store.run_id());
        let ctx = RunContext::resume(store, self.config.pipeline.checkpoint_interval())?;
        info!("Resuming with {} cached translations", ctx.cache().read().len());
        Ok(ctx)
    }

    /// Translate a dataset file and write the result
    pub async fn run(&self, ctx: &mut RunContext, input: &Path, output: &Path) -> Result<BatchReport> {
        let records = dataset::load_records(input)?;
        info!(
            "revtrans: {} records from {:?} to {} via {}",
            records.len(),
            input,
            self.config.target_language,
            self.config.effective_provider().display_name()
        );
        if self.config.test_mode {
            warn!("Test mode: using the fake translator and {:?}", self.config.checkpoint_path());
        }

        let mut processor = self
            .build_processor(self.build_client()?)
            .with_progress(Self::progress_bar(records.len()));

        let (translated, report) = processor.run(ctx, &records).await?;

        dataset::save_records(output, &translated)?;
        info!(
            "Wrote {} records to {:?} ({} translated, {} unresolved after {} retry rounds)",
            translated.len(),
            output,
            report.pass.translated + report.retry.resolved,
            report.retry.remaining,
            report.retry.rounds
        );
        Ok(report)
    }

    /// Drop checkpointed translations that are not in the target language
    ///
    /// Returns the number of entries removed.
    pub fn check(&self) -> Result<usize> {
        let store = CheckpointStore::new(self.config.checkpoint_path());
        if !store.exists() {
            warn!("No checkpoint at {:?}, nothing to check", store.path());
            return Ok(0);
        }

        let mut cache = TranslationCache::restore(store.load()?)?;
        let before = cache.len();
        let removed = cache.retain_consistent(&self.build_language_gate());
        if removed > 0 {
            store.save(&cache.snapshot())?;
        }
        info!("Consistency check: {} of {} entries removed", removed, before);
        Ok(removed)
    }

    fn progress_bar(len: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
