/*!
 * Batch translation processing.
 *
 * Runs the dataset through three stages:
 * - a first pass that translates every record's title and body once
 * - bounded retry sweeps over the records that are still unresolved
 * - materialization of the output rows from the cache
 *
 * Records whose locale hint matches the target locale are never touched.
 * Texts are looked up in the cache by exact string before anything is sent
 * to the provider, and cache mutations never span an await point.
 */

use std::fmt;

use indicatif::ProgressBar;
use log::{error, info, warn};

use crate::dataset::{Record, TranslatedRecord};
use crate::errors::{AppError, TranslationError};
use crate::session::RunContext;

use super::language_gate::LanguageGate;
use super::retry::RetryingTranslator;

/// Default number of retry sweeps after the first pass
pub const DEFAULT_MAX_RETRY_ROUNDS: u32 = 20;

/// Which column of a record is being translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Body => write!(f, "body"),
        }
    }
}

/// How a single text got resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Nothing to translate
    Blank,
    /// Already in the cache
    Cached,
    /// Already in the target language, cached as an identity pair
    SameLanguage,
    /// Sent to the provider and cached
    Translated,
}

/// Counters from the first pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Records visited
    pub records: usize,
    /// Records skipped because their locale matched the target
    pub locale_skipped: usize,
    /// Texts found in the cache
    pub cache_hits: usize,
    /// Texts that were already in the target language
    pub same_language: usize,
    /// Texts translated by the provider
    pub translated: usize,
    /// Records abandoned after a failed translation
    pub failed: usize,
}

impl PassStats {
    fn count(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Blank => {}
            Resolution::Cached => self.cache_hits += 1,
            Resolution::SameLanguage => self.same_language += 1,
            Resolution::Translated => self.translated += 1,
        }
    }
}

/// Outcome of the retry sweeps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Sweeps performed
    pub rounds: u32,
    /// Texts resolved across all sweeps
    pub resolved: usize,
    /// Records still unresolved afterwards
    pub remaining: usize,
}

/// Summary of a full run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Cache entries dropped by the consistency filter
    pub filtered: usize,
    /// First pass counters
    pub pass: PassStats,
    /// Retry sweep outcome
    pub retry: RetryReport,
}

/// Options controlling a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Target language code
    pub target_language: String,
    /// Upper bound on retry sweeps
    pub max_retry_rounds: u32,
    /// Drop cached pairs whose translation is not in the target language before starting
    pub consistency_check: bool,
}

impl BatchOptions {
    /// Options with default bounds for a target language
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            max_retry_rounds: DEFAULT_MAX_RETRY_ROUNDS,
            consistency_check: false,
        }
    }
}

/// Drives the translation of a whole dataset
pub struct BatchProcessor {
    gate: LanguageGate,
    translator: RetryingTranslator,
    options: BatchOptions,
    progress: ProgressBar,
}

impl fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("gate", &self.gate)
            .field("translator", &self.translator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(gate: LanguageGate, translator: RetryingTranslator, options: BatchOptions) -> Self {
        Self {
            gate,
            translator,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report first pass progress on the given bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run every stage and build the output rows
    pub async fn run(
        &mut self,
        ctx: &mut RunContext,
        records: &[Record],
    ) -> Result<(Vec<TranslatedRecord>, BatchReport), AppError> {
        let mut report = BatchReport::default();

        if self.options.consistency_check {
            report.filtered = ctx.filter_inconsistent(&self.gate);
            if report.filtered > 0 {
                warn!("Dropped {} cached pairs not in {}", report.filtered, self.options.target_language);
                ctx.checkpoint()?;
            }
        }

        report.pass = self.process_all(ctx, records).await?;
        let max_rounds = self.options.max_retry_rounds;
        report.retry = self.retry_unresolved(ctx, records, max_rounds).await?;

        Ok((self.materialize(ctx, records), report))
    }

    /// First pass: try every record once, in order
    ///
    /// A failed title skips the rest of its record. Failures are left for the
    /// retry sweeps; only a halted translator aborts the pass.
    pub async fn process_all(&mut self, ctx: &mut RunContext, records: &[Record]) -> Result<PassStats, AppError> {
        let mut stats = PassStats::default();
        self.progress.set_length(records.len() as u64);

        'records: for (index, record) in records.iter().enumerate() {
            self.progress.inc(1);
            stats.records += 1;

            if self.gate.locale_matches(record.locale_hint.as_deref()) {
                stats.locale_skipped += 1;
                continue;
            }

            for (field, text) in [(Field::Title, &record.title), (Field::Body, &record.body)] {
                match self.resolve(ctx, text).await {
                    Ok(resolution) => {
                        stats.count(resolution);
                        ctx.maybe_checkpoint()?;
                    }
                    Err(AppError::Translation(TranslationError::Failed { excerpt, source, .. })) => {
                        error!("Translation failed for {} of record {} [{}]: {}", field, index, excerpt, source);
                        stats.failed += 1;
                        ctx.maybe_checkpoint()?;
                        continue 'records;
                    }
                    Err(e) => return Err(Self::abort(ctx, e)),
                }
            }
        }

        self.progress.finish_and_clear();
        ctx.checkpoint()?;
        info!(
            "First pass done: {} records, {} locale skips, {} cached, {} same language, {} translated, {} failed",
            stats.records, stats.locale_skipped, stats.cache_hits, stats.same_language, stats.translated, stats.failed
        );
        Ok(stats)
    }

    /// Sweep the unresolved records again, at most `max_rounds` times
    ///
    /// Stops early once nothing is left or a sweep makes no progress.
    pub async fn retry_unresolved(
        &mut self,
        ctx: &mut RunContext,
        records: &[Record],
        max_rounds: u32,
    ) -> Result<RetryReport, AppError> {
        let mut report = RetryReport::default();

        while report.rounds < max_rounds {
            let pending = self.unresolved_indices(ctx, records);
            if pending.is_empty() {
                break;
            }

            report.rounds += 1;
            info!("Retry round {}/{}: {} records unresolved", report.rounds, max_rounds, pending.len());

            let mut resolved = 0;
            'records: for index in pending {
                let record = &records[index];
                for (field, text) in [(Field::Title, &record.title), (Field::Body, &record.body)] {
                    if ctx.is_resolved(text) {
                        continue;
                    }
                    match self.resolve(ctx, text).await {
                        Ok(_) => {
                            resolved += 1;
                            ctx.maybe_checkpoint()?;
                        }
                        Err(AppError::Translation(TranslationError::Failed { excerpt, .. })) => {
                            warn!("Retry failed for {} of record {} [{}]", field, index, excerpt);
                            continue 'records;
                        }
                        Err(e) => return Err(Self::abort(ctx, e)),
                    }
                }
            }

            ctx.checkpoint()?;
            report.resolved += resolved;

            if resolved == 0 {
                warn!("Retry round {} resolved nothing, giving up", report.rounds);
                break;
            }
        }

        report.remaining = self.unresolved_indices(ctx, records).len();
        if report.remaining > 0 {
            warn!("{} records remain untranslated after {} retry rounds", report.remaining, report.rounds);
        }
        Ok(report)
    }

    /// Build the output rows from the cache
    ///
    /// Locale-matched records are copied verbatim. Texts with no cache entry
    /// fall back to the original.
    pub fn materialize(&self, ctx: &RunContext, records: &[Record]) -> Vec<TranslatedRecord> {
        let cache = ctx.cache();
        let cache = cache.read();

        records
            .iter()
            .map(|record| {
                let (title, body) = if self.gate.locale_matches(record.locale_hint.as_deref()) {
                    (record.title.clone(), record.body.clone())
                } else {
                    (
                        cache.get(&record.title).unwrap_or(record.title.as_str()).to_string(),
                        cache.get(&record.body).unwrap_or(record.body.as_str()).to_string(),
                    )
                };
                TranslatedRecord {
                    record: record.clone(),
                    review_title_tr: title,
                    review_text_tr: body,
                }
            })
            .collect()
    }

    /// Indices of records with at least one field still unresolved
    pub fn unresolved_indices(&self, ctx: &RunContext, records: &[Record]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| !self.gate.locale_matches(record.locale_hint.as_deref()))
            .filter(|(_, record)| !ctx.is_resolved(&record.title) || !ctx.is_resolved(&record.body))
            .map(|(index, _)| index)
            .collect()
    }

    async fn resolve(&mut self, ctx: &mut RunContext, text: &str) -> Result<Resolution, AppError> {
        if text.trim().is_empty() {
            return Ok(Resolution::Blank);
        }
        if ctx.is_cached(text) {
            return Ok(Resolution::Cached);
        }

        if !self.gate.needs_translation(text) {
            ctx.record_translation(text, text.to_string())?;
            return Ok(Resolution::SameLanguage);
        }

        let translated = self
            .translator
            .safe_translate(&mut ctx.state, text, &self.options.target_language)
            .await?;
        ctx.record_translation(text, translated)?;
        Ok(Resolution::Translated)
    }

    // Save what we have before surfacing a fatal error
    fn abort(ctx: &mut RunContext, err: AppError) -> AppError {
        error!("Aborting run: {}", err);
        if let Err(save_err) = ctx.checkpoint() {
            error!("Failed to save progress before aborting: {}", save_err);
        }
        err
    }
}
