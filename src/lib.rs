/*!
 * # revtrans - Checkpointed review translation
 *
 * A Rust library for translating datasets of product reviews through a
 * machine-translation API, built to survive rate limits and interruptions.
 *
 * ## Features
 *
 * - Skip records whose location already matches the target locale
 * - Skip texts that are already in the target language
 * - Deduplicating cache so identical texts are translated once
 * - Durable SQLite checkpoints, restored on the next run
 * - Escalation after repeated failures (operator prompt or timed backoff)
 * - Bounded retry sweeps over unresolved records
 * - Graceful Ctrl-C handling that saves progress
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Wiring from configuration to a translation run
 * - `dataset`: Review dataset loading and writing
 * - `translation`: The translation pipeline:
 *   - `translation::batch`: First pass, retry sweeps and output rows
 *   - `translation::cache`: Deduplicating translation cache
 *   - `translation::language_gate`: Language classification and locale checks
 *   - `translation::retry`: Failure counting and escalation
 * - `checkpoint`: SQLite snapshot storage
 * - `session`: Per-run state and interrupt handling
 * - `providers`: Translation API clients:
 *   - `providers::deepl`: DeepL REST client
 *   - `providers::mock`: Offline fake translator
 * - `language_utils`: ISO language code utilities
 * - `logging`: Console and file logger
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod checkpoint;
pub mod dataset;
pub mod errors;
pub mod language_utils;
pub mod logging;
pub mod providers;
pub mod session;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use checkpoint::CheckpointStore;
pub use dataset::{Record, TranslatedRecord};
pub use errors::{AppError, CacheError, CheckpointError, ClassificationError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use session::{InterruptHandler, RunContext, RunState};
pub use translation::{BatchProcessor, LanguageGate, RetryingTranslator, TranslationCache};
