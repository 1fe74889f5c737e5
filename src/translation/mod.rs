/*!
 * Review translation pipeline.
 *
 * This module contains the translation logic, split into submodules:
 *
 * - `batch`: First pass, retry sweeps and output materialization
 * - `cache`: Deduplicating original → translation cache
 * - `language_gate`: Language classification and locale short-circuit
 * - `retry`: Failure counting and escalation around a provider
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchProcessor, BatchReport, PassStats, RetryReport};
pub use self::cache::{CheckpointSnapshot, SharedCache, TranslationCache};
pub use self::language_gate::{HeuristicClassifier, LanguageClassifier, LanguageGate};
pub use self::retry::{AutoResume, OperatorPrompt, ResumeGate, RetryingTranslator, TimedBackoff, TranslatorPhase};

// Submodules
pub mod batch;
pub mod cache;
pub mod language_gate;
pub mod retry;
