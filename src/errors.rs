/*!
 * Error types for the revtrans application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota exhaustion
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors surfaced by the retrying translator
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A single translation attempt failed; the record can be retried later
    #[error("Translation failed for '{excerpt}' ({consecutive_failures} consecutive): {source}")]
    Failed {
        /// Shortened input text, for the log
        excerpt: String,
        /// Failure counter value after this attempt
        consecutive_failures: u32,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The translator is paused and could not be resumed
    #[error("Translation halted: {0}")]
    Halted(String),
}

/// Errors reading or writing the durable checkpoint
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Filesystem error
    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error
    #[error("Checkpoint database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data failed validation
    #[error("Checkpoint is corrupt: {0}")]
    Corrupt(String),
}

/// Errors from the language classifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// Text has no letters to classify
    #[error("Text contains no classifiable letters")]
    EmptyText,

    /// No language profile matched decisively
    #[error("Language could not be determined: {0}")]
    Undetermined(String),
}

/// Errors from translation cache mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The original text is already cached
    #[error("Duplicate cache entry for '{0}'")]
    DuplicateEntry(String),

    /// Snapshot sequences are not index-aligned
    #[error("Snapshot length mismatch: {originals} originals, {translations} translations")]
    LengthMismatch {
        /// Number of originals
        originals: usize,
        /// Number of translations
        translations: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the checkpoint store
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Error from the cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from language classification
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::File(error.to_string())
    }
}
