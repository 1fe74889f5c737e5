/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for translation backends:
 * - DeepL: DeepL-compatible REST API
 * - Mock: deterministic in-process provider for test mode and tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// One text per call. Implementations never retry on their own; retry and
/// escalation policy lives in `translation::retry`.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Translate a single text into the target language
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `target_language` - ISO language code of the desired output
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;
}

pub mod deepl;
pub mod mock;
