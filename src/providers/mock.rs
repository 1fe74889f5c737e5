/*!
 * Mock provider implementations for test mode and tests.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a fake translation
 * - `MockProvider::intermittent(n)` - Fails every Nth request
 * - `MockProvider::fail_first(n)` - Fails the first N requests, then works
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::TranslationClient;

/// Mock request passed to custom response generators
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then succeeds
    FailFirst { failures: usize },
    /// Succeeds only on every Nth request
    SucceedEvery { n: usize },
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Texts received, in order
    requests: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a mock provider that fails its first `failures` requests
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create a mock provider that succeeds only on every Nth request
    pub fn succeed_every(n: usize) -> Self {
        Self::new(MockBehavior::SucceedEvery { n: n.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// The fake translation produced when no custom generator is set
    ///
    /// Known target languages get a stock sentence in that language, so the
    /// result passes the language gate like a real translation would. The
    /// source length is kept in the marker.
    pub fn fake_translation(request: &MockRequest) -> String {
        let lang = &request.target_language;
        match Self::stock_sentence(lang) {
            Some(sentence) => format!(
                "{} [fake translation to {}, {} chars]",
                sentence,
                lang,
                request.text.chars().count()
            ),
            None => format!("{} [fake translation to {}]", request.text, lang),
        }
    }

    fn stock_sentence(target_language: &str) -> Option<&'static str> {
        let primary = target_language.split(['-', '_']).next().unwrap_or_default().to_lowercase();
        let sentence = match primary.as_str() {
            "en" => "This is the text of the review in English",
            "fr" => "Ceci est le texte de la critique en français",
            "de" => "Das ist der Text der Bewertung auf Deutsch",
            "es" => "Este es el texto de la reseña y está en español",
            "it" => "Questo è il testo della recensione che non è in inglese",
            "pt" => "Este é o texto da avaliação em português",
            "nl" => "Dit is de tekst van de recensie en het is niet in het Engels",
            "ru" => "Это перевод отзыва на русский язык для проверки",
            "ja" => "これはレビューの翻訳です",
            _ => return None,
        };
        Some(sentence)
    }

    fn respond(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::fake_translation(request),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationClient for MockProvider {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(text.to_string());

        let request = MockRequest {
            text: text.to_string(),
            target_language: target_language.to_string(),
        };

        let fails = match self.behavior {
            MockBehavior::Working => false,
            MockBehavior::Intermittent { fail_every } => count % fail_every == fail_every - 1,
            MockBehavior::FailFirst { failures } => count < failures,
            MockBehavior::SucceedEvery { n } => count % n != n - 1,
            MockBehavior::Failing => true,
        };

        if fails {
            return Err(ProviderError::ApiError {
                message: format!("Simulated provider failure (request #{})", count + 1),
                status_code: 503,
            });
        }

        Ok(self.respond(&request))
    }
}
