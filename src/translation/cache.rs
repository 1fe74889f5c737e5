/*!
 * Deduplicating translation cache.
 *
 * The cache maps original text to translated text and is the unit of
 * checkpointing: it is restored from the last snapshot at startup, appended
 * to as records are translated, and written back periodically.
 *
 * Entries are kept as two index-aligned sequences so snapshots preserve
 * insertion order; a side index gives O(1) membership checks.
 */

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;

use crate::errors::CacheError;
use super::language_gate::LanguageGate;

/// Cache handle shared between the batch processor and the interrupt handler
pub type SharedCache = Arc<RwLock<TranslationCache>>;

/// Point-in-time copy of the cache, as written to durable storage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckpointSnapshot {
    /// Original texts, in insertion order
    pub originals: Vec<String>,

    /// Translations, index-aligned with `originals`
    pub translations: Vec<String>,

    /// When the snapshot was taken
    pub saved_at: Option<DateTime<Utc>>,
}

impl CheckpointSnapshot {
    /// Number of entries in the snapshot
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Check if the snapshot holds no entries
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

/// Append-only original → translation store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationCache {
    originals: Vec<String>,
    translations: Vec<String>,
    index: HashMap<String, usize>,
}

impl TranslationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the cache in a shareable handle
    pub fn into_shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    /// Check whether an original text already has a translation
    pub fn contains(&self, original: &str) -> bool {
        self.index.contains_key(original)
    }

    /// Look up the translation for an original text
    pub fn get(&self, original: &str) -> Option<&str> {
        self.index
            .get(original)
            .map(|&i| self.translations[i].as_str())
    }

    /// Append a new entry
    ///
    /// Storing an original twice is a caller bug; the existing entry is
    /// left untouched and `CacheError::DuplicateEntry` is returned.
    pub fn put(&mut self, original: impl Into<String>, translated: impl Into<String>) -> Result<(), CacheError> {
        let original = original.into();
        if self.index.contains_key(&original) {
            return Err(CacheError::DuplicateEntry(truncate_text(&original, 40)));
        }

        let translated = translated.into();
        debug!("Cached translation for '{}'", truncate_text(&original, 30));

        self.index.insert(original.clone(), self.originals.len());
        self.originals.push(original);
        self.translations.push(translated);
        Ok(())
    }

    /// Take a point-in-time copy for checkpointing
    pub fn snapshot(&self) -> CheckpointSnapshot {
        CheckpointSnapshot {
            originals: self.originals.clone(),
            translations: self.translations.clone(),
            saved_at: Some(Utc::now()),
        }
    }

    /// Rebuild a cache from a snapshot
    pub fn restore(snapshot: CheckpointSnapshot) -> Result<Self, CacheError> {
        if snapshot.originals.len() != snapshot.translations.len() {
            return Err(CacheError::LengthMismatch {
                originals: snapshot.originals.len(),
                translations: snapshot.translations.len(),
            });
        }

        let mut cache = Self::new();
        for (original, translated) in snapshot.originals.into_iter().zip(snapshot.translations) {
            cache.put(original, translated)?;
        }
        Ok(cache)
    }

    /// Drop entries whose translation is not in the target language
    ///
    /// Catches providers that silently echo the input or answer in the
    /// wrong language. Dropped originals become unresolved again and are
    /// retried by the next pass. Pairs the classifier cannot decide on are
    /// kept. Returns the number of entries removed.
    pub fn retain_consistent(&mut self, gate: &LanguageGate) -> usize {
        let before = self.originals.len();
        let mut kept = Self::new();

        for (original, translated) in self.originals.drain(..).zip(self.translations.drain(..)) {
            match gate.classify(&translated) {
                Ok(detected) if !gate.is_target_language(&detected) => {
                    info!("Removed translation detected as {}: {}", detected, truncate_text(&translated, 60));
                }
                _ => {
                    kept.index.insert(original.clone(), kept.originals.len());
                    kept.originals.push(original);
                    kept.translations.push(translated);
                }
            }
        }

        *self = kept;
        before - self.originals.len()
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
