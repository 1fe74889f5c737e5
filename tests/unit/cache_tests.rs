/*!
 * Tests for translation cache functionality
 */

use revtrans::errors::CacheError;
use revtrans::translation::cache::{CheckpointSnapshot, TranslationCache};
use revtrans::translation::language_gate::LanguageGate;

#[test]
fn test_put_withNewEntry_shouldBeRetrievable() {
    let mut cache = TranslationCache::new();
    cache.put("Bonjour", "Hello").unwrap();

    assert!(cache.contains("Bonjour"));
    assert_eq!(cache.get("Bonjour"), Some("Hello"));
    assert_eq!(cache.get("Salut"), None);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_put_withSameOriginalTwice_shouldStoreOnce() {
    let mut cache = TranslationCache::new();
    cache.put("Bonjour", "Hello").unwrap();

    let second = cache.put("Bonjour", "Good morning");

    assert_eq!(second, Err(CacheError::DuplicateEntry("Bonjour".to_string())));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("Bonjour"), Some("Hello"));
}

#[test]
fn test_snapshot_shouldPreserveInsertionOrder() {
    let mut cache = TranslationCache::new();
    cache.put("c", "3").unwrap();
    cache.put("a", "1").unwrap();
    cache.put("b", "2").unwrap();

    let snapshot = cache.snapshot();

    assert_eq!(snapshot.originals, vec!["c", "a", "b"]);
    assert_eq!(snapshot.translations, vec!["3", "1", "2"]);
}

#[test]
fn test_restore_withSnapshot_shouldRebuildLookups() {
    let snapshot = CheckpointSnapshot {
        originals: vec!["Bonjour".into(), "Merci".into()],
        translations: vec!["Hello".into(), "Thanks".into()],
        saved_at: None,
    };

    let cache = TranslationCache::restore(snapshot).unwrap();

    assert_eq!(cache.get("Merci"), Some("Thanks"));
    let restored = cache.snapshot();
    assert_eq!(restored.originals, vec!["Bonjour", "Merci"]);
    assert_eq!(restored.translations, vec!["Hello", "Thanks"]);
}

#[test]
fn test_restore_withDuplicateOriginals_shouldFail() {
    let snapshot = CheckpointSnapshot {
        originals: vec!["Bonjour".into(), "Bonjour".into()],
        translations: vec!["Hello".into(), "Hi".into()],
        saved_at: None,
    };

    let result = TranslationCache::restore(snapshot);

    assert_eq!(result, Err(CacheError::DuplicateEntry("Bonjour".to_string())));
}

#[test]
fn test_retainConsistent_shouldDropWrongLanguageTranslations() {
    let gate = LanguageGate::with_defaults("en");
    let mut cache = TranslationCache::new();
    cache.put("Bonjour", "Hello").unwrap();
    cache.put("Le produit est bon", "Le produit est bon").unwrap();
    cache.put("Sehr gut", "Very good").unwrap();

    let removed = cache.retain_consistent(&gate);

    assert_eq!(removed, 1);
    assert!(!cache.contains("Le produit est bon"));
    assert_eq!(cache.snapshot().originals, vec!["Bonjour", "Sehr gut"]);
}

#[test]
fn test_retainConsistent_withUndecidableTranslation_shouldKeepPair() {
    let gate = LanguageGate::with_defaults("en");
    let mut cache = TranslationCache::new();
    cache.put("Xyzzy", "Qwerty").unwrap();
    cache.put("12345", "12345").unwrap();

    assert_eq!(cache.retain_consistent(&gate), 0);
    assert_eq!(cache.len(), 2);
}
