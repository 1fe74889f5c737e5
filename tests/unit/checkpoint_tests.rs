/*!
 * Tests for checkpoint storage
 */

use revtrans::checkpoint::CheckpointStore;
use revtrans::translation::cache::{CheckpointSnapshot, TranslationCache};

use crate::common::{create_temp_dir, store_in};

fn snapshot_of(pairs: &[(&str, &str)]) -> CheckpointSnapshot {
    let mut cache = TranslationCache::new();
    for (original, translation) in pairs {
        cache.put(*original, *translation).unwrap();
    }
    cache.snapshot()
}

#[test]
fn test_saveThenLoad_shouldPreserveEntriesAndOrder() {
    let dir = create_temp_dir().unwrap();
    let store = store_in(dir.path());
    let snapshot = snapshot_of(&[("Sehr gut", "Very good"), ("Bonjour", "Hello"), ("Merci", "Thanks")]);

    store.save(&snapshot).unwrap();
    let loaded = store.load().unwrap();

    assert!(store.exists());
    assert_eq!(loaded.originals, snapshot.originals);
    assert_eq!(loaded.translations, snapshot.translations);
    assert!(loaded.saved_at.is_some());
}

#[test]
fn test_save_withEmptySnapshot_shouldLoadEmpty() {
    let dir = create_temp_dir().unwrap();
    let store = store_in(dir.path());

    store.save(&CheckpointSnapshot::default()).unwrap();

    assert!(store.exists());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_save_twice_shouldReplacePreviousCheckpoint() {
    let dir = create_temp_dir().unwrap();
    let store = store_in(dir.path());

    store.save(&snapshot_of(&[("a", "1"), ("b", "2")])).unwrap();
    store.save(&snapshot_of(&[("c", "3")])).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.originals, vec!["c"]);
    assert_eq!(loaded.translations, vec!["3"]);
}

#[test]
fn test_load_fromAnotherStore_shouldSeeSameEntries() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("progress.db");
    let writer = CheckpointStore::new(&path);
    writer.save(&snapshot_of(&[("Bonjour", "Hello")])).unwrap();

    let reader = CheckpointStore::new(&path);

    assert_ne!(writer.run_id(), reader.run_id());
    assert_eq!(reader.load().unwrap().originals, vec!["Bonjour"]);
}

#[test]
fn test_save_withMisalignedSnapshot_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let store = store_in(dir.path());
    let snapshot = CheckpointSnapshot {
        originals: vec!["a".into(), "b".into()],
        translations: vec!["1".into()],
        saved_at: None,
    };

    assert!(store.save(&snapshot).is_err());
    assert!(store.load().unwrap().is_empty());
}
