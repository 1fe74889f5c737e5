/*!
 * Tests for the run context and interrupt handler
 */

use std::time::Duration;

use revtrans::session::RunContext;
use revtrans::translation::cache::TranslationCache;

use crate::common::{context_in, create_temp_dir, store_in};

#[test]
fn test_resume_withExistingCheckpoint_shouldRestoreCache() {
    let dir = create_temp_dir().unwrap();
    let mut first = context_in(dir.path());
    first.record_translation("Bonjour", "Hello".to_string()).unwrap();
    first.checkpoint().unwrap();

    let second = RunContext::resume(store_in(dir.path()), Duration::from_secs(20)).unwrap();

    assert!(second.is_cached("Bonjour"));
    assert_eq!(second.cache().read().get("Bonjour"), Some("Hello"));
}

#[test]
fn test_isResolved_withBlankText_shouldBeTrue() {
    let dir = create_temp_dir().unwrap();
    let ctx = context_in(dir.path());

    assert!(ctx.is_resolved(""));
    assert!(ctx.is_resolved("   "));
    assert!(!ctx.is_resolved("Bonjour"));
}

#[test]
fn test_maybeCheckpoint_shouldRespectInterval() {
    let dir = create_temp_dir().unwrap();
    let mut gated = context_in(dir.path());
    gated.record_translation("Bonjour", "Hello".to_string()).unwrap();
    assert!(!gated.maybe_checkpoint().unwrap());
    assert!(!gated.store().exists());

    let mut eager = RunContext::new(TranslationCache::new(), store_in(dir.path()), Duration::ZERO);
    eager.record_translation("Merci", "Thanks".to_string()).unwrap();
    assert!(eager.maybe_checkpoint().unwrap());
    assert_eq!(eager.store().load().unwrap().originals, vec!["Merci"]);
}

#[test]
fn test_interruptHandler_handle_shouldSaveOnlyOnce() {
    let dir = create_temp_dir().unwrap();
    let ctx = context_in(dir.path());
    ctx.record_translation("Bonjour", "Hello".to_string()).unwrap();
    let handler = ctx.interrupt_handler();

    assert!(!handler.has_fired());
    assert!(handler.handle().unwrap());
    assert!(handler.has_fired());

    ctx.record_translation("Merci", "Thanks".to_string()).unwrap();
    let clone = handler.clone();
    assert!(!clone.handle().unwrap());

    assert_eq!(ctx.store().load().unwrap().originals, vec!["Bonjour"]);
}
