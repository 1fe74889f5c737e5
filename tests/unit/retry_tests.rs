/*!
 * Tests for failure counting and escalation in the retrying translator
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use revtrans::errors::TranslationError;
use revtrans::providers::mock::MockProvider;
use revtrans::session::RunState;
use revtrans::translation::retry::{AutoResume, ResumeGate, RetryingTranslator, TimedBackoff, TranslatorPhase};

use crate::common::mock_providers::ScriptedClient;

/// Gate that refuses to resume
#[derive(Debug)]
struct ClosedGate;

#[async_trait]
impl ResumeGate for ClosedGate {
    async fn wait_for_resume(&self, _consecutive_failures: u32) -> anyhow::Result<()> {
        Err(anyhow!("operator went away"))
    }
}

#[tokio::test]
async fn test_safeTranslate_withSuccess_shouldResetCounter() {
    let client = ScriptedClient::new(vec![Err(503), Err(503), Ok("Hello")]);
    let mut translator = RetryingTranslator::new(Arc::new(client.clone()), Box::new(AutoResume::new()), 5);
    let mut state = RunState::default();

    assert!(translator.safe_translate(&mut state, "Bonjour", "en").await.is_err());
    assert!(translator.safe_translate(&mut state, "Bonjour", "en").await.is_err());
    assert_eq!(state.consecutive_failures, 2);

    let text = translator.safe_translate(&mut state, "Bonjour", "en").await.unwrap();

    assert_eq!(text, "Hello");
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(state.escalations, 0);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_safeTranslate_withFiveFailures_shouldEscalateOnceThenRecover() {
    let gate = AutoResume::new();
    let provider = Arc::new(MockProvider::fail_first(5));
    let mut translator = RetryingTranslator::new(provider.clone(), Box::new(gate.clone()), 5);
    let mut state = RunState::default();

    for attempt in 1..=4 {
        let err = translator.safe_translate(&mut state, "Bonjour", "en").await.unwrap_err();
        assert!(matches!(err, TranslationError::Failed { consecutive_failures, .. } if consecutive_failures == attempt));
        assert_eq!(gate.calls(), 0);
    }

    let fifth = translator.safe_translate(&mut state, "Bonjour", "en").await.unwrap_err();
    assert!(matches!(fifth, TranslationError::Failed { consecutive_failures: 5, .. }));
    assert_eq!(gate.calls(), 1);
    assert_eq!(state.escalations, 1);
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(translator.phase(), TranslatorPhase::Active);

    let sixth = translator.safe_translate(&mut state, "Bonjour", "en").await.unwrap();
    assert_eq!(sixth, "This is the text of the review in English [fake translation to en, 7 chars]");
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(provider.request_count(), 6);
}

#[tokio::test]
async fn test_safeTranslate_withTenFailures_shouldEscalateTwice() {
    let gate = AutoResume::new();
    let mut translator = RetryingTranslator::new(Arc::new(MockProvider::failing()), Box::new(gate.clone()), 5);
    let mut state = RunState::default();

    for _ in 0..10 {
        let _ = translator.safe_translate(&mut state, "Bonjour", "en").await;
    }

    assert_eq!(gate.calls(), 2);
    assert_eq!(state.escalations, 2);
}

#[tokio::test]
async fn test_safeTranslate_withClosedGate_shouldHaltAndStayPaused() {
    let provider = Arc::new(MockProvider::failing());
    let mut translator = RetryingTranslator::new(provider.clone(), Box::new(ClosedGate), 2);
    let mut state = RunState::default();

    let _ = translator.safe_translate(&mut state, "Bonjour", "en").await;
    let second = translator.safe_translate(&mut state, "Bonjour", "en").await.unwrap_err();
    assert!(matches!(second, TranslationError::Halted(_)));
    assert_eq!(translator.phase(), TranslatorPhase::Paused { consecutive_failures: 2 });

    let third = translator.safe_translate(&mut state, "Merci", "en").await.unwrap_err();
    assert!(matches!(third, TranslationError::Halted(_)));
    assert_eq!(provider.request_count(), 2);

    translator.resume(&mut state);
    assert_eq!(translator.phase(), TranslatorPhase::Active);
    assert_eq!(state.consecutive_failures, 0);
}

#[test]
fn test_timedBackoff_delay_shouldStayWithinJitterBounds() {
    let backoff = TimedBackoff::new(Duration::from_secs(2), 500);

    for _ in 0..50 {
        let delay = backoff.delay();
        assert!(delay >= Duration::from_secs(2));
        assert!(delay <= Duration::from_millis(2_500));
    }
    assert_eq!(TimedBackoff::new(Duration::from_secs(1), 0).delay(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_timedBackoff_waitForResume_shouldSleepThenResume() {
    let backoff = TimedBackoff::new(Duration::from_millis(30), 0);
    let started = std::time::Instant::now();

    backoff.wait_for_resume(5).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(30));
}
