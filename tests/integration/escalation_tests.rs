/*!
 * Integration tests for escalation through the batch processor
 */

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;

use revtrans::errors::{AppError, TranslationError};
use revtrans::providers::mock::MockProvider;
use revtrans::translation::batch::{BatchOptions, BatchProcessor};
use revtrans::translation::language_gate::LanguageGate;
use revtrans::translation::retry::{AutoResume, ResumeGate, RetryingTranslator};

use crate::common::mock_providers::ScriptedClient;
use crate::common::{context_in, create_temp_dir, english_response, record};

/// Gate that refuses to resume, like a closed stdin
#[derive(Debug)]
struct ClosedGate;

#[async_trait]
impl ResumeGate for ClosedGate {
    async fn wait_for_resume(&self, _consecutive_failures: u32) -> anyhow::Result<()> {
        Err(anyhow!("stdin closed while waiting for operator acknowledgment"))
    }
}

fn processor_with_gate(client: Arc<dyn revtrans::providers::TranslationClient>, gate: Box<dyn ResumeGate>) -> BatchProcessor {
    let translator = RetryingTranslator::new(client, gate, 5);
    BatchProcessor::new(LanguageGate::with_defaults("en"), translator, BatchOptions::new("en"))
}

#[tokio::test]
async fn test_run_withFiveConsecutiveFailures_shouldEscalateOnceAndFinish() {
    let dir = create_temp_dir().unwrap();
    let mut ctx = context_in(dir.path());
    let gate = AutoResume::new();
    let provider = Arc::new(MockProvider::fail_first(5).with_custom_response(english_response));
    let mut processor = processor_with_gate(provider.clone(), Box::new(gate.clone()));
    let records = vec![
        record("Très bon produit", "Le produit marche très bien", Some("France")),
        record("Sehr gut", "Das Produkt ist sehr gut", Some("Germany")),
        record("Bonjour", "Le produit est bon", Some("Canada")),
    ];

    let (output, report) = processor.run(&mut ctx, &records).await.unwrap();

    assert_eq!(gate.calls(), 1);
    assert_eq!(ctx.state.escalations, 1);
    assert_eq!(ctx.state.consecutive_failures, 0);
    assert_eq!(report.retry.remaining, 0);
    assert_eq!(output[2].review_title_tr, "Hello");
    assert_eq!(provider.request_count(), 11);
}

#[tokio::test]
async fn test_run_withClosedGate_shouldHaltAndKeepProgress() {
    let dir = create_temp_dir().unwrap();
    let mut ctx = context_in(dir.path());
    let client = ScriptedClient::new(vec![
        Ok("Very good product"),
        Ok("The product works very well"),
        Err(429),
        Err(429),
        Err(429),
        Err(429),
        Err(429),
    ]);
    let mut processor = processor_with_gate(Arc::new(client.clone()), Box::new(ClosedGate));
    let mut records = vec![record("Très bon produit", "Le produit marche très bien", Some("France"))];
    records.extend((1..=6).map(|i| record(&format!("Le produit numéro {}", i), "", Some("France"))));

    let result = processor.run(&mut ctx, &records).await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::Halted(_)))));
    assert_eq!(client.calls(), 7);
    let saved = ctx.store().load().unwrap();
    assert_eq!(saved.originals, vec!["Très bon produit", "Le produit marche très bien"]);
}
