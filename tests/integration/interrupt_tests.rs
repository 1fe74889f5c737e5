/*!
 * Integration tests for interrupting a run
 */

use std::sync::Arc;
use std::time::Duration;

use crate::common::mock_providers::StallingClient;
use crate::common::{context_in, create_temp_dir, processor_for, record};

#[tokio::test]
async fn test_interrupt_duringRun_shouldSaveExactlyThePendingEntries() {
    let dir = create_temp_dir().unwrap();
    let mut ctx = context_in(dir.path());
    let handler = ctx.interrupt_handler();
    let client = StallingClient::new(3);
    let mut processor = processor_for(Arc::new(client.clone()), 3);
    let records: Vec<_> = (0..3)
        .map(|i| record(&format!("Le produit numéro {}", i), &format!("Très bien {}", i), Some("France")))
        .collect();

    tokio::select! {
        _ = processor.run(&mut ctx, &records) => panic!("run should stall on the fourth call"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }

    assert_eq!(client.calls(), 4);
    assert!(!ctx.store().exists());

    assert!(handler.handle().unwrap());
    let saved = ctx.store().load().unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(
        saved.originals,
        vec!["Le produit numéro 0", "Très bien 0", "Le produit numéro 1"]
    );
    assert_eq!(saved.translations[0], "EN: Le produit numéro 0");

    assert!(!handler.handle().unwrap());
}
