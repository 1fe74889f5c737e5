/*!
 * End-to-end tests running the controller in test mode
 */

use std::path::Path;

use revtrans::app_config::Config;
use revtrans::app_controller::Controller;
use revtrans::dataset;

use crate::common::{create_temp_dir, create_test_file};

const REVIEWS: &str = r#"[
    {"review_title": "Très bon produit", "review_text": "Le produit marche très bien", "location": "Paris, France", "rating": 5},
    {"review_title": "Great product", "review_text": "It works well", "location": "Austin, United States", "rating": 4},
    {"review_title": "Sehr gut", "review_text": "Das Produkt ist sehr gut", "location": "Berlin, Germany", "rating": 5}
]"#;

fn test_config(dir: &Path) -> Config {
    let mut config = Config {
        test_mode: true,
        ..Config::default()
    };
    config.checkpoint.test_path = dir.join("translation_test.db");
    config.checkpoint.path = dir.join("translation_progress.db");
    config.logging.file = None;
    config
}

#[tokio::test]
async fn test_controllerRun_inTestMode_shouldWriteTranslatedDataset() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "reviews.json", REVIEWS).unwrap();
    let output = dataset::default_output_path(&input);
    let controller = Controller::with_config(test_config(dir.path())).unwrap();
    let mut ctx = controller.open_context().unwrap();

    let report = controller.run(&mut ctx, &input, &output).await.unwrap();

    assert_eq!(report.pass.translated, 4);
    assert_eq!(report.pass.locale_skipped, 1);
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written[0]["review_title_tr"],
        "This is the text of the review in English [fake translation to en, 16 chars]"
    );
    assert_eq!(written[1]["review_title_tr"], "Great product");
    assert_eq!(written[2]["rating"], 5);
    assert!(dir.path().join("translation_test.db").exists());
    assert!(!dir.path().join("translation_progress.db").exists());
}

#[tokio::test]
async fn test_controllerRun_secondRun_shouldReuseCheckpoint() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "reviews.json", REVIEWS).unwrap();
    let output = dir.path().join("out.json");
    let controller = Controller::with_config(test_config(dir.path())).unwrap();

    let mut first = controller.open_context().unwrap();
    controller.run(&mut first, &input, &output).await.unwrap();

    let mut second = controller.open_context().unwrap();
    let report = controller.run(&mut second, &input, &output).await.unwrap();

    assert_eq!(report.pass.translated, 0);
    assert_eq!(report.pass.cache_hits, 4);
}

#[tokio::test]
async fn test_controllerCheck_afterTestModeRun_shouldKeepFakeTranslations() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "reviews.json", REVIEWS).unwrap();
    let output = dir.path().join("out.json");
    let controller = Controller::with_config(test_config(dir.path())).unwrap();
    let mut ctx = controller.open_context().unwrap();
    controller.run(&mut ctx, &input, &output).await.unwrap();

    let removed = controller.check().unwrap();

    assert_eq!(removed, 0);
    assert_eq!(controller.open_context().unwrap().cache().read().len(), 4);
}

#[tokio::test]
async fn test_controllerCheck_withWrongLanguageEntry_shouldDropOnlyThatEntry() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "reviews.json", REVIEWS).unwrap();
    let output = dir.path().join("out.json");
    let controller = Controller::with_config(test_config(dir.path())).unwrap();
    let mut ctx = controller.open_context().unwrap();
    controller.run(&mut ctx, &input, &output).await.unwrap();
    ctx.record_translation("Bonne journée", "Le produit est bon".to_string()).unwrap();
    ctx.checkpoint().unwrap();

    let removed = controller.check().unwrap();

    assert_eq!(removed, 1);
    let reopened = controller.open_context().unwrap();
    assert_eq!(reopened.cache().read().len(), 4);
    assert!(!reopened.is_cached("Bonne journée"));
}

#[tokio::test]
async fn test_controllerRun_withConsistencyCheck_shouldReuseFakeTranslations() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "reviews.json", REVIEWS).unwrap();
    let output = dir.path().join("out.json");
    let mut config = test_config(dir.path());
    config.pipeline.consistency_check = true;
    let controller = Controller::with_config(config).unwrap();

    let mut first = controller.open_context().unwrap();
    controller.run(&mut first, &input, &output).await.unwrap();
    let mut second = controller.open_context().unwrap();
    let report = controller.run(&mut second, &input, &output).await.unwrap();

    assert_eq!(report.filtered, 0);
    assert_eq!(report.pass.cache_hits, 4);
    assert_eq!(report.pass.translated, 0);
}

#[test]
fn test_controllerCheck_withoutCheckpoint_shouldRemoveNothing() {
    let dir = create_temp_dir().unwrap();
    let controller = Controller::with_config(test_config(dir.path())).unwrap();

    assert_eq!(controller.check().unwrap(), 0);
}

#[test]
fn test_withConfig_withoutApiKey_shouldFailOutsideTestMode() {
    let dir = create_temp_dir().unwrap();
    let config = Config {
        test_mode: false,
        ..test_config(dir.path())
    };

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_buildClient_withDeepLConfig_shouldSucceed() {
    let dir = create_temp_dir().unwrap();
    let mut config = Config {
        test_mode: false,
        ..test_config(dir.path())
    };
    config.provider.api_key = "test-key".to_string();
    let controller = Controller::with_config(config).unwrap();

    assert!(controller.build_client().is_ok());
}
