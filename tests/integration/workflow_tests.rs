/*!
 * Integration tests for the full localization workflow
 */

use anyhow::Result;
use std::sync::Arc;

use locsync::app_config::{Config, ConflictBehavior, SourceLanguage};
use locsync::connectors::{Connector, PassthroughConnector};
use locsync::localization::LocContext;
use locsync::model::{CopyStatus, TranslationStatus};
use locsync::store::MemoryStore;
use locsync::{Controller, Stage};

use crate::common::{self, CollectingNotifier};

fn config(behavior: ConflictBehavior) -> Config {
    let mut config = Config {
        org: "org".to_string(),
        site: "site".to_string(),
        service: Some("passthrough".to_string()),
        ..Config::default()
    };
    config.options.source_language = SourceLanguage { location: "/en".to_string(), ..SourceLanguage::default() };
    config.options.translate_conflict_behavior = behavior;
    config
}

fn controller(store: Arc<MemoryStore>, behavior: ConflictBehavior) -> (Controller, Arc<CollectingNotifier>) {
    let notifier = Arc::new(CollectingNotifier::default());
    let connector: Arc<dyn Connector> = Arc::new(PassthroughConnector::new());
    let controller = Controller::with_context(config(behavior), LocContext::new(store), Some(connector))
        .with_notifier(notifier.clone());
    (controller, notifier)
}

/// Test a complete run where translations overwrite the copied sources
#[tokio::test]
async fn test_full_run_withOverwrite_shouldCompleteEveryLanguage() -> Result<()> {
    common::init_logger();
    let store = Arc::new(MemoryStore::new());
    common::seed_source(&store);
    let (controller, notifier) = controller(store.clone(), ConflictBehavior::Overwrite);
    let mut conf = common::sample_conf();

    let summary = controller.run(&mut conf, &Stage::ALL).await?;

    assert_eq!(summary.dispatched, vec!["fr", "de", "fr_ca"]);
    assert_eq!(summary.promoted, vec!["fr_ca"]);
    assert_eq!(summary.complete, vec!["fr", "fr_ca", "de"]);
    assert!(summary.failed.is_empty());

    for lang in &conf.langs {
        assert_eq!(lang.translation.status, TranslationStatus::Complete, "{}", lang.code);
        assert_eq!(lang.translation.saved, 3);
        assert_eq!(lang.copy.status, CopyStatus::Complete);
        assert!(lang.waiting_for.is_none());
    }

    for location in ["fr", "ca/fr", "de"] {
        let page = store.get(&format!("/org/site/{}/index.html", location)).expect("translated page");
        assert!(page.contains("Welcome :wave:"));
        assert!(page.contains(r#"alt="https://example.com | Our team | :play:""#));
        assert!(page.contains(r#"src="https://main--site--org.aem.live/media_1234.png?width=750""#));
        assert!(!page.contains("dnt-alt-content"));

        let sheet = store.get(&format!("/org/site/{}/placeholders.json", location)).expect("translated sheet");
        assert_eq!(sheet, common::PLACEHOLDERS);
    }

    let messages = notifier.messages();
    assert!(messages.contains(&"Fetching 3 items for French".to_string()));
    assert!(messages.contains(&"0 items left to save for German".to_string()));
    Ok(())
}

/// Test that merged translations block languages waiting on them
#[tokio::test]
async fn test_full_run_withMerge_shouldBlockWaitingLanguageOnUnmergedChanges() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    common::seed_source(&store);
    let (controller, _) = controller(store.clone(), ConflictBehavior::Merge);
    let mut conf = common::sample_conf();

    let summary = controller.run(&mut conf, &Stage::ALL).await?;

    let french = store.get("/org/site/fr/index.html").expect("merged page");
    assert!(french.contains("<da-diff-deleted"));
    assert!(french.contains("<da-diff-added>"));

    // The sheet is overwritten, so only it reaches the waiting language
    assert_eq!(summary.failed, vec!["fr_ca"]);
    let fr_ca = conf.lang("fr_ca").expect("fr_ca");
    assert_eq!(fr_ca.translation.status, TranslationStatus::Error);
    assert_eq!(fr_ca.translation.saved, 1);
    Ok(())
}

/// Test that a fetch error stops the dispatch
#[tokio::test]
async fn test_translate_withMissingSource_shouldAbortDispatch() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    common::seed_source(&store);
    store.fail_on("/org/site/en/about.html", 404);
    let (controller, _) = controller(store, ConflictBehavior::Overwrite);
    let mut conf = common::sample_conf();

    let err = controller
        .run(&mut conf, &[Stage::Translate])
        .await
        .expect_err("dispatch should be refused");

    let message = format!("{:#}", err);
    assert!(message.contains("Failed to send project for translation"));
    assert!(message.contains("1 item(s) have errors: /en/about: Error fetching content from /en/about.html - 404"));
    assert!(conf.langs.iter().all(|lang| lang.translation.status == TranslationStatus::NotStarted));
    Ok(())
}

/// Test a copy-only run without a translation service
#[tokio::test]
async fn test_copy_only_withoutConnector_shouldReplicateSources() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    common::seed_source(&store);
    let controller = Controller::with_context(config(ConflictBehavior::Merge), LocContext::new(store.clone()), None);
    let mut conf = common::sample_conf();

    let summary = controller.run(&mut conf, &[Stage::Copy]).await?;

    assert!(summary.dispatched.is_empty());
    assert_eq!(store.get("/org/site/de/about.html").as_deref(), Some("<body><main><p>About us</p></main></body>"));
    assert!(conf.langs.iter().all(|lang| lang.copy.saved == 3));

    let err = controller.run(&mut conf, &[Stage::Translate]).await.expect_err("no connector");
    assert!(err.to_string().contains("No translation service configured"));
    Ok(())
}

/// Test that an empty project is refused
#[tokio::test]
async fn test_run_withNoUrls_shouldFail() {
    let store = Arc::new(MemoryStore::new());
    let (controller, _) = controller(store, ConflictBehavior::Merge);
    let mut conf = common::sample_conf();
    conf.urls.clear();

    assert!(controller.run(&mut conf, &Stage::ALL).await.is_err());
}
