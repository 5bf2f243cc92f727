/*!
 * Integration tests for application lifecycle over a local content tree
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use locsync::app_config::{Config, ConflictBehavior, SourceLanguage, StoreConfig};
use locsync::dnt::FileType;
use locsync::model::{Conf, TranslationStatus};
use locsync::{Controller, Stage};

use crate::common;

fn config(root: &Path) -> Config {
    let mut config = Config {
        org: "org".to_string(),
        site: "site".to_string(),
        service: Some("Passthrough".to_string()),
        store: StoreConfig::Fs { root: root.to_string_lossy().to_string() },
        ..Config::default()
    };
    config.options.source_language = SourceLanguage { location: "/en".to_string(), ..SourceLanguage::default() };
    config.options.translate_conflict_behavior = ConflictBehavior::Overwrite;
    config
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    assert_eq!(controller.config().options.concurrency, 50);
    Ok(())
}

/// Test that an unknown service is reported at startup
#[test]
fn test_controller_initialization_withUnknownService_shouldFail() {
    let config = Config { service: Some("Google Translate".to_string()), ..Config::default() };
    let err = Controller::with_config(config).err().expect("unknown service");
    assert!(format!("{:#}", err).contains("Unknown translation service: google-translate"));
}

/// Test a full run over a directory tree, with discovery and project persistence
#[tokio::test]
async fn test_run_withFsStore_shouldTranslateAndPersistProject() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let content = temp_dir.path().join("content");
    common::create_test_file(&content, "org/site/en/index.html", common::SOURCE_PAGE)?;
    common::create_test_file(&content, "org/site/en/placeholders.json", common::PLACEHOLDERS)?;

    let project_path = common::create_test_file(
        temp_dir.path(),
        "project.json",
        r#"{
  "title": "Launch",
  "langs": [
    { "code": "fr", "location": "/fr" },
    { "code": "fr_ca", "location": "/ca/fr", "waitingFor": { "code": "fr", "location": "/fr" } }
  ]
}"#,
    )?;

    let controller = Controller::with_config(config(&content))?;
    let mut conf = controller.load_project(&project_path)?;
    assert_eq!(conf.org, "org");

    let summary = controller.run(&mut conf, &Stage::ALL).await?;
    assert_eq!(conf.urls.len(), 2);
    assert_eq!(summary.complete, vec!["fr", "fr_ca"]);

    let page = fs::read_to_string(content.join("org/site/ca/fr/index.html"))?;
    assert!(page.contains("Welcome :wave:"));
    let sheet = fs::read_to_string(content.join("org/site/fr/placeholders.json"))?;
    assert_eq!(sheet, common::PLACEHOLDERS);

    controller.save_project(&project_path, &conf)?;
    let raw = fs::read_to_string(&project_path)?;
    assert!(raw.contains(r#""status": "complete""#));
    assert!(!raw.contains("\"content\""));

    let reloaded: Conf = serde_json::from_str(&raw)?;
    assert_eq!(reloaded.langs[1].translation.status, TranslationStatus::Complete);
    assert!(reloaded.langs[1].waiting_for.is_none());
    Ok(())
}

/// Test protecting and restoring a single document
#[test]
fn test_protect_and_restore_document_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config {
        service: None,
        ..config(temp_dir.path())
    })?;

    let protected = controller.protect_document(common::SOURCE_PAGE, FileType::Html)?;
    assert!(protected.contains(r#"<span class="icon icon-wave"></span>"#));
    assert!(protected.contains(r#"src="./media_1234.png?width=750""#));

    let restored = controller.restore_document(&protected, FileType::Html)?;
    assert!(restored.contains("Welcome :wave:"));
    assert!(restored.contains(r#"src="https://main--site--org.aem.live/media_1234.png?width=750""#));

    let sheet = controller.protect_document(common::PLACEHOLDERS, FileType::Json)?;
    assert_eq!(controller.restore_document(&sheet, FileType::Json)?, common::PLACEHOLDERS);
    Ok(())
}
