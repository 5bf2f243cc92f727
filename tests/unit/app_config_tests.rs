/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;

use locsync::app_config::{Config, ConflictBehavior, LogLevel, StoreConfig};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.service, None);
    assert_eq!(config.options.translate_conflict_behavior, ConflictBehavior::Merge);
    assert_eq!(config.options.copy_conflict_behavior, ConflictBehavior::Merge);
    assert_eq!(config.options.source_language.code, "en");
    assert_eq!(config.options.source_location(), "/");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.org = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.options.concurrency = 0;
    assert!(config.validate().is_err());

    let config = Config {
        store: StoreConfig::Http { origin: "not a url".to_string(), token: None },
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

/// Test saving and loading a configuration file
#[test]
fn test_config_save_and_load_withCustomValues_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("locsync.json");

    let mut config = Config {
        org: "adobecom".to_string(),
        site: "da-bacom".to_string(),
        service: Some("passthrough".to_string()),
        log_level: LogLevel::Debug,
        ..Config::default()
    };
    config.options.translate_conflict_behavior = ConflictBehavior::Overwrite;
    config.options.source_language.location = "/langstore/en".to_string();
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.org, "adobecom");
    assert_eq!(loaded.service.as_deref(), Some("passthrough"));
    assert_eq!(loaded.options, config.options);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that an HTTP store picks up the default origin
#[test]
fn test_config_load_withHttpStore_shouldDefaultOrigin() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("locsync.json");
    fs::write(
        &path,
        r#"{ "org": "o", "site": "s", "store": { "type": "http", "token": "secret" } }"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(
        config.store,
        StoreConfig::Http {
            origin: "https://admin.da.live".to_string(),
            token: Some("secret".to_string()),
        }
    );
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test that flat site settings override the structured options on load
#[test]
fn test_config_load_withSettings_shouldApplyThemOverOptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "locsync.json",
        r#"{
            "org": "o",
            "site": "s",
            "options": { "translate_conflict_behavior": "merge", "concurrency": 4 },
            "settings": {
                "translate.conflict.behavior": "overwrite",
                "source.language": "/langstore/en"
            }
        }"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.options.translate_conflict_behavior, ConflictBehavior::Overwrite);
    assert_eq!(config.options.source_location(), "/langstore/en");
    assert_eq!(config.options.concurrency, 4);

    fs::write(&path, r#"{ "org": "o", "site": "s", "settings": { "copy.conflict.behavior": "replace" } }"#)?;
    let err = Config::load(&path).err().expect("invalid settings");
    assert!(err.to_string().contains("Invalid settings in config file"));
    Ok(())
}

/// Test that a broken configuration file is reported with its path
#[test]
fn test_config_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ org: ")?;

    let err = Config::load(&path).err().expect("invalid config");
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}
