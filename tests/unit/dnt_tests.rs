/*!
 * Tests for do-not-translate protection as seen by a translation round trip
 */

use anyhow::Result;
use serde_json::Value;

use locsync::dnt::{DntCodec, DntOptions, HtmlDntCodec, TranslateConfig};

use crate::common;

fn site() -> DntOptions {
    DntOptions::html().with_site("org", "site")
}

/// Test that a translated page keeps every protected fragment
#[test]
fn test_round_trip_withTranslatedText_shouldRestoreProtectedFragments() -> Result<()> {
    let protected = HtmlDntCodec.add_dnt(common::SOURCE_PAGE, &TranslateConfig::default(), &site())?;
    assert!(protected.contains(r#"alt="Our team""#));
    assert!(protected.contains(r#"dnt-alt-content="https://example.com | *alt-placeholder* | :play:""#));

    // What a translation service sends back
    let translated = protected.replace("Welcome", "Bienvenue").replace("Our team", "Notre équipe");

    let restored = HtmlDntCodec.remove_dnt(&translated, "org", "site", &DntOptions::html())?;
    assert!(restored.contains("<h1>Bienvenue :wave:</h1>"));
    assert!(restored.contains(r#"alt="https://example.com | Notre équipe | :play:""#));
    assert!(!restored.contains("dnt-alt-content"));
    assert!(!restored.contains("./media_"));
    Ok(())
}

/// Test that media of other sites is left absolute
#[test]
fn test_add_dnt_withForeignMedia_shouldKeepAbsoluteUrl() -> Result<()> {
    let html = r#"<body><img src="https://main--other--org.aem.page/media_1.png"></body>"#;
    let protected = HtmlDntCodec.add_dnt(html, &TranslateConfig::default(), &site())?;
    assert!(protected.contains(r#"src="https://main--other--org.aem.page/media_1.png""#));
    Ok(())
}

/// Test that preview media of the current site keeps its host through a round trip
#[test]
fn test_round_trip_withPreviewMedia_shouldKeepHost() -> Result<()> {
    let html = r#"<body><picture><source srcset="https://main--site--org.aem.page/media_2.png 2x"><img src="https://main--site--org.aem.page/media_2.png"></picture></body>"#;
    let protected = HtmlDntCodec.add_dnt(html, &TranslateConfig::default(), &site())?;
    let restored = HtmlDntCodec.remove_dnt(&protected, "org", "site", &DntOptions::html())?;
    assert!(restored.contains(r#"srcset="https://main--site--org.aem.page/media_2.png 2x""#));
    assert!(restored.contains(r#"src="https://main--site--org.aem.page/media_2.png""#));
    assert!(!restored.contains("aem.live"));
    Ok(())
}

/// Test rules loaded from a translate config file
#[test]
fn test_translate_config_load_withTermsAndKeys_shouldProtectBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "translate.json",
        r#"{ "dntTerms": ["Creative Cloud"], "dntJsonKeys": ["key"] }"#,
    )?;
    let config = TranslateConfig::load(&path)?;

    let page = HtmlDntCodec.add_dnt("<p>Get Creative Cloud</p>", &config, &DntOptions::html())?;
    assert!(page.contains(r#"<span class="dnt-term" translate="no">Creative Cloud</span>"#));

    let sheet = HtmlDntCodec.add_dnt(common::PLACEHOLDERS, &config, &DntOptions::json())?;
    assert!(sheet.contains(r#"data-key="key" data-type="string" translate="no">buy-now</div>"#));
    assert!(sheet.contains(r#"data-key="value" data-type="string">Buy now</div>"#));
    Ok(())
}

/// Test that a translated sheet decodes with its keys intact
#[test]
fn test_round_trip_withTranslatedSheet_shouldKeepKeysAndOrder() -> Result<()> {
    let config = TranslateConfig { dnt_json_keys: vec!["key".to_string()], ..Default::default() };
    let protected = HtmlDntCodec.add_dnt(common::PLACEHOLDERS, &config, &DntOptions::json())?;
    let translated = protected.replace(">Buy now<", ">Jetzt kaufen<");

    let restored = HtmlDntCodec.remove_dnt(&translated, "org", "site", &DntOptions::json())?;
    assert!(restored.starts_with(r#"{"total":1,"data":"#));
    let value: Value = serde_json::from_str(&restored)?;
    assert_eq!(value["data"][0]["key"], "buy-now");
    assert_eq!(value["data"][0]["value"], "Jetzt kaufen");
    assert_eq!(value[":type"], "sheet");
    Ok(())
}

/// Test that invalid JSON is refused before anything is sent
#[test]
fn test_add_dnt_withInvalidJson_shouldFail() {
    let result = HtmlDntCodec.add_dnt("{\"data\": [", &TranslateConfig::default(), &DntOptions::json());
    assert!(result.is_err());
}
