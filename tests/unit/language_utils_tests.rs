/*!
 * Tests for language utility functions
 */

use locsync::language_utils::{display_name, locale_codes_match, resolve_language, split_locale};
use locsync::model::{Conf, LanguageRecord};

/// Test splitting locale codes into primary subtag and region
#[test]
fn test_split_locale_withVariousSeparators_shouldNormalize() {
    assert_eq!(split_locale("fr"), ("fr".to_string(), None));
    assert_eq!(split_locale("pt_br"), ("pt".to_string(), Some("BR".to_string())));
    assert_eq!(split_locale(" EN-gb "), ("en".to_string(), Some("GB".to_string())));
    assert_eq!(split_locale("de-"), ("de".to_string(), None));
}

/// Test resolving ISO 639 codes
#[test]
fn test_resolve_language_withPart1AndPart3Codes_shouldResolveSameLanguage() {
    assert_eq!(resolve_language("fr"), resolve_language("fra"));
    assert_eq!(resolve_language("de-ch"), resolve_language("deu"));
    assert!(resolve_language("xx").is_none());
    assert!(resolve_language("latn").is_none());
}

/// Test matching of locale codes
#[test]
fn test_locale_codes_match_withEquivalentCodes_shouldReturnTrue() {
    assert!(locale_codes_match("fr_ca", "fra-CA"));
    assert!(locale_codes_match("zh-hant", "zh_HANT"));
    assert!(!locale_codes_match("fr", "fr-ca"));
    assert!(!locale_codes_match("es", "pt"));
}

/// Test display names used in progress messages
#[test]
fn test_display_name_withRegion_shouldAppendRegion() {
    assert_eq!(display_name("de"), "German");
    assert_eq!(display_name("fr_ca"), "French (CA)");
    assert_eq!(display_name(" custom "), "custom");
}

/// Test language lookup on a project
#[test]
fn test_conf_lang_withEquivalentCode_shouldFindLanguage() {
    let conf = Conf {
        langs: vec![LanguageRecord::new("pt_BR", "/br"), LanguageRecord::new("fr", "/fr")],
        ..Default::default()
    };

    assert_eq!(conf.lang("fr").map(|l| l.location.as_str()), Some("/fr"));
    assert_eq!(conf.lang("pt-br").map(|l| l.location.as_str()), Some("/br"));
    assert_eq!(conf.lang("fra").map(|l| l.code.as_str()), Some("fr"));
    assert!(conf.lang("de").is_none());
}
