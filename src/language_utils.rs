/*!
 * Language utilities for locale code handling.
 *
 * Project languages are identified by locale codes such as `fr`, `en-gb`,
 * `pt_BR` or `zh-hant`. Only the primary subtag is resolved against
 * ISO 639; region and script subtags are kept as a suffix in display names.
 */

use isolang::Language;

/// Split a locale code into its lowercase primary subtag and the remainder
pub fn split_locale(code: &str) -> (String, Option<String>) {
    let normalized = code.trim().replace('_', "-");
    let mut parts = normalized.splitn(2, '-');
    let primary = parts.next().unwrap_or_default().to_lowercase();
    let rest = parts.next().filter(|r| !r.is_empty()).map(|r| r.to_uppercase());
    (primary, rest)
}

/// Resolve the primary subtag of a locale code to an ISO 639 language
pub fn resolve_language(code: &str) -> Option<Language> {
    let (primary, _) = split_locale(code);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Check if two locale codes name the same language and region
pub fn locale_codes_match(code1: &str, code2: &str) -> bool {
    let (primary1, rest1) = split_locale(code1);
    let (primary2, rest2) = split_locale(code2);
    if rest1 != rest2 {
        return false;
    }
    match (resolve_language(&primary1), resolve_language(&primary2)) {
        (Some(lang1), Some(lang2)) => lang1 == lang2,
        _ => primary1 == primary2,
    }
}

/// Human-readable name for a locale code
///
/// Unknown codes fall back to the code itself so progress messages stay
/// readable.
pub fn display_name(code: &str) -> String {
    let (_, rest) = split_locale(code);
    match (resolve_language(code), rest) {
        (Some(lang), Some(region)) => format!("{} ({})", lang.to_name(), region),
        (Some(lang), None) => lang.to_name().to_string(),
        (None, _) => code.trim().to_string(),
    }
}
