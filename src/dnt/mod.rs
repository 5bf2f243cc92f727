/*!
 * Do-not-translate (DNT) protection.
 *
 * Content sent to a translation service is first protected: structural and
 * non-linguistic fragments (icon shorthand, link metadata hidden in alt text,
 * site media references, configured product terms) are rewritten into inert
 * markup. When translations come back the same fragments are restored.
 *
 * - `dom`: html5ever parsing, node rewriting and serialization
 * - `codec`: the protect/restore rules
 * - `json`: HTML envelope used to carry JSON documents
 */

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::errors::DntError;

pub mod codec;
pub mod dom;
pub mod json;

pub use self::codec::HtmlDntCodec;

/// Kind of document being protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Html,
    Json,
}

impl FileType {
    /// Infer the file type from a content path
    pub fn from_path(path: &str) -> Self {
        if path.contains(".json") { Self::Json } else { Self::Html }
    }
}

/// Per-call codec options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DntOptions {
    pub file_type: FileType,
    /// Owning organization, enables site media rewriting when set with `site`
    pub org: Option<String>,
    pub site: Option<String>,
}

impl DntOptions {
    pub fn html() -> Self {
        Self::default()
    }

    pub fn json() -> Self {
        Self { file_type: FileType::Json, ..Self::default() }
    }

    pub fn for_path(path: &str) -> Self {
        Self { file_type: FileType::from_path(path), ..Self::default() }
    }

    pub fn with_site(mut self, org: impl Into<String>, site: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self.site = Some(site.into());
        self
    }
}

/// Project DNT rules (`translate.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateConfig {
    /// Terms that must reach the translation service untouched
    #[serde(default)]
    pub dnt_terms: Vec<String>,

    /// JSON member names whose string values are not translatable
    #[serde(default)]
    pub dnt_json_keys: Vec<String>,
}

impl TranslateConfig {
    /// Load rules from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translate config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse translate config: {}", path.display()))
    }

    pub fn is_dnt_json_key(&self, key: &str) -> bool {
        self.dnt_json_keys.iter().any(|k| k == key)
    }

    /// Matcher for all configured terms, longest first
    pub fn term_regex(&self) -> Option<Regex> {
        let mut terms: Vec<&str> = self
            .dnt_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return None;
        }
        terms.sort_by_key(|t| std::cmp::Reverse(t.len()));

        let alternation = terms
            .iter()
            .map(|term| {
                let starts_word = term.chars().next().is_some_and(|c| c.is_alphanumeric());
                let ends_word = term.chars().last().is_some_and(|c| c.is_alphanumeric());
                format!(
                    "{}{}{}",
                    if starts_word { r"\b" } else { "" },
                    regex::escape(term),
                    if ends_word { r"\b" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).ok()
    }
}

/// Reversible protection transform
pub trait DntCodec: Send + Sync + Debug {
    /// Protect a document before it is sent for translation
    fn add_dnt(&self, content: &str, config: &TranslateConfig, opts: &DntOptions) -> Result<String, DntError>;

    /// Restore a translated document; `org` and `site` rebuild absolute media URLs
    fn remove_dnt(&self, content: &str, org: &str, site: &str, opts: &DntOptions) -> Result<String, DntError>;
}
