/*!
 * Project data model.
 *
 * A [`Conf`] is one localization project: the ordered set of source URLs, the
 * target languages, and the per-language progress of copy and translation.
 * All records are serde-serializable so a project can be written back to disk
 * between workflow stages.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::ConflictBehavior;
use crate::paths::PathVariants;

/// One document taking part in a localization project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    /// Path exactly as supplied by the user
    pub supplied_path: String,

    /// Path relative to the source prefix, index-normalized
    #[serde(default)]
    pub base_path: String,

    /// Content path with extension
    #[serde(default)]
    pub da_base_path: String,

    /// Content path under the destination prefix (and snapshot, if any)
    #[serde(default)]
    pub da_dest_path: String,

    /// Published path without extension
    #[serde(default)]
    pub aem_base_path: String,

    /// Preview URL for the document
    #[serde(default)]
    pub aem_href: String,

    /// Fetched (and possibly protected) content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Content to be written to `destination`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_content: Option<String>,

    /// Full write target (`/{org}/{site}/...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Error recorded for this item during the current pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Outcome of the last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,

    /// File extension (`html` when none was supplied)
    #[serde(default)]
    pub ext: String,

    /// Whether the supplied path carried an explicit extension
    #[serde(default)]
    pub has_ext: bool,
}

impl UrlRecord {
    /// Create a record from a supplied path
    pub fn new(supplied_path: impl Into<String>) -> Self {
        Self {
            supplied_path: supplied_path.into(),
            ..Default::default()
        }
    }

    /// Merge resolved path variants into this record
    pub fn apply_variants(&mut self, variants: PathVariants) {
        self.base_path = variants.base_path;
        self.da_base_path = variants.da_base_path;
        self.da_dest_path = variants.da_dest_path;
        self.aem_base_path = variants.aem_base_path;
        self.ext = variants.ext;
        self.has_ext = variants.has_ext;
    }

    /// Whether the item was written successfully
    pub fn is_saved(&self) -> bool {
        self.status.as_ref().is_some_and(ItemStatus::is_success)
    }
}

/// Outcome of a single write, as reported by a writer or connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemStatus {
    /// HTTP-like status code from a content writer
    Code(u16),
    /// Named outcome from a connector (`success`, `error`, ...)
    Named(String),
}

impl ItemStatus {
    /// Named success outcome
    pub fn success() -> Self {
        Self::Named("success".to_string())
    }

    /// Whether this outcome represents a successful write
    pub fn is_success(&self) -> bool {
        match self {
            Self::Code(code) => (200..300).contains(code),
            Self::Named(name) => name == "success",
        }
    }
}

/// Translation progress state of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslationStatus {
    #[default]
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Waiting => "waiting",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Translation progress of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationProgress {
    #[serde(default)]
    pub status: TranslationStatus,
    #[serde(default)]
    pub saved: usize,
}

impl TranslationProgress {
    /// Record a save pass: complete only when every item landed
    pub fn settle(&mut self, saved: usize, total: usize) {
        self.saved = saved;
        self.status = if saved == total {
            TranslationStatus::Complete
        } else {
            TranslationStatus::Error
        };
    }

    /// Park the language until its prerequisite lands
    pub fn mark_waiting(&mut self) {
        self.status = TranslationStatus::Waiting;
    }

    /// Return the language to the start of the translation flow
    pub fn reset(&mut self) {
        self.status = TranslationStatus::NotStarted;
    }

    pub fn is_complete(&self) -> bool {
        self.status == TranslationStatus::Complete
    }
}

/// Copy progress state of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CopyStatus {
    #[default]
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "complete")]
    Complete,
}

/// Source copy progress of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CopyProgress {
    #[serde(default)]
    pub status: CopyStatus,
    #[serde(default)]
    pub saved: usize,
}

impl CopyProgress {
    /// Record a finished copy pass. Partial success still completes the copy.
    pub fn finish(&mut self, saved: usize) {
        self.saved = saved;
        self.status = CopyStatus::Complete;
    }
}

/// Reference to the language another language waits for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingFor {
    /// Code of the prerequisite language
    pub code: String,
    /// Location of the prerequisite language tree
    pub location: String,
}

/// A target language of the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// Destination tree prefix (e.g. `/fr`)
    pub location: String,
    #[serde(default)]
    pub translation: TranslationProgress,
    #[serde(default)]
    pub copy: CopyProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_for: Option<WaitingFor>,
}

impl LanguageRecord {
    /// Create a language, deriving its display name from the code
    pub fn new(code: impl Into<String>, location: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: crate::language_utils::display_name(&code),
            code,
            location: location.into(),
            ..Default::default()
        }
    }

    /// Make this language wait for another one
    pub fn waiting_for(mut self, prerequisite: &LanguageRecord) -> Self {
        self.waiting_for = Some(WaitingFor {
            code: prerequisite.code.clone(),
            location: prerequisite.location.clone(),
        });
        self
    }

    /// Name used in progress messages
    pub fn label(&self) -> &str {
        if self.name.is_empty() { &self.code } else { &self.name }
    }
}

/// Custom source URL set of a language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LangUrls {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub urls: Vec<UrlRecord>,
}

/// A localization project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conf {
    /// Filled from the configuration when a project file omits it
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    #[serde(default)]
    pub urls: Vec<UrlRecord>,
    #[serde(default)]
    pub langs: Vec<LanguageRecord>,
    #[serde(default)]
    pub langs_with_urls: Vec<LangUrls>,
}

impl Conf {
    /// Look up a language by code
    ///
    /// An exact match wins; otherwise an equivalent locale code (`pt_BR` for
    /// `pt-br`, `fra` for `fr`) is accepted.
    pub fn lang(&self, code: &str) -> Option<&LanguageRecord> {
        self.langs
            .iter()
            .find(|lang| lang.code == code)
            .or_else(|| {
                self.langs
                    .iter()
                    .find(|lang| crate::language_utils::locale_codes_match(&lang.code, code))
            })
    }

    /// The source URL set of the language at `index`
    ///
    /// Falls back to the project URLs when the language has no custom set.
    pub fn urls_for_lang(&self, index: usize) -> &[UrlRecord] {
        match self.langs_with_urls.get(index) {
            Some(lang_urls) if !lang_urls.urls.is_empty() => &lang_urls.urls,
            _ => &self.urls,
        }
    }
}

/// How a single item is written to its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Reconcile with existing destination content
    Merge,
    /// Replace destination content
    Overwrite,
}

impl WriteStrategy {
    /// Strategy for writing a returned translation.
    ///
    /// Explicit-extension resources and non-HTML assets are never merged.
    pub fn for_translation(behavior: ConflictBehavior, record: &UrlRecord) -> Self {
        if behavior == ConflictBehavior::Overwrite || record.has_ext || record.ext != "html" {
            Self::Overwrite
        } else {
            Self::Merge
        }
    }

    /// Strategy for replicating source content into a language tree
    pub fn for_copy(behavior: ConflictBehavior, record: &UrlRecord) -> Self {
        if behavior == ConflictBehavior::Overwrite || record.has_ext {
            Self::Overwrite
        } else {
            Self::Merge
        }
    }
}
