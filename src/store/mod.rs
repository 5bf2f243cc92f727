/*!
 * Content store contracts and implementations.
 *
 * The workflow reads documents through [`ContentStore`] and writes them
 * through [`ContentWriter`]. Paths are always full content paths of the form
 * `/{org}/{site}/...`.
 *
 * - `memory`: in-process store for tests and dry runs
 * - `fs`: local directory tree
 * - `http`: remote content origin
 */

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;

use crate::errors::StoreError;
use crate::model::WriteStrategy;

pub mod fs;
pub mod http;
pub mod memory;

pub use self::fs::FsContentStore;
pub use self::http::HttpContentStore;
pub use self::memory::MemoryStore;

/// Inner content of the body element
static BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(<body[^>]*>)(.*)(</body>)").expect("Invalid body regex")
});

/// Response of a content fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub ok: bool,
    pub status: u16,
    pub text: String,
}

impl FetchResponse {
    pub fn found(text: impl Into<String>) -> Self {
        Self { ok: true, status: 200, text: text.into() }
    }

    pub fn status(status: u16) -> Self {
        Self { ok: (200..300).contains(&status), status, text: String::new() }
    }
}

/// Response of a content write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteResponse {
    pub status: u16,
}

impl WriteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A document to write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyItem<'a> {
    /// Full content path (`/{org}/{site}/...`)
    pub destination: &'a str,
    /// Content to write
    pub content: &'a str,
}

/// Read access to content
#[async_trait]
pub trait ContentStore: Send + Sync + Debug {
    /// Fetch a document; non-success responses are returned, not raised
    async fn fetch(&self, path: &str) -> Result<FetchResponse, StoreError>;
}

/// Write access to content
#[async_trait]
pub trait ContentWriter: Send + Sync + Debug {
    /// Write a document, reconciling with existing destination content
    async fn merge_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError>;

    /// Write a document, replacing destination content
    async fn overwrite_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError>;

    /// Write with the given strategy
    async fn copy_with(
        &self,
        strategy: WriteStrategy,
        item: CopyItem<'_>,
        title: &str,
    ) -> Result<WriteResponse, StoreError> {
        match strategy {
            WriteStrategy::Merge => self.merge_copy(item, title).await,
            WriteStrategy::Overwrite => self.overwrite_copy(item, title).await,
        }
    }
}

/// Reconcile incoming content with what already sits at the destination
///
/// When both differ, the destination body is kept inside `da-diff-deleted`
/// and the incoming body inside `da-diff-added`, leaving the choice to an
/// editor. Such documents are refused by the fetch stage until resolved.
pub fn merge_documents(existing: Option<&str>, incoming: &str) -> String {
    let Some(existing) = existing.filter(|e| !e.trim().is_empty()) else {
        return incoming.to_string();
    };
    if existing == incoming {
        return incoming.to_string();
    }

    let old_body = BODY_REGEX
        .captures(existing)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
        .unwrap_or(existing);

    match BODY_REGEX.captures(incoming) {
        Some(caps) => {
            let (Some(whole), Some(open), Some(new_body), Some(close)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                return incoming.to_string();
            };
            debug!("Merging {} bytes into existing document", new_body.as_str().len());
            format!(
                "{}{}<da-diff-deleted data-mdast=\"ignore\">{}</da-diff-deleted><da-diff-added>{}</da-diff-added>{}{}",
                &incoming[..whole.start()],
                open.as_str(),
                old_body,
                new_body.as_str(),
                close.as_str(),
                &incoming[whole.end()..]
            )
        }
        None => format!(
            "<da-diff-deleted data-mdast=\"ignore\">{}</da-diff-deleted><da-diff-added>{}</da-diff-added>",
            old_body, incoming
        ),
    }
}

/// Content type for a destination path
pub fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or_default() {
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "text/html",
    }
}
