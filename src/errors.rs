/*!
 * Error types for the locsync library.
 *
 * This module contains custom error types for different parts of the workflow,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Per-item failures (a URL that cannot be fetched, protected or saved) are
 * recorded as text on the owning record and never escape a batch. Only the
 * pre-dispatch validation gate surfaces a batch-level [`LocError`].
 */

use thiserror::Error;

/// Errors raised by the do-not-translate codec
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DntError {
    /// The input declared as JSON could not be parsed
    #[error("Invalid JSON document: {0}")]
    InvalidJson(String),

    /// A protected JSON envelope could not be decoded back into JSON
    #[error("Malformed JSON envelope: {0}")]
    MalformedEnvelope(String),

    /// The rewritten document could not be written back out
    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    /// Restoring media references needs the owning org and site
    #[error("Missing {0} for restoring site media references")]
    MissingContext(&'static str),
}

/// Errors that can occur when talking to a content store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The HTTP request itself failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// A filesystem operation failed
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// The path cannot be mapped into the store
    #[error("Invalid store path: {0}")]
    InvalidPath(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed(error.to_string())
    }
}

/// Errors that can occur inside a translation connector
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// No connector is registered for the requested service
    #[error("Unknown translation service: {0}")]
    UnknownService(String),

    /// The service rejected or failed a dispatch
    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    /// Error from the codec while preparing or restoring content
    #[error("DNT error: {0}")]
    Dnt(#[from] DntError),
}

/// A URL that blocks dispatch, with the reason recorded on it
#[derive(Debug, Clone, PartialEq)]
pub struct UrlError {
    /// The path as supplied by the user
    pub supplied_path: String,
    /// The recorded error text
    pub error: String,
}

impl std::fmt::Display for UrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.supplied_path, self.error)
    }
}

/// Workflow-level errors
#[derive(Error, Debug)]
pub enum LocError {
    /// Content could not be fetched (non-success response)
    #[error("Error fetching content from {path} - {status}")]
    Fetch {
        /// Destination path that was requested
        path: String,
        /// Response status code
        status: u16,
    },

    /// Pending collaborative edits are present in the fetched content
    #[error("{0} has unmerged changes. Please resolve before translating.")]
    UnresolvedEdits(String),

    /// The codec failed while protecting content
    #[error("Error adding DNT to {path} - {source}")]
    Protection {
        /// Path of the document being protected
        path: String,
        /// Underlying codec failure
        source: DntError,
    },

    /// One or more URLs carry errors, dispatch was not attempted
    #[error("{} item(s) have errors: {}", .0.len(), join_errors(.0))]
    Validation(Vec<UrlError>),

    /// A language saved fewer items than it has
    #[error("Saved {saved} of {total} items for {lang}")]
    Save {
        /// Language name
        lang: String,
        /// Successful writes
        saved: usize,
        /// Expected writes
        total: usize,
    },

    /// Error from a connector
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// Error from a content store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

fn join_errors(errors: &[UrlError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_matches_record_text() {
        let err = LocError::Fetch { path: "/fr/page.html".to_string(), status: 404 };
        assert_eq!(err.to_string(), "Error fetching content from /fr/page.html - 404");
    }

    #[test]
    fn test_validation_error_lists_every_url() {
        let err = LocError::Validation(vec![
            UrlError { supplied_path: "/a".to_string(), error: "boom".to_string() },
            UrlError { supplied_path: "/b".to_string(), error: "bang".to_string() },
        ]);
        assert_eq!(err.to_string(), "2 item(s) have errors: /a: boom; /b: bang");
    }

    #[test]
    fn test_protection_error_wraps_codec_failure() {
        let err = LocError::Protection {
            path: "/placeholders.json".to_string(),
            source: DntError::InvalidJson("expected value".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error adding DNT to /placeholders.json - Invalid JSON document: expected value"
        );
    }
}
