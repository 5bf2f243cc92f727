use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::{content_type_for, merge_documents, ContentStore, ContentWriter, CopyItem, FetchResponse, WriteResponse};
use crate::errors::StoreError;

/// Default content origin
pub const DEFAULT_ORIGIN: &str = "https://admin.da.live";

/// Client for a remote content origin
///
/// Documents live under `{origin}/source{path}`; writes are multipart uploads
/// with the document in the `data` part.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    /// Origin without trailing slash
    origin: String,
    /// Optional bearer token
    token: Option<String>,
    /// HTTP client for making requests
    client: Client,
}

/// Version label sent before a destination is replaced
#[derive(Debug, Serialize)]
struct VersionRequest<'a> {
    label: &'a str,
}

impl HttpContentStore {
    /// Create a store for `origin`
    pub fn new(origin: &str, token: Option<String>) -> Result<Self, StoreError> {
        let parsed = Url::parse(origin).map_err(|e| StoreError::InvalidPath(format!("{}: {}", origin, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::InvalidPath(format!("{}: unsupported scheme", origin)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StoreError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Full URL of a document
    pub fn source_url(&self, path: &str) -> String {
        format!("{}/source{}", self.origin, path)
    }

    fn version_url(&self, path: &str) -> String {
        format!("{}/versionsource{}", self.origin, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn upload(&self, path: &str, content: &str) -> Result<WriteResponse, StoreError> {
        let part = Part::text(content.to_string())
            .file_name(path.rsplit('/').next().unwrap_or_default().to_string())
            .mime_str(content_type_for(path))?;
        let form = Form::new().part("data", part);

        let response = self
            .authorize(self.client.post(self.source_url(path)))
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        debug!("Uploaded {} -> {}", path, status);
        Ok(WriteResponse { status })
    }

    /// Label the current destination version so it can be recovered
    async fn create_version(&self, path: &str, title: &str) {
        let label = format!("Localization: {}", title);
        let request = self
            .authorize(self.client.post(self.version_url(path)))
            .json(&VersionRequest { label: &label });
        match request.send().await {
            Ok(response) if response.status().is_success() => debug!("Versioned {} as '{}'", path, label),
            Ok(response) => debug!("No version created for {} ({})", path, response.status()),
            Err(e) => warn!("Failed to version {}: {}", path, e),
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, StoreError> {
        let response = self.authorize(self.client.get(self.source_url(path))).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(FetchResponse::status(status.as_u16()));
        }
        let text = response.text().await?;
        Ok(FetchResponse { ok: true, status: status.as_u16(), text })
    }
}

#[async_trait]
impl ContentWriter for HttpContentStore {
    async fn merge_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError> {
        let existing = self.fetch(item.destination).await?;
        let existing = existing.ok.then_some(existing.text);
        let merged = merge_documents(existing.as_deref(), item.content);
        if existing.as_deref().is_some_and(|e| e != merged) {
            self.create_version(item.destination, title).await;
        }
        self.upload(item.destination, &merged).await
    }

    async fn overwrite_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError> {
        self.create_version(item.destination, title).await;
        self.upload(item.destination, item.content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_joins_origin_and_path() {
        let store = HttpContentStore::new("https://admin.da.live/", None).unwrap();
        assert_eq!(
            store.source_url("/org/site/fr/index.html"),
            "https://admin.da.live/source/org/site/fr/index.html"
        );
    }

    #[test]
    fn test_new_rejects_non_http_origin() {
        assert!(HttpContentStore::new("ftp://example.com", None).is_err());
        assert!(HttpContentStore::new("not a url", None).is_err());
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let store = HttpContentStore::new(DEFAULT_ORIGIN, Some(String::new())).unwrap();
        assert!(store.token.is_none());
    }
}
