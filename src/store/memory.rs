/*!
 * In-memory content store.
 *
 * Used by tests and dry runs. Failures can be injected per path to exercise
 * the per-item error handling of the workflow.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{merge_documents, ContentStore, ContentWriter, CopyItem, FetchResponse, WriteResponse};
use crate::errors::StoreError;

/// A write recorded by the store
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub path: String,
    pub merged: bool,
    pub title: String,
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<String, String>,
    failures: HashMap<String, u16>,
    writes: Vec<WriteRecord>,
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.inner.lock().documents.insert(path.into(), content.into());
    }

    /// Current content of a document
    pub fn get(&self, path: &str) -> Option<String> {
        self.inner.lock().documents.get(path).cloned()
    }

    /// Make every fetch and write of `path` answer with `status`
    pub fn fail_on(&self, path: impl Into<String>, status: u16) {
        self.inner.lock().failures.insert(path.into(), status);
    }

    /// Writes performed so far, in order
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.inner.lock().writes.clone()
    }

    fn write(&self, item: CopyItem<'_>, title: &str, merged: bool) -> WriteResponse {
        let mut inner = self.inner.lock();
        if let Some(status) = inner.failures.get(item.destination) {
            return WriteResponse { status: *status };
        }

        let content = if merged {
            merge_documents(inner.documents.get(item.destination).map(String::as_str), item.content)
        } else {
            item.content.to_string()
        };
        inner.documents.insert(item.destination.to_string(), content);
        inner.writes.push(WriteRecord {
            path: item.destination.to_string(),
            merged,
            title: title.to_string(),
        });
        WriteResponse { status: 200 }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, StoreError> {
        let inner = self.inner.lock();
        if let Some(status) = inner.failures.get(path) {
            return Ok(FetchResponse::status(*status));
        }
        Ok(match inner.documents.get(path) {
            Some(text) => FetchResponse::found(text.clone()),
            None => FetchResponse::status(404),
        })
    }
}

#[async_trait]
impl ContentWriter for MemoryStore {
    async fn merge_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError> {
        Ok(self.write(item, title, true))
    }

    async fn overwrite_copy(&self, item: CopyItem<'_>, title: &str) -> Result<WriteResponse, StoreError> {
        Ok(self.write(item, title, false))
    }
}
