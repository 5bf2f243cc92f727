use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{merge_documents, ContentStore, ContentWriter, CopyItem, FetchResponse, WriteResponse};
use crate::errors::StoreError;

// @module: Directory-backed content store

// @struct: Content tree rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsContentStore {
    // @field: Directory mirroring `/{org}/{site}/...`
    root: PathBuf,
}

impl FsContentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    // @maps: Content path to a file under the root
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative.components().any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    // @lists: Document paths under `/{org}/{site}{location}`, as supplied paths
    pub fn list_documents(&self, org: &str, site: &str, location: &str) -> Vec<String> {
        let site_root = self.root.join(org).join(site);
        let start = site_root.join(location.trim_start_matches('/'));

        let mut paths: Vec<String> = WalkDir::new(&start)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(&site_root).ok()?;
                let relative = relative.to_string_lossy().replace('\\', "/");
                if relative.split('/').any(|part| part.starts_with('.')) {
                    return None;
                }
                let supplied = relative.strip_suffix(".html").unwrap_or(&relative);
                Some(format!("/{}", supplied))
            })
            .collect();
        paths.sort();
        paths
    }

    async fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        let file = self.resolve(path)?;
        match tokio::fs::read_to_string(&file).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<WriteResponse, StoreError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file, content).await?;
        debug!("Wrote {} bytes to {:?}", content.len(), file);
        Ok(WriteResponse { status: 200 })
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, StoreError> {
        Ok(match self.read(path).await? {
            Some(text) => FetchResponse::found(text),
            None => FetchResponse::status(404),
        })
    }
}

#[async_trait]
impl ContentWriter for FsContentStore {
    async fn merge_copy(&self, item: CopyItem<'_>, _title: &str) -> Result<WriteResponse, StoreError> {
        let existing = self.read(item.destination).await?;
        let merged = merge_documents(existing.as_deref(), item.content);
        self.write(item.destination, &merged).await
    }

    async fn overwrite_copy(&self, item: CopyItem<'_>, _title: &str) -> Result<WriteResponse, StoreError> {
        self.write(item.destination, item.content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_fetch() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::new(dir.path());
        let item = CopyItem { destination: "/org/site/fr/page.html", content: "<body>bonjour</body>" };
        store.overwrite_copy(item, "t").await.unwrap();

        let response = store.fetch("/org/site/fr/page.html").await.unwrap();
        assert!(response.ok);
        assert_eq!(response.text, "<body>bonjour</body>");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::new(dir.path());
        assert_eq!(store.fetch("/org/site/none.html").await.unwrap().status, 404);
    }

    #[test]
    fn test_resolve_rejects_parent_components() {
        let store = FsContentStore::new("/tmp/content");
        assert!(matches!(store.resolve("/org/../../etc/passwd"), Err(StoreError::InvalidPath(_))));
        assert!(store.resolve("/org/site/a.html").is_ok());
    }

    #[test]
    fn test_list_documents_returns_supplied_paths() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("org").join("site");
        std::fs::create_dir_all(site.join("en").join("blog")).unwrap();
        std::fs::create_dir_all(site.join(".snapshots")).unwrap();
        std::fs::write(site.join("en").join("index.html"), "").unwrap();
        std::fs::write(site.join("en").join("blog").join("post.html"), "").unwrap();
        std::fs::write(site.join("en").join("placeholders.json"), "{}").unwrap();
        std::fs::write(site.join(".snapshots").join("x.html"), "").unwrap();

        let store = FsContentStore::new(dir.path());
        assert_eq!(
            store.list_documents("org", "site", "/en"),
            vec!["/en/blog/post", "/en/index", "/en/placeholders.json"]
        );
    }
}
