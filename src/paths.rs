/*!
 * Path variant resolution.
 *
 * Every supplied path is expanded into the set of paths the workflow needs:
 * the path relative to the source tree, the content path with extension, the
 * content path inside the destination tree (optionally scoped under a
 * snapshot), and the published path.
 */

use std::fmt::Debug;

/// Input of a path conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest<'a> {
    /// Path as supplied
    pub path: &'a str,
    /// Tree prefix the path is relative to (`/` for the site root)
    pub source_prefix: &'a str,
    /// Tree prefix of the destination
    pub dest_prefix: &'a str,
    /// Snapshot scope (`/.snapshots/{name}`), empty for the main tree
    pub snapshot_prefix: &'a str,
}

/// All path variants derived from one supplied path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathVariants {
    pub base_path: String,
    pub da_base_path: String,
    pub da_dest_path: String,
    pub aem_base_path: String,
    pub ext: String,
    pub has_ext: bool,
}

/// Contract for deriving path variants
pub trait PathResolver: Send + Sync + Debug {
    fn convert(&self, request: &ConvertRequest<'_>) -> PathVariants;
}

/// Snapshot scope prefix for a snapshot name
pub fn snapshot_prefix(snapshot: Option<&str>) -> String {
    match snapshot.map(str::trim) {
        Some(name) if !name.is_empty() => format!("/.snapshots/{}", name),
        _ => String::new(),
    }
}

/// Treat `/` as "no prefix" and drop trailing slashes
fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

/// Strip `prefix` from `path` when the path sits under it
pub fn strip_location<'a>(path: &'a str, prefix: &str) -> &'a str {
    let prefix = normalize_prefix(prefix);
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Resolver following the document-authoring tree conventions
///
/// Paths without an extension are HTML documents stored as `.html`; a
/// trailing slash addresses the folder's `index` document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DaPathResolver;

impl PathResolver for DaPathResolver {
    fn convert(&self, request: &ConvertRequest<'_>) -> PathVariants {
        let supplied = request.path.trim();
        let relative = strip_location(supplied, request.source_prefix);
        let relative = if relative.starts_with('/') {
            relative.to_string()
        } else {
            format!("/{}", relative)
        };

        let base_path = if relative.ends_with('/') {
            format!("{}index", relative)
        } else {
            relative
        };

        let file_name = base_path.rsplit('/').next().unwrap_or_default();
        let has_ext = file_name.contains('.');
        let ext = if has_ext {
            file_name.rsplit('.').next().unwrap_or_default().to_lowercase()
        } else {
            "html".to_string()
        };

        let da_base_path = if has_ext {
            base_path.clone()
        } else {
            format!("{}.html", base_path)
        };

        let aem_base_path = if has_ext {
            base_path.clone()
        } else if let Some(folder) = base_path.strip_suffix("/index") {
            format!("{}/", folder)
        } else {
            base_path.clone()
        };

        let da_dest_path = format!(
            "{}{}{}",
            normalize_prefix(request.snapshot_prefix),
            normalize_prefix(request.dest_prefix),
            da_base_path
        );

        PathVariants {
            base_path,
            da_base_path,
            da_dest_path,
            aem_base_path,
            ext,
            has_ext,
        }
    }
}
