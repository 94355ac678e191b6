// Upload file metadata passed through the pipeline

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Metadata the upload handler keeps for a stored file.
///
/// Only `url`, `title`, `type` and `size` are ever rewritten; `state` and
/// any other fields pass through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Extension with a leading dot, e.g. `.webp`
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FileRecord {
    /// Describe a file on disk the way the upload handler would.
    pub fn for_path(path: &Path, document_root: Option<&Path>) -> std::io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        Ok(Self {
            url: public_url(path, document_root),
            title: file_name(path),
            file_type: path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default(),
            size,
            state: "SUCCESS".to_string(),
            extra: serde_json::Map::new(),
        })
    }
}

/// Public URL for a stored file: the path with `document_root` stripped and
/// `/` separators.
///
/// Paths outside `document_root` (or with no root configured) are returned
/// as-is.
pub fn public_url(path: &Path, document_root: Option<&Path>) -> String {
    let relative = document_root.and_then(|root| path.strip_prefix(root).ok());

    match relative {
        Some(rest) => {
            let parts: Vec<String> = rest
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            format!("/{}", parts.join("/"))
        }
        None => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Final path component, or an empty string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
