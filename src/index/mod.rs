//! Metadata index
//!
//! A JSON file mapping each slug to its post metadata, so listing posts
//! never has to open every post file. The whole file is rewritten on every
//! save; that is a scaling limit at large post counts, not a correctness
//! concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{PostMeta, PostSummary};
use crate::error::{Error, Result};

/// Index file name inside the posts directory
pub const INDEX_FILE: &str = "_index.json";

/// Slug to metadata mapping, persisted as one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataIndex {
    /// Version of the index format
    pub version: u32,
    /// Entries keyed by slug
    pub posts: BTreeMap<String, PostMeta>,
}

impl Default for MetadataIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataIndex {
    /// Current index format version
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            posts: BTreeMap::new(),
        }
    }

    /// Load the index from disk. A missing file is an empty index; an
    /// unreadable or malformed one is `IndexCorrupt`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(Error::io(path)(e)),
        };

        let corrupt = |message: String| Error::IndexCorrupt {
            path: path.to_path_buf(),
            message,
        };

        let index: MetadataIndex =
            serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        if index.version != Self::VERSION {
            return Err(corrupt(format!(
                "unsupported version {} (expected {})",
                index.version,
                Self::VERSION
            )));
        }
        Ok(index)
    }

    /// Write the whole index to disk. The new content goes to `{path}.tmp`
    /// first and is renamed over `path`, so readers never see a partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::io(parent))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::IndexCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tmp = temp_path(path);
        fs::write(&tmp, content).map_err(Error::io(&tmp))?;
        fs::rename(&tmp, path).map_err(Error::io(path))?;
        tracing::debug!("Wrote index with {} entries to {:?}", self.len(), path);
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&PostMeta> {
        self.posts.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.posts.contains_key(slug)
    }

    /// Insert or replace the entry for `slug`
    pub fn upsert(&mut self, slug: &str, meta: PostMeta) {
        self.posts.insert(slug.to_string(), meta);
    }

    pub fn remove(&mut self, slug: &str) -> Option<PostMeta> {
        self.posts.remove(slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// All entries, most recently modified first
    pub fn summaries(&self) -> Vec<PostSummary> {
        let mut rows: Vec<PostSummary> = self
            .posts
            .iter()
            .map(|(slug, meta)| PostSummary {
                slug: slug.clone(),
                meta: meta.clone(),
            })
            .collect();
        rows.sort_by(PostSummary::newest_first);
        rows
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
