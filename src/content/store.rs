//! Content store - the single write path for post files and the index

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::{Clock, FrontMatter, Post, PostMeta, PostSummary, SystemClock};
use crate::error::{Error, Result};
use crate::index::{MetadataIndex, INDEX_FILE};

/// Extension of post files
const POST_EXT: &str = "md";

/// Reason given for `.md` files whose name cannot be a slug
const INVALID_NAME: &str = "file name is not a valid slug";

/// Reads and writes posts under one directory and keeps the metadata
/// index in step with them.
///
/// The index is never cached: every operation loads it, changes it and
/// writes it back.
#[derive(Clone)]
pub struct ContentStore {
    posts_dir: PathBuf,
    index_path: PathBuf,
    clock: Arc<dyn Clock>,
}

/// Result of comparing the index against the post files on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// Indexed slugs with no post file
    pub missing_files: Vec<String>,
    /// Post files with no index entry
    pub unindexed_files: Vec<String>,
    /// Entries whose metadata differs from the post file
    pub mismatched: Vec<String>,
    /// Post files that could not be parsed, with the reason
    pub unreadable: Vec<(String, String)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_files.is_empty()
            && self.unindexed_files.is_empty()
            && self.mismatched.is_empty()
            && self.unreadable.is_empty()
    }
}

impl ContentStore {
    /// Store rooted at `posts_dir`, index kept at `posts_dir/_index.json`
    pub fn new<P: Into<PathBuf>>(posts_dir: P) -> Self {
        let posts_dir = posts_dir.into();
        let index_path = posts_dir.join(INDEX_FILE);
        Self {
            posts_dir,
            index_path,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different index file name inside the posts directory
    pub fn with_index_file(mut self, name: &str) -> Self {
        self.index_path = self.posts_dir.join(name);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Location of the post file for `slug`
    pub fn post_path(&self, slug: &str) -> PathBuf {
        self.posts_dir.join(format!("{}.{}", slug, POST_EXT))
    }

    /// Every indexed post, most recently modified first
    pub fn list_posts(&self) -> Result<Vec<PostSummary>> {
        Ok(self.current_index()?.summaries())
    }

    /// Index entry for `slug`, without opening the post file
    pub fn find_entry(&self, slug: &str) -> Result<Option<PostMeta>> {
        validate_slug(slug)?;
        Ok(self.current_index()?.get(slug).cloned())
    }

    /// Read the full post, body included
    pub fn load_post(&self, slug: &str) -> Result<Post> {
        validate_slug(slug)?;
        let path = self.post_path(slug);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(slug.to_string()))
            }
            Err(e) => return Err(Error::io(&path)(e)),
        };

        let (fm, body) = FrontMatter::parse(&content, &path)?;

        let fallback = || file_mtime(&path).unwrap_or_else(|| self.clock.now());
        let modified_at = fm.parse_modified().unwrap_or_else(fallback);
        let created_at = fm.parse_created().unwrap_or(modified_at).min(modified_at);

        Ok(Post {
            slug: slug.to_string(),
            title: fm.title.unwrap_or_else(|| slug.to_string()),
            body: body.to_string(),
            published: fm.published,
            created_at,
            modified_at,
        })
    }

    /// Create or overwrite the post for `slug` and upsert its index entry.
    ///
    /// `created_at` comes from the prior record when there is one, so it is
    /// fixed by the first save. `modified_at` is the current time, never
    /// earlier than the prior `modified_at`.
    ///
    /// The post file is written before the index. If the index write fails
    /// the two are left out of step; `verify` reports it and `rebuild_index`
    /// repairs it.
    pub fn save_post(&self, slug: &str, title: &str, body: &str, published: bool) -> Result<Post> {
        validate_slug(slug)?;
        let mut index = self.current_index()?;

        let prior = match self.load_post(slug) {
            Ok(post) => Some(post.meta()),
            Err(Error::NotFound(_)) => index.get(slug).cloned(),
            Err(Error::FrontMatter { path, message }) => {
                tracing::warn!(
                    "Existing post {:?} is unreadable ({}), using its index entry",
                    path,
                    message
                );
                index.get(slug).cloned()
            }
            Err(e) => return Err(e),
        };

        let now = self.clock.now();
        let (created_at, modified_at) = match &prior {
            Some(prior) => (
                prior.created_at,
                now.max(prior.modified_at).max(prior.created_at),
            ),
            None => (now, now),
        };

        let post = Post {
            slug: slug.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            published,
            created_at,
            modified_at,
        };

        self.write_post_file(&post)?;
        index.upsert(slug, post.meta());
        index.save(&self.index_path)?;

        if prior.is_some() {
            tracing::info!("Updated post '{}'", slug);
        } else {
            tracing::info!("Created post '{}'", slug);
        }
        Ok(post)
    }

    /// Save a brand new post, deriving its slug from `title`.
    ///
    /// A slug already used by an index entry or a post file gets a numeric
    /// suffix (`hello`, `hello-2`, `hello-3`, ...), so an existing post is
    /// never overwritten.
    pub fn create_post(&self, title: &str, body: &str, published: bool) -> Result<Post> {
        let base = slug::slugify(title);
        if base.is_empty() {
            return Err(Error::InvalidTitle(title.to_string()));
        }

        let index = self.current_index()?;
        let taken = |slug: &str| index.contains(slug) || self.post_path(slug).exists();

        let mut slug = base.clone();
        let mut n = 2;
        while taken(&slug) {
            slug = format!("{}-{}", base, n);
            n += 1;
        }
        if slug != base {
            tracing::debug!("Slug '{}' is taken, using '{}'", base, slug);
        }

        self.save_post(&slug, title, body, published)
    }

    /// Remove a post file and its index entry. Returns the metadata the post
    /// had, so callers can tell whether it was published.
    ///
    /// A post file that cannot be parsed and has no index entry is left in
    /// place and reported as `Inconsistent`.
    pub fn delete_post(&self, slug: &str) -> Result<PostMeta> {
        validate_slug(slug)?;
        let mut index = self.current_index()?;

        let from_file = match self.load_post(slug) {
            Ok(post) => Some(post.meta()),
            Err(Error::NotFound(_)) | Err(Error::FrontMatter { .. }) => None,
            Err(e) => return Err(e),
        };

        let path = self.post_path(slug);
        let file_exists = path.exists();
        let Some(meta) = from_file.or_else(|| index.get(slug).cloned()) else {
            if file_exists {
                return Err(Error::Inconsistent {
                    slug: slug.to_string(),
                    detail: "post file is unreadable and has no index entry".to_string(),
                });
            }
            return Err(Error::NotFound(slug.to_string()));
        };

        if file_exists {
            fs::remove_file(&path).map_err(Error::io(&path))?;
        }
        if index.remove(slug).is_some() {
            index.save(&self.index_path)?;
        }

        tracing::info!("Deleted post '{}'", slug);
        Ok(meta)
    }

    /// Recreate the index from the post files on disk
    pub fn rebuild_index(&self) -> Result<MetadataIndex> {
        let mut index = MetadataIndex::new();
        let files = self.post_files()?;
        for name in &files.invalid {
            tracing::warn!("Skipping {:?} while rebuilding index: {}", name, INVALID_NAME);
        }
        for slug in files.slugs {
            match self.load_post(&slug) {
                Ok(post) => index.upsert(&slug, post.meta()),
                Err(e) => tracing::warn!("Skipping '{}' while rebuilding index: {}", slug, e),
            }
        }
        index.save(&self.index_path)?;
        tracing::info!("Rebuilt index with {} posts", index.len());
        Ok(index)
    }

    /// Compare the index with the post files without changing anything
    pub fn verify(&self) -> Result<ConsistencyReport> {
        let index = MetadataIndex::load(&self.index_path)?;
        let mut report = ConsistencyReport::default();
        let files = self.post_files()?;

        for name in files.invalid {
            report.unreadable.push((name, INVALID_NAME.to_string()));
        }
        for slug in files.slugs {
            let Some(entry) = index.get(&slug) else {
                report.unindexed_files.push(slug);
                continue;
            };
            match self.load_post(&slug) {
                Ok(post) if &post.meta() != entry => report.mismatched.push(slug),
                Ok(_) => {}
                Err(e) => report.unreadable.push((slug, e.to_string())),
            }
        }

        for slug in index.posts.keys() {
            if !self.post_path(slug).exists() {
                report.missing_files.push(slug.clone());
            }
        }

        Ok(report)
    }

    /// Load the index, rebuilding it from post files if it is corrupt
    fn current_index(&self) -> Result<MetadataIndex> {
        match MetadataIndex::load(&self.index_path) {
            Err(Error::IndexCorrupt { path, message }) => {
                tracing::warn!("Index {:?} is corrupt ({}), rebuilding", path, message);
                self.rebuild_index()
            }
            other => other,
        }
    }

    fn write_post_file(&self, post: &Post) -> Result<()> {
        fs::create_dir_all(&self.posts_dir).map_err(Error::io(&self.posts_dir))?;

        let path = self.post_path(&post.slug);
        let fm = FrontMatter {
            title: Some(post.title.clone()),
            published: post.published,
            created_at: Some(super::format_timestamp(&post.created_at)),
            modified_at: Some(super::format_timestamp(&post.modified_at)),
        };
        let content = fm.render(&post.body, &path)?;
        fs::write(&path, content).map_err(Error::io(&path))?;
        tracing::debug!("Wrote {:?}", path);
        Ok(())
    }

    /// Every post file in the posts directory, sorted by name
    fn post_files(&self) -> Result<PostFiles> {
        let mut files = PostFiles::default();
        if !self.posts_dir.exists() {
            return Ok(files);
        }

        for entry in WalkDir::new(&self.posts_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io {
                path: self.posts_dir.clone(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(POST_EXT) {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if validate_slug(&stem).is_ok() {
                files.slugs.push(stem);
            } else {
                files.invalid.push(stem);
            }
        }
        files.slugs.sort();
        files.invalid.sort();
        Ok(files)
    }
}

/// Post files found on disk, split by whether the file name is a valid slug
#[derive(Default)]
struct PostFiles {
    slugs: Vec<String>,
    invalid: Vec<String>,
}

/// Accept only lowercase `[a-z0-9-]` slugs that do not start or end with '-'
pub fn validate_slug(slug: &str) -> Result<()> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(Error::InvalidSlug(slug.to_string()))
    }
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
