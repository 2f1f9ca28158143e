//! Error types shared by the content store and the site generator

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while reading, writing or rendering site content
#[derive(Error, Debug)]
pub enum Error {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata index {path:?} is corrupt: {message}")]
    IndexCorrupt { path: PathBuf, message: String },

    #[error("Index and post files disagree for '{slug}': {detail}")]
    Inconsistent { slug: String, detail: String },

    #[error("Invalid front-matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Title {0:?} does not produce a usable slug")]
    InvalidTitle(String),

    #[error("Render error in template '{template}': {message}")]
    Render { template: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a `map_err` adapter that attaches `path` to an IO error
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error should be reported to an admin client as a bad request
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::InvalidSlug(_) | Error::InvalidTitle(_))
    }
}
