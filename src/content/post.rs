//! Post record and the metadata views derived from it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post: metadata plus raw markdown body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// URL-safe identifier, fixed at creation
    pub slug: String,

    /// Post title
    pub title: String,

    /// Raw markdown content
    pub body: String,

    /// Whether the post appears in the generated site
    pub published: bool,

    /// First save time, never changed afterwards
    pub created_at: DateTime<Utc>,

    /// Time of the latest save
    pub modified_at: DateTime<Utc>,
}

impl Post {
    /// Metadata without the body, as stored in the index
    pub fn meta(&self) -> PostMeta {
        PostMeta {
            title: self.title.clone(),
            published: self.published,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// Everything about a post except its slug and body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A listing row: slug plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    #[serde(flatten)]
    pub meta: PostMeta,
}

impl PostSummary {
    /// Ordering used everywhere posts are listed: most recently modified
    /// first, ties broken by slug ascending
    pub fn newest_first(a: &PostSummary, b: &PostSummary) -> std::cmp::Ordering {
        b.meta
            .modified_at
            .cmp(&a.meta.modified_at)
            .then_with(|| a.slug.cmp(&b.slug))
    }
}
