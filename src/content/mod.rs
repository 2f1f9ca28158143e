//! Content module - post records, post files and the content store

mod clock;
mod frontmatter;
mod markdown;
mod post;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frontmatter::{format_timestamp, parse_timestamp, FrontMatter};
pub use markdown::{MarkdownRenderer, MarkdownToHtml};
pub use post::{Post, PostMeta, PostSummary};
pub use store::{validate_slug, ConsistencyReport, ContentStore};
