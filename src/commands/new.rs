//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::Post;
use crate::Site;

/// Create a post titled `title`, taking the body from `body_file` if given
pub fn create_post(site: &Site, title: &str, body_file: Option<&Path>, publish: bool) -> Result<Post> {
    let body = match body_file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?,
        None => String::new(),
    };

    let post = site.publisher()?.create(title, &body, publish)?;

    println!(
        "Created: {:?}{}",
        site.store().post_path(&post.slug),
        if post.published { " (published)" } else { " (draft)" }
    );
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_draft_from_file() {
        let dir = TempDir::new().unwrap();
        let body_path = dir.path().join("body.md");
        fs::write(&body_path, "Draft body").unwrap();

        let site = Site::new(dir.path()).unwrap();
        let post = create_post(&site, "My Draft", Some(&body_path), false).unwrap();

        assert_eq!(post.slug, "my-draft");
        assert_eq!(site.store().load_post("my-draft").unwrap().body, "Draft body");
        assert!(!site.output_dir.join("index.html").exists());
    }

    #[test]
    fn test_create_published_generates_site() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        create_post(&site, "Live", None, true).unwrap();
        assert!(site.output_dir.join("generated_posts/live.html").exists());
    }
}
