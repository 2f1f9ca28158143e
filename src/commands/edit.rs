//! Edit or delete an existing post

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::Post;
use crate::Site;

/// Changes requested on the command line; `None` keeps the current value
#[derive(Debug, Default)]
pub struct PostChanges<'a> {
    pub title: Option<&'a str>,
    pub body_file: Option<&'a Path>,
    pub published: Option<bool>,
}

/// Apply `changes` to the post `slug`. The slug never changes, even when
/// the title does.
pub fn edit_post(site: &Site, slug: &str, changes: PostChanges<'_>) -> Result<Post> {
    let publisher = site.publisher()?;
    let current = publisher.store().load_post(slug)?;

    let title = changes
        .title
        .map(str::to_string)
        .unwrap_or_else(|| current.title.clone());
    let body = match changes.body_file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?,
        None => current.body.clone(),
    };
    let published = changes.published.unwrap_or(current.published);

    let post = publisher.update(slug, &title, &body, published)?;
    println!("Saved: {}", post.slug);
    Ok(post)
}

/// Delete the post `slug`
pub fn delete_post(site: &Site, slug: &str) -> Result<()> {
    site.publisher()?.delete(slug)?;
    println!("Deleted: {}", slug);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_edit_only_publish_flag() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let post = site.store().create_post("Title", "Body", false).unwrap();

        let edited = edit_post(
            &site,
            &post.slug,
            PostChanges {
                published: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(edited.title, "Title");
        assert_eq!(edited.body, "Body");
        assert!(edited.published);
        assert_eq!(edited.created_at, post.created_at);
        assert!(site.output_dir.join("generated_posts/title.html").exists());
    }

    #[test]
    fn test_edit_title_keeps_slug() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let post = site.store().create_post("Old Title", "Body", false).unwrap();

        let edited = edit_post(
            &site,
            &post.slug,
            PostChanges {
                title: Some("New Title"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.slug, "old-title");
        assert_eq!(edited.title, "New Title");
    }

    #[test]
    fn test_edit_unknown_post_fails() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let err = edit_post(&site, "missing", PostChanges::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_unpublished_post() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let post = site.store().create_post("Gone", "", false).unwrap();
        delete_post(&site, &post.slug).unwrap();
        assert!(site.store().list_posts().unwrap().is_empty());
    }
}
