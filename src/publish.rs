//! Edit workflow: save through the content store, then regenerate the site
//! whenever the change can affect what is published.

use std::path::{Path, PathBuf};

use crate::content::{ContentStore, Post};
use crate::error::Result;
use crate::generator::{GenerateReport, Generator};

/// Ties the content store to the generator and its output directory
pub struct Publisher {
    store: ContentStore,
    generator: Generator,
    output_dir: PathBuf,
}

impl Publisher {
    pub fn new(store: ContentStore, generator: Generator, output_dir: PathBuf) -> Self {
        Self {
            store,
            generator,
            output_dir,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create a post from a title; regenerates if it is published
    pub fn create(&self, title: &str, body: &str, published: bool) -> Result<Post> {
        let post = self.store.create_post(title, body, published)?;
        if post.published {
            self.regenerate()?;
        }
        Ok(post)
    }

    /// Save an existing (or new) slug. Regenerates when the post was
    /// published before the save or is published after it.
    pub fn update(&self, slug: &str, title: &str, body: &str, published: bool) -> Result<Post> {
        let was_published = self
            .store
            .find_entry(slug)?
            .is_some_and(|entry| entry.published);

        let post = self.store.save_post(slug, title, body, published)?;
        if was_published || post.published {
            self.regenerate()?;
        } else {
            tracing::debug!("'{}' is a draft, site left as is", slug);
        }
        Ok(post)
    }

    /// Delete a post; regenerates if it was published
    pub fn delete(&self, slug: &str) -> Result<()> {
        let removed = self.store.delete_post(slug)?;
        if removed.published {
            self.regenerate()?;
        }
        Ok(())
    }

    /// Full regeneration of the output directory
    pub fn regenerate(&self) -> Result<GenerateReport> {
        self.generator.generate_site(&self.store, &self.output_dir)
    }
}
