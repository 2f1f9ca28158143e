//! quire: a small markdown blog authoring tool
//!
//! Posts live as markdown files with YAML front-matter next to a JSON
//! metadata index. Saving a published post regenerates the static site:
//! one page per post plus paginated index pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod index;
pub mod publish;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// Config file name at the site root
pub const CONFIG_FILE: &str = "_config.yml";

/// A site on disk: its configuration and resolved directories
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding post files and the index
    pub posts_dir: PathBuf,
    /// Generated output directory
    pub output_dir: PathBuf,
}

impl Site {
    /// Open the site rooted at `base_dir`, using defaults when there is no
    /// `_config.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let output_dir = base_dir.join(&config.output_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            output_dir,
        })
    }

    pub fn store(&self) -> content::ContentStore {
        content::ContentStore::new(self.posts_dir.clone()).with_index_file(&self.config.index_file)
    }

    pub fn generator(&self) -> Result<generator::Generator> {
        generator::Generator::new(&self.config)
    }

    pub fn publisher(&self) -> Result<publish::Publisher> {
        Ok(publish::Publisher::new(
            self.store(),
            self.generator()?,
            self.output_dir.clone(),
        ))
    }

    /// Regenerate the static site
    pub fn generate(&self) -> Result<generator::GenerateReport> {
        self.generator()?
            .generate_site(&self.store(), &self.output_dir)
    }
}
