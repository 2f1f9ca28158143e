//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::index::INDEX_FILE;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // Directory
    pub posts_dir: String,
    pub output_dir: String,
    pub index_file: String,

    // Generation
    pub per_page: usize,
    /// Delete generated files that the latest successful run did not write
    pub prune_stale: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quire".to_string(),
            description: String::new(),
            author: String::new(),

            posts_dir: "posts".to_string(),
            output_dir: "public".to_string(),
            index_file: INDEX_FILE.to_string(),

            per_page: 10,
            prune_stale: true,
            highlight: HighlightConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        if config.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.output_dir, "public");
        assert_eq!(config.index_file, "_index.json");
        assert_eq!(config.per_page, 10);
        assert!(config.prune_stale);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
per_page: 5
highlight:
  enable: false
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 5);
        assert!(!config.highlight.enable);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.output_dir, "public");
    }

    #[test]
    fn test_zero_per_page_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "per_page: 0\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
