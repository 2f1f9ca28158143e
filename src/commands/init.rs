//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::{Site, CONFIG_FILE};

const DEFAULT_CONFIG: &str = r#"# Quire configuration

# Site
title: Quire
description: ''
author: ''

# Directory
posts_dir: posts
output_dir: public
index_file: _index.json

# Generation
per_page: 10
prune_stale: true
highlight:
  enable: true
  theme: base16-ocean.dark
"#;

const WELCOME_BODY: &str = r#"Welcome! This is your first post. It is published, so it already shows up
on the generated site.

## Quick start

```bash
$ quire new "My New Post" --file draft.md
$ quire edit my-new-post --publish
$ quire server
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, DEFAULT_CONFIG)?;
    }

    let site = Site::new(target_dir)?;
    let store = site.store();
    if store.list_posts()?.is_empty() {
        store.create_post("Hello World", WELCOME_BODY, true)?;
    }

    site.generate()?;
    Ok(())
}
