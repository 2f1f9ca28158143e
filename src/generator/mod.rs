//! Generator module - renders published posts and paginated index pages
//!
//! Every run is a full regeneration: each published post gets
//! `generated_posts/{slug}.html` and the listing is written as
//! `index.html`, `page-2.html`, `page-3.html`, ...

mod pagination;

pub use pagination::{page_file_name, PageSpan, Paginator, FIRST_PAGE};

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{
    format_timestamp, ContentStore, MarkdownRenderer, MarkdownToHtml, Post, PostSummary,
};
use crate::error::{Error, Result};
use crate::templates::{TemplateEngine, TemplateRenderer, INDEX_TEMPLATE, POST_TEMPLATE};

/// Directory under the output dir holding one page per post
pub const POSTS_OUTPUT_DIR: &str = "generated_posts";

/// Site-wide fields available to every template as `site`
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
}

/// What a generation run wrote and removed
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub posts: usize,
    pub pages: usize,
    pub pruned: Vec<PathBuf>,
}

/// Static site generator
pub struct Generator {
    templates: Box<dyn TemplateEngine>,
    markdown: Box<dyn MarkdownToHtml>,
    site: SiteData,
    per_page: usize,
    prune_stale: bool,
}

impl Generator {
    /// Create a generator with the built-in templates and markdown renderer
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let templates = TemplateRenderer::new()?;
        let markdown =
            MarkdownRenderer::with_options(&config.highlight.theme, config.highlight.enable);

        Ok(Self::with_engines(
            Box::new(templates),
            Box::new(markdown),
            config.per_page,
        )
        .with_site(SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
        })
        .prune_stale(config.prune_stale))
    }

    /// Create a generator from explicit rendering capabilities
    pub fn with_engines(
        templates: Box<dyn TemplateEngine>,
        markdown: Box<dyn MarkdownToHtml>,
        per_page: usize,
    ) -> Self {
        Self {
            templates,
            markdown,
            site: SiteData::default(),
            per_page: per_page.max(1),
            prune_stale: true,
        }
    }

    pub fn with_site(mut self, site: SiteData) -> Self {
        self.site = site;
        self
    }

    pub fn prune_stale(mut self, prune: bool) -> Self {
        self.prune_stale = prune;
        self
    }

    /// Regenerate the whole site from the store's current state.
    ///
    /// Any read, render or write error aborts the run. Files already written
    /// by the failed run stay on disk and nothing is pruned.
    pub fn generate_site(&self, store: &ContentStore, output_dir: &Path) -> Result<GenerateReport> {
        let start = std::time::Instant::now();

        let mut published: Vec<PostSummary> = store
            .list_posts()?
            .into_iter()
            .filter(|p| p.meta.published)
            .collect();
        published.sort_by(PostSummary::newest_first);

        let posts_dir = output_dir.join(POSTS_OUTPUT_DIR);
        fs::create_dir_all(&posts_dir).map_err(Error::io(&posts_dir))?;

        self.generate_post_pages(store, &published, &posts_dir)?;
        let paginator = Paginator::new(published.len(), self.per_page);
        self.generate_index_pages(&published, &paginator, output_dir)?;

        let mut report = GenerateReport {
            posts: published.len(),
            pages: paginator.page_count(),
            pruned: Vec::new(),
        };

        if self.prune_stale {
            let keep: HashSet<&str> = published.iter().map(|p| p.slug.as_str()).collect();
            report.pruned = prune_stale_files(output_dir, &posts_dir, &keep, report.pages)?;
        }

        tracing::info!(
            "Generated {} posts and {} index pages in {:.2}s",
            report.posts,
            report.pages,
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Generate individual post pages
    fn generate_post_pages(
        &self,
        store: &ContentStore,
        published: &[PostSummary],
        posts_dir: &Path,
    ) -> Result<()> {
        for summary in published {
            let post = match store.load_post(&summary.slug) {
                Ok(post) => post,
                Err(Error::NotFound(slug)) => {
                    return Err(Error::Inconsistent {
                        slug,
                        detail: "indexed but the post file is missing".to_string(),
                    })
                }
                Err(e) => return Err(e),
            };

            let html = self.render_post(&post)?;
            let output_path = posts_dir.join(format!("{}.html", post.slug));
            fs::write(&output_path, html).map_err(Error::io(&output_path))?;
            tracing::debug!("Generated post: {:?}", output_path);
        }
        Ok(())
    }

    fn render_post(&self, post: &Post) -> Result<String> {
        let fields = json!({
            "site": self.site,
            "slug": post.slug,
            "title": post.title,
            "content": self.markdown.to_html(&post.body),
            "created_at": format_timestamp(&post.created_at),
            "modified_at": format_timestamp(&post.modified_at),
        });
        self.templates.render(POST_TEMPLATE, &fields)
    }

    /// Generate index pages with pagination
    fn generate_index_pages(
        &self,
        published: &[PostSummary],
        paginator: &Paginator,
        output_dir: &Path,
    ) -> Result<()> {
        for page in paginator.pages() {
            let page_posts: Vec<Value> = published[page.items.clone()]
                .iter()
                .map(|p| {
                    json!({
                        "slug": p.slug,
                        "title": p.meta.title,
                        "url": format!("{}/{}.html", POSTS_OUTPUT_DIR, p.slug),
                        "created_at": format_timestamp(&p.meta.created_at),
                        "modified_at": format_timestamp(&p.meta.modified_at),
                    })
                })
                .collect();

            let fields = json!({
                "site": self.site,
                "posts": page_posts,
                "page": page.number,
                "total_pages": page.total_pages,
                "prev_url": page.prev_url(),
                "next_url": page.next_url(),
            });
            let html = self.templates.render(INDEX_TEMPLATE, &fields)?;

            let output_path = output_dir.join(page.file_name());
            fs::write(&output_path, html).map_err(Error::io(&output_path))?;
            tracing::debug!("Generated: {:?}", output_path);
        }
        Ok(())
    }
}

/// Remove post pages for slugs outside `keep` and listing pages past
/// `total_pages`
fn prune_stale_files(
    output_dir: &Path,
    posts_dir: &Path,
    keep: &HashSet<&str>,
    total_pages: usize,
) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::new();

    for path in html_files(posts_dir)? {
        let slug = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if !keep.contains(slug) {
            stale.push(path);
        }
    }

    for path in html_files(output_dir)? {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        if pagination::parse_page_file_name(name).is_some_and(|n| n > total_pages) {
            stale.push(path);
        }
    }

    for path in &stale {
        fs::remove_file(path).map_err(Error::io(path))?;
        tracing::info!("Removed stale output {:?}", path);
    }
    Ok(stale)
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|e| e.to_str()) == Some("html")
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ManualClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Writes the template name and fields as JSON so tests can inspect them
    struct JsonTemplates;

    impl TemplateEngine for JsonTemplates {
        fn render(&self, template: &str, fields: &Value) -> Result<String> {
            Ok(json!({ "template": template, "fields": fields }).to_string())
        }
    }

    struct FailingTemplates;

    impl TemplateEngine for FailingTemplates {
        fn render(&self, template: &str, _fields: &Value) -> Result<String> {
            Err(Error::Render {
                template: template.to_string(),
                message: "boom".to_string(),
            })
        }
    }

    struct TaggedMarkdown;

    impl MarkdownToHtml for TaggedMarkdown {
        fn to_html(&self, markdown: &str) -> String {
            format!("<md>{}</md>", markdown)
        }
    }

    struct Fixture {
        dir: TempDir,
        store: ContentStore,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let clock = Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            ));
            let store = ContentStore::new(dir.path().join("posts")).with_clock(clock.clone());
            Self { dir, store, clock }
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("public")
        }

        fn save(&self, slug: &str, published: bool) {
            self.store
                .save_post(slug, &slug.to_uppercase(), &format!("body of {slug}"), published)
                .unwrap();
            self.clock.advance(Duration::minutes(1));
        }

        fn generate(&self) -> Result<GenerateReport> {
            generator().generate_site(&self.store, &self.output())
        }

        fn read(&self, name: &str) -> Value {
            let text = fs::read_to_string(self.output().join(name)).unwrap();
            serde_json::from_str(&text).unwrap()
        }

        fn page_slugs(&self, name: &str) -> Vec<String> {
            self.read(name)["fields"]["posts"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["slug"].as_str().unwrap().to_string())
                .collect()
        }
    }

    fn generator() -> Generator {
        Generator::with_engines(Box::new(JsonTemplates), Box::new(TaggedMarkdown), 10)
    }

    fn slug(n: usize) -> String {
        format!("post-{:02}", n)
    }

    #[test]
    fn test_no_published_posts_yields_one_empty_page() {
        let fx = Fixture::new();
        fx.save("draft", false);

        let report = fx.generate().unwrap();
        assert_eq!(report.posts, 0);
        assert_eq!(report.pages, 1);

        let index = fx.read("index.html");
        assert_eq!(index["template"], "index.html");
        assert_eq!(index["fields"]["posts"], json!([]));
        assert_eq!(index["fields"]["page"], 1);
        assert_eq!(index["fields"]["total_pages"], 1);
        assert!(index["fields"]["prev_url"].is_null());
        assert!(index["fields"]["next_url"].is_null());
        assert!(!fx.output().join("page-2.html").exists());
        assert!(!fx.output().join(POSTS_OUTPUT_DIR).join("draft.html").exists());
    }

    #[test]
    fn test_twenty_five_posts_paginate_into_three_pages() {
        let fx = Fixture::new();
        for n in 1..=25 {
            fx.save(&slug(n), true);
        }

        let report = fx.generate().unwrap();
        assert_eq!(report.posts, 25);
        assert_eq!(report.pages, 3);

        let newest_first: Vec<String> = (1..=25).rev().map(slug).collect();

        let first = fx.read("index.html");
        assert_eq!(fx.page_slugs("index.html"), newest_first[0..10]);
        assert!(first["fields"]["prev_url"].is_null());
        assert_eq!(first["fields"]["next_url"], "page-2.html");
        assert_eq!(first["fields"]["total_pages"], 3);

        let second = fx.read("page-2.html");
        assert_eq!(fx.page_slugs("page-2.html"), newest_first[10..20]);
        assert_eq!(second["fields"]["page"], 2);
        assert_eq!(second["fields"]["prev_url"], "index.html");
        assert_eq!(second["fields"]["next_url"], "page-3.html");

        let third = fx.read("page-3.html");
        assert_eq!(fx.page_slugs("page-3.html"), newest_first[20..25]);
        assert_eq!(third["fields"]["prev_url"], "page-2.html");
        assert!(third["fields"]["next_url"].is_null());

        assert!(!fx.output().join("page-4.html").exists());
        for n in 1..=25 {
            assert!(fx
                .output()
                .join(POSTS_OUTPUT_DIR)
                .join(format!("{}.html", slug(n)))
                .exists());
        }
    }

    #[test]
    fn test_post_page_fields() {
        let fx = Fixture::new();
        fx.save("hello", true);
        fx.generate().unwrap();

        let page = fx.read(&format!("{}/hello.html", POSTS_OUTPUT_DIR));
        assert_eq!(page["template"], "post.html");
        assert_eq!(page["fields"]["title"], "HELLO");
        assert_eq!(page["fields"]["content"], "<md>body of hello</md>");
        assert_eq!(page["fields"]["created_at"], "2024-06-01T10:00:00Z");
        assert_eq!(page["fields"]["modified_at"], "2024-06-01T10:00:00Z");

        let listed = &fx.read("index.html")["fields"]["posts"][0];
        assert_eq!(listed["url"], "generated_posts/hello.html");
    }

    #[test]
    fn test_equal_timestamps_sorted_by_slug() {
        let fx = Fixture::new();
        for s in ["charlie", "alpha", "bravo"] {
            fx.store.save_post(s, s, "", true).unwrap();
        }
        fx.generate().unwrap();
        assert_eq!(fx.page_slugs("index.html"), vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_unpublishing_removes_post_everywhere() {
        let fx = Fixture::new();
        for n in 1..=11 {
            fx.save(&slug(n), true);
        }
        fx.generate().unwrap();
        assert!(fx.output().join("page-2.html").exists());

        fx.save(&slug(11), false);
        let report = fx.generate().unwrap();

        let gone = fx.output().join(POSTS_OUTPUT_DIR).join("post-11.html");
        assert!(!gone.exists());
        assert!(!fx.output().join("page-2.html").exists());
        assert!(report.pruned.contains(&gone));
        assert!(!fx.page_slugs("index.html").contains(&slug(11)));
        assert_eq!(fx.read("index.html")["fields"]["total_pages"], 1);
    }

    #[test]
    fn test_pruning_can_be_disabled() {
        let fx = Fixture::new();
        fx.save("kept", true);
        fx.generate().unwrap();

        fx.save("kept", false);
        let report = generator()
            .prune_stale(false)
            .generate_site(&fx.store, &fx.output())
            .unwrap();
        assert!(report.pruned.is_empty());
        assert!(fx.output().join(POSTS_OUTPUT_DIR).join("kept.html").exists());
        assert!(fx.page_slugs("index.html").is_empty());
    }

    #[test]
    fn test_pruning_leaves_unrelated_files() {
        let fx = Fixture::new();
        fx.save("a", true);
        fs::create_dir_all(fx.output()).unwrap();
        fs::write(fx.output().join("about.html"), "mine").unwrap();
        fs::write(fx.output().join("page-1.html"), "mine").unwrap();

        fx.generate().unwrap();
        assert!(fx.output().join("about.html").exists());
        assert!(fx.output().join("page-1.html").exists());
    }

    #[test]
    fn test_missing_post_file_aborts_as_inconsistent() {
        let fx = Fixture::new();
        fx.save("present", true);
        fx.save("vanished", true);
        fs::create_dir_all(fx.output().join(POSTS_OUTPUT_DIR)).unwrap();
        fs::write(fx.output().join("page-9.html"), "old").unwrap();
        fs::remove_file(fx.store.post_path("vanished")).unwrap();

        let err = fx.generate().unwrap_err();
        assert!(matches!(err, Error::Inconsistent { slug, .. } if slug == "vanished"));
        // a failed run never prunes
        assert!(fx.output().join("page-9.html").exists());
    }

    #[test]
    fn test_render_failure_aborts_run() {
        let fx = Fixture::new();
        fx.save("a", true);

        let err = Generator::with_engines(Box::new(FailingTemplates), Box::new(TaggedMarkdown), 10)
            .generate_site(&fx.store, &fx.output())
            .unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
        assert!(!fx.output().join("index.html").exists());
    }

    #[test]
    fn test_builtin_templates_end_to_end() {
        let fx = Fixture::new();
        fx.store
            .save_post("hello", "Hello World", "Some *markdown*.", true)
            .unwrap();

        let config = SiteConfig {
            title: "Test Blog".to_string(),
            ..SiteConfig::default()
        };
        Generator::new(&config)
            .unwrap()
            .generate_site(&fx.store, &fx.output())
            .unwrap();

        let index = fs::read_to_string(fx.output().join("index.html")).unwrap();
        assert!(index.contains("Test Blog"));
        assert!(index.contains(r#"href="generated_posts/hello.html""#));
        assert!(index.contains("Hello World"));

        let post =
            fs::read_to_string(fx.output().join(POSTS_OUTPUT_DIR).join("hello.html")).unwrap();
        assert!(post.contains("<em>markdown</em>"));
    }
}
