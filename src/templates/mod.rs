//! Built-in page templates using the Tera template engine
//!
//! The post and index templates are embedded in the binary.

use serde_json::Value;
use tera::{Context, Tera};

use crate::error::{Error, Result};

/// Template for a single post page
pub const POST_TEMPLATE: &str = "post.html";
/// Template for a paginated listing page
pub const INDEX_TEMPLATE: &str = "index.html";

/// Renders a named template from a field mapping
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, fields: &Value) -> Result<String>;
}

/// Tera renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all built-in templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            (POST_TEMPLATE, include_str!("default/post.html")),
            (INDEX_TEMPLATE, include_str!("default/index.html")),
        ])
        .map_err(|e| render_error("layout.html", e))?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }
}

impl TemplateEngine for TemplateRenderer {
    fn render(&self, template: &str, fields: &Value) -> Result<String> {
        let context = Context::from_value(fields.clone()).map_err(|e| render_error(template, e))?;
        self.tera
            .render(template, &context)
            .map_err(|e| render_error(template, e))
    }
}

fn render_error(template: &str, err: tera::Error) -> Error {
    // Tera keeps the useful part of the message in the source chain
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Render {
        template: template.to_string(),
        message,
    }
}

/// Tera filter: show an RFC 3339 timestamp as a calendar date
fn date_format_filter(
    value: &tera::Value,
    args: &std::collections::HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    match crate::content::parse_timestamp(&s) {
        Some(at) => Ok(tera::Value::String(at.format(&format).to_string())),
        None => Ok(tera::Value::String(s)),
    }
}
