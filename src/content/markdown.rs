//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Converts a post body to HTML
pub trait MarkdownToHtml: Send + Sync {
    fn to_html(&self, markdown: &str) -> String;
}

/// pulldown-cmark renderer that highlights fenced code blocks with syntect
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with a syntect theme name; `highlight = false` emits plain
    /// `<pre><code>` blocks
    pub fn with_options(theme: &str, highlight: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            highlight,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;

        let mut events: Vec<Event> = Vec::new();
        // (language, collected source) while inside a code block
        let mut code: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split(|c: char| c == ',' || c.is_whitespace())
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, source)) = code.take() {
                        let block = self.highlight_code(&source, lang.as_deref());
                        events.push(Event::Html(CowStr::from(block)));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, source)) = code.as_mut() {
                        source.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let plain = || {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            )
        };

        if !self.highlight {
            return plain();
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme_set.themes.get(&self.theme_name) else {
            tracing::debug!("Unknown highlight theme '{}'", self.theme_name);
            return plain();
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting failed for '{}': {}", lang, e);
                plain()
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownToHtml for MarkdownRenderer {
    fn to_html(&self, markdown: &str) -> String {
        self.render(markdown)
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
