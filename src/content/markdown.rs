//! Markdown rendering with math and syntax highlighting

use ammonia::Builder as Sanitizer;
use katex::{Opts, OutputType};
use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

use crate::helpers::html_escape;

/// Highlight theme used when the site config does not name one
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref BARE_URL_RE: Regex = Regex::new(r"\bhttps?://[^\s<>]+").unwrap();
}

/// Failure in one of the rendering stages
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render math `{expression}`: {message}")]
    Math { expression: String, message: String },
    #[error("highlight theme `{0}` is not available")]
    Theme(String),
    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),
}

/// Markdown renderer with math and syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
    sanitizer: Option<Sanitizer<'static>>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, false, false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool, sanitize: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
            sanitizer: sanitize.then(build_sanitizer),
        }
    }

    /// Whether the configured theme exists in the bundled theme set
    pub fn has_theme(&self) -> bool {
        self.theme_set.themes.contains_key(&self.theme_name)
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_MATH
            | Options::ENABLE_GFM;
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut link_depth = 0usize;

        for event in parser {
            if let Some((lang, code)) = code_block.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let highlighted = self.highlight_code(code, lang.as_deref())?;
                        events.push(Event::Html(CowStr::from(highlighted)));
                        code_block = None;
                    }
                    Event::Text(text) => code.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::InlineMath(source) => {
                    let rendered = render_math(&source, false)?;
                    events.push(Event::InlineHtml(CowStr::from(rendered)));
                }
                Event::DisplayMath(source) => {
                    let rendered = render_math(&source, true)?;
                    events.push(Event::Html(CowStr::from(rendered)));
                }
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Text(text) if link_depth == 0 => autolink(text, &mut events),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        match &self.sanitizer {
            Some(sanitizer) => Ok(sanitizer.clean(&html_output).to_string()),
            None => Ok(html_output),
        }
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError> {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| RenderError::Theme(self.theme_name.clone()))?;

        let highlighted = highlighted_html_for_string(code, &self.syntax_set, syntax, theme)?;
        let class = html_escape(lang);
        if self.line_numbers {
            Ok(add_line_numbers(&highlighted, code.lines().count(), &class))
        } else {
            Ok(format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                class, highlighted
            ))
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a line-number gutter to highlighted code.
///
/// `line_count` is taken from the source; the highlighted markup does not
/// keep one line per source line.
fn add_line_numbers(highlighted: &str, line_count: usize, class: &str) -> String {
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        class, gutter, highlighted
    )
}

fn render_math(expression: &str, display_mode: bool) -> Result<String, RenderError> {
    let math_error = |message: String| RenderError::Math {
        expression: expression.to_string(),
        message,
    };

    let mut builder = Opts::builder();
    builder
        .display_mode(display_mode)
        .output_type(OutputType::Html)
        .throw_on_error(true);
    let opts = builder.build().map_err(|e| math_error(e.to_string()))?;

    katex::render_with_opts(expression, &opts).map_err(|e| math_error(e.to_string()))
}

/// Turn bare `http(s)://` URLs in prose into links
fn autolink<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    if !BARE_URL_RE.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for found in BARE_URL_RE.find_iter(&text) {
        let url = found
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"']);
        let start = found.start();
        let end = start + url.len();

        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.to_string()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Sanitizer that keeps KaTeX and syntect markup intact
fn build_sanitizer() -> Sanitizer<'static> {
    let mut builder = Sanitizer::default();
    builder
        .add_tags(&["figure", "span", "input", "math", "semantics", "annotation"])
        .add_generic_attributes(&["class", "style", "aria-hidden"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("td", &["style"]);
    builder
}

/// Estimate reading time in whole minutes, never less than one
pub fn reading_minutes(markdown: &str) -> usize {
    let words = markdown.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
