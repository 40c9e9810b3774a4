//! Front-matter parsing

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Opening `---` line, then the shortest run of lines up to a closing `---` line
    static ref BLOCK_RE: Regex = Regex::new(r"(?ms)\A---[ \t]*\r?\n(.*?)^---[ \t]*\r?$").unwrap();
}

/// Errors raised while splitting a document into metadata and body
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontMatterError {
    #[error("document does not start with a `---` delimited front-matter block")]
    Missing,
}

/// Key/value metadata block from the head of a markdown document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Fields in the order they appear in the block
    pub fields: IndexMap<String, String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(document: &str) -> Result<(Self, &str), FrontMatterError> {
        let document = document.trim_start();
        let captures = BLOCK_RE.captures(document).ok_or(FrontMatterError::Missing)?;

        // Group 0 always exists on a successful match
        let block = captures.get(0).ok_or(FrontMatterError::Missing)?;
        let interior = captures.get(1).map_or("", |m| m.as_str());

        let mut fields = IndexMap::new();
        for line in interior.lines() {
            if let Some((key, value)) = parse_line(line) {
                fields.insert(key, value);
            }
        }

        let remaining = document[block.end()..].trim();
        Ok((Self { fields }, remaining))
    }

    /// Look up a field by its exact (case-sensitive) key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Serialize back to the on-disk block, values double-quoted
    pub fn to_block(&self) -> String {
        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push_str(": \"");
            out.push_str(value);
            out.push_str("\"\n");
        }
        out.push_str("---\n");
        out
    }
}

/// Split a `key: value` line on the first colon-space.
///
/// Returns `None` for lines that carry no key or no value.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(": ")?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_quotes(value).to_string()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
