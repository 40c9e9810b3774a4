//! Post model and metadata validation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::FrontMatter;

/// A required field was absent or a field failed its shape check
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `date` is not a recognizable date: {0:?}")]
    InvalidDate(String),
}

/// Validated front-matter of a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMetadata {
    pub title: String,
    pub description: String,

    /// Date exactly as written in the front-matter
    pub date: String,

    /// Parsed publication date, used for ordering
    pub published: DateTime<Utc>,

    /// Identifier of the discussion thread attached to the post
    #[serde(rename = "discussionId", skip_serializing_if = "Option::is_none")]
    pub discussion_id: Option<String>,
}

impl PostMetadata {
    /// Check required fields and date shape
    pub fn from_frontmatter(fm: &FrontMatter) -> Result<Self, ValidationError> {
        let title = required(fm, "title")?;
        let description = required(fm, "description")?;
        let date = required(fm, "date")?;
        let published =
            parse_date_string(&date).ok_or_else(|| ValidationError::InvalidDate(date.clone()))?;

        Ok(Self {
            title,
            description,
            date,
            published,
            discussion_id: fm.get("discussionId").map(str::to_string),
        })
    }
}

fn required(fm: &FrontMatter, key: &'static str) -> Result<String, ValidationError> {
    match fm.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingField(key)),
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Slug (file name without the `.md` extension)
    pub slug: String,

    pub metadata: PostMetadata,

    /// Raw markdown body
    #[serde(skip_serializing)]
    pub content: String,
}

impl Post {
    pub fn new(slug: impl Into<String>, metadata: PostMetadata, content: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            metadata,
            content: content.into(),
        }
    }

    /// Parse a raw document fetched for `slug`
    pub fn from_document(slug: &str, document: &str) -> Result<Self, PostError> {
        let (fm, body) = FrontMatter::parse(document)?;
        let metadata = PostMetadata::from_frontmatter(&fm)?;
        Ok(Self::new(slug, metadata, body))
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Get the newer neighbour in a date-descending list
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the older neighbour in a date-descending list
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        posts.get(pos + 1)
    }
}

/// Why a single post was left out of a listing
#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    FrontMatter(#[from] super::FrontMatterError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fetch(#[from] super::FetchError),
}

/// Derive a slug from a content file name
pub fn slug_from_filename(name: &str) -> Option<&str> {
    let stem = name.strip_suffix(".md")?;
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Parse a date string in various formats
///
/// Values without an offset are taken as UTC.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
