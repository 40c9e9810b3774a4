//! Content module - fetching, parsing and rendering posts

pub mod fetcher;
mod frontmatter;
mod markdown;
mod post;
pub mod repository;
mod source;

pub use fetcher::{fetch_posts, FetchReport};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::{reading_minutes, MarkdownRenderer, RenderError, DEFAULT_THEME};
pub use post::{parse_date_string, Post, PostError, PostMetadata, ValidationError};
pub use repository::{PostRepository, RenderedPost};
pub use source::{ContentSource, DirEntry, FetchError, HttpContentSource};
