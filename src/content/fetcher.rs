//! Content fetcher - turns the remote listing into a sorted post collection

use std::collections::HashMap;

use futures::stream::{self, StreamExt};

use super::post::slug_from_filename;
use super::{ContentSource, DirEntry, Post, PostError};

/// Outcome of one fetch pass
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Valid posts, newest first
    pub posts: Vec<Post>,
    /// Posts left out, keyed by file name
    pub skipped: Vec<(String, PostError)>,
    /// Set when the listing itself could not be fetched
    pub listing_error: Option<String>,
}

/// Fetch every post from `source`, isolating failures per post.
///
/// At most `concurrency` document fetches run at once. A failed listing
/// yields an empty report rather than an error.
pub async fn fetch_posts(source: &dyn ContentSource, concurrency: usize) -> FetchReport {
    let entries = match source.list_entries().await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to fetch content listing: {}", e);
            return FetchReport {
                listing_error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    let candidates: Vec<DirEntry> = entries.into_iter().filter(DirEntry::is_post).collect();
    tracing::debug!("Listing has {} markdown files", candidates.len());

    // `buffered` keeps results in listing order, which the stable sort relies on
    let results: Vec<(String, Result<Post, PostError>)> = stream::iter(candidates)
        .map(|entry| async move {
            let result = load_post(source, &entry).await;
            (entry.name, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = FetchReport::default();
    for (name, result) in results {
        match result {
            Ok(post) => report.posts.push(post),
            Err(e) => {
                tracing::warn!("Skipping post {}: {}", name, e);
                report.skipped.push((name, e));
            }
        }
    }

    report.posts = dedupe_slugs(report.posts);
    sort_by_date_desc(&mut report.posts);
    report
}

async fn load_post(source: &dyn ContentSource, entry: &DirEntry) -> Result<Post, PostError> {
    let raw = source.fetch_raw(entry).await?;
    // `is_post` already guaranteed the suffix
    let slug = slug_from_filename(&entry.name).unwrap_or(&entry.name);
    Post::from_document(slug, &raw)
}

/// Keep the last post for each slug, at the position of its first occurrence
fn dedupe_slugs(posts: Vec<Post>) -> Vec<Post> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Post> = Vec::with_capacity(posts.len());

    for post in posts {
        match index.get(&post.slug) {
            Some(&i) => {
                tracing::warn!("Duplicate slug {}, keeping the later entry", post.slug);
                unique[i] = post;
            }
            None => {
                index.insert(post.slug.clone(), unique.len());
                unique.push(post);
            }
        }
    }

    unique
}

/// Sort by date descending (newest first); equal dates keep their order
pub fn sort_by_date_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.metadata.published.cmp(&a.metadata.published));
}
