//! Post repository - cached view over the content source

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::fetcher::{fetch_posts, FetchReport};
use super::markdown::reading_minutes;
use super::{ContentSource, MarkdownRenderer, Post, RenderError};
use crate::cache::{Clock, RevalidationCache};

/// A post together with its rendered body
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPost {
    #[serde(flatten)]
    pub post: Post,
    pub html: String,
    pub reading_minutes: usize,
}

/// Read-only access to the post collection.
///
/// Every operation reads the same snapshot for the length of one
/// revalidation window.
pub struct PostRepository {
    source: Arc<dyn ContentSource>,
    renderer: Arc<MarkdownRenderer>,
    cache: RevalidationCache<Vec<Post>>,
    concurrency: usize,
}

impl PostRepository {
    pub fn new(
        source: Arc<dyn ContentSource>,
        renderer: Arc<MarkdownRenderer>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            renderer,
            cache: RevalidationCache::new(ttl, clock),
            concurrency,
        }
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Arc<Vec<Post>> {
        self.cache
            .get_or_refresh(|| async move {
                let report = fetch_posts(self.source.as_ref(), self.concurrency).await;
                tracing::info!(
                    "Fetched {} posts ({} skipped)",
                    report.posts.len(),
                    report.skipped.len()
                );
                report.posts
            })
            .await
    }

    /// Slugs of every post, used to enumerate detail routes
    pub async fn list_slugs(&self) -> Vec<String> {
        self.list_posts()
            .await
            .iter()
            .map(|post| post.slug.clone())
            .collect()
    }

    /// Look a post up by slug; `None` means not found
    pub async fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        self.list_posts()
            .await
            .iter()
            .find(|post| post.slug == slug)
            .cloned()
    }

    /// Look a post up and render its body
    pub async fn render_post(&self, slug: &str) -> Result<Option<RenderedPost>, RenderError> {
        let posts = self.list_posts().await;
        self.render_from(&posts, slug)
    }

    /// Render a post out of a snapshot the caller already holds
    pub fn render_from(&self, posts: &[Post], slug: &str) -> Result<Option<RenderedPost>, RenderError> {
        let Some(post) = posts.iter().find(|post| post.slug == slug) else {
            return Ok(None);
        };

        let html = self.render(post)?;
        Ok(Some(RenderedPost {
            post: post.clone(),
            html,
            reading_minutes: reading_minutes(&post.content),
        }))
    }

    /// Run a full fetch outside the cache, keeping per-post failures
    pub async fn fetch_report(&self) -> FetchReport {
        fetch_posts(self.source.as_ref(), self.concurrency).await
    }

    /// Render a post body with the configured renderer
    pub fn render(&self, post: &Post) -> Result<String, RenderError> {
        self.renderer.render(&post.content)
    }

    /// Drop the snapshot so the next call refetches
    pub async fn revalidate(&self) {
        self.cache.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::content::fetcher::tests::{post_document, MemorySource};
    use std::sync::atomic::Ordering;

    fn repository(source: Arc<MemorySource>, clock: Arc<ManualClock>) -> PostRepository {
        PostRepository::new(
            source,
            Arc::new(MarkdownRenderer::new()),
            Duration::from_secs(60),
            clock,
            4,
        )
    }

    #[tokio::test]
    async fn test_list_slugs_in_date_order() {
        let source = Arc::new(MemorySource::with_posts(&[
            ("first", "First", "2024-01-01"),
            ("second", "Second", "2024-02-01"),
        ]));
        let repo = repository(source, Arc::new(ManualClock::new()));
        assert_eq!(repo.list_slugs().await, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_none() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        let repo = repository(source, Arc::new(ManualClock::new()));
        assert!(repo.get_post_by_slug("nonexistent-slug").await.is_none());
        assert!(repo.render_post("nonexistent-slug").await.unwrap().is_none());
        assert!(repo.get_post_by_slug("a").await.is_some());
    }

    #[tokio::test]
    async fn test_reads_share_one_snapshot_per_window() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        let clock = Arc::new(ManualClock::new());
        let repo = repository(source.clone(), clock.clone());

        assert_eq!(repo.list_slugs().await, vec!["a"]);
        // Remote changes mid-window are not observed
        source.put("b", &post_document("B", "2024-05-05", "new"));
        assert!(repo.get_post_by_slug("b").await.is_none());
        assert_eq!(source.listings.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(60));
        assert!(repo.get_post_by_slug("b").await.is_some());
        assert_eq!(repo.list_slugs().await, vec!["b", "a"]);
        assert_eq!(source.listings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_revalidate_refetches() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        let repo = repository(source.clone(), Arc::new(ManualClock::new()));
        repo.list_posts().await;
        source.put("b", &post_document("B", "2024-05-05", "new"));
        repo.revalidate().await;
        assert_eq!(repo.list_slugs().await, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_render_post() {
        let source = Arc::new(MemorySource::default());
        source.put("hello", &post_document("Hello", "2024-03-01", "# Hi there"));
        let repo = repository(source, Arc::new(ManualClock::new()));

        let rendered = repo.render_post("hello").await.unwrap().unwrap();
        assert_eq!(rendered.post.metadata.title, "Hello");
        assert!(rendered.html.contains("<h1>Hi there</h1>"));
        assert_eq!(rendered.reading_minutes, 1);
    }

    #[tokio::test]
    async fn test_render_from_held_snapshot() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        let clock = Arc::new(ManualClock::new());
        let repo = repository(source.clone(), clock.clone());
        let held = repo.list_posts().await;

        source.put("a", &post_document("A edited", "2024-01-01", "changed"));
        clock.advance(Duration::from_secs(60));
        assert_eq!(repo.get_post_by_slug("a").await.unwrap().metadata.title, "A edited");

        let rendered = repo.render_from(&held, "a").unwrap().unwrap();
        assert_eq!(rendered.post.metadata.title, "A");
        assert!(repo.render_from(&held, "missing").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_render_error_propagates() {
        let source = Arc::new(MemorySource::default());
        source.put("bad-math", &post_document("Bad", "2024-03-01", "$$\\notacommand{x}$$"));
        let repo = repository(source, Arc::new(ManualClock::new()));

        assert!(repo.get_post_by_slug("bad-math").await.is_some());
        assert!(repo.render_post("bad-math").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_report_bypasses_cache() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        source.put_named("broken.md", "no frontmatter here");
        let repo = repository(source.clone(), Arc::new(ManualClock::new()));

        repo.list_posts().await;
        let report = repo.fetch_report().await;
        assert_eq!(report.posts.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "broken.md");
        assert_eq!(source.listings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_listing_is_empty_for_the_window() {
        let source = Arc::new(MemorySource::with_posts(&[("a", "A", "2024-01-01")]));
        source.set_listing_down(true);
        let clock = Arc::new(ManualClock::new());
        let repo = repository(source.clone(), clock.clone());

        assert!(repo.list_posts().await.is_empty());
        source.set_listing_down(false);
        assert!(repo.list_posts().await.is_empty());

        clock.advance(Duration::from_secs(60));
        assert_eq!(repo.list_slugs().await, vec!["a"]);
    }
}
