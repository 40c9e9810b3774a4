//! folio: blog content pipeline for a personal portfolio site
//!
//! Posts are markdown files with a frontmatter block, fetched from a remote
//! content host, cached for a short revalidation window, rendered to HTML and
//! served as paginated, searchable pages.

pub mod cache;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pagination;
pub mod presentation;
pub mod server;

use anyhow::{Context, Result};
use chrono::Utc;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use cache::{Clock, RevalidationCache, SystemClock};
use calendar::{load_calendar, CalendarSource, ContributionCalendar};
use config::{ConfigError, SiteConfig};
use content::{ContentSource, HttpContentSource, MarkdownRenderer, PostRepository};
use presentation::Site;

/// Default configuration file name
pub const CONFIG_FILE: &str = "folio.yml";

/// The main application
pub struct Folio {
    /// Site configuration
    pub config: SiteConfig,
    /// View-ready site values
    pub site: Site,
    /// Cached post collection
    pub repository: PostRepository,
    /// Posts per list page
    pub per_page: NonZeroUsize,
    calendar: Option<CalendarSource>,
    contributions: RevalidationCache<ContributionCalendar>,
}

impl Folio {
    /// Load configuration (file if present, then environment) and build the app
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let mut config = if config_path.exists() {
            SiteConfig::load(config_path)?
        } else {
            tracing::debug!("No {:?}, using defaults", config_path);
            SiteConfig::default()
        };
        config.apply_env();
        Self::from_config(config)
    }

    /// Build the app against the configured content host
    pub fn from_config(config: SiteConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpContentSource::new(
            config.listing_url()?,
            config.content.token.clone(),
            config.fetch_timeout(),
        )
        .context("Failed to create content client")?;
        Self::with_source(config, Arc::new(source), Arc::new(SystemClock))
    }

    /// Build the app over any content source and clock
    pub fn with_source(
        config: SiteConfig,
        source: Arc<dyn ContentSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let renderer = MarkdownRenderer::with_options(
            &config.highlight.theme,
            config.highlight.line_number,
            config.markdown.sanitize,
        );
        if !renderer.has_theme() {
            return Err(ConfigError::InvalidValue {
                field: "highlight.theme",
                reason: format!("names an unknown theme {:?}", config.highlight.theme),
            }
            .into());
        }

        let calendar = match config.calendar_url()? {
            Some(url) => Some(
                CalendarSource::new(url, config.fetch_timeout())
                    .context("Failed to create calendar client")?,
            ),
            None => None,
        };

        let per_page = NonZeroUsize::new(config.per_page).ok_or(ConfigError::InvalidValue {
            field: "per_page",
            reason: "must be greater than zero".to_string(),
        })?;

        let repository = PostRepository::new(
            source,
            Arc::new(renderer),
            config.revalidate_after(),
            Arc::clone(&clock),
            config.content.max_concurrent_fetches,
        );

        Ok(Self {
            site: Site::from_config(&config)?,
            contributions: RevalidationCache::new(config.revalidate_after(), clock),
            config,
            repository,
            per_page,
            calendar,
        })
    }

    /// Contribution calendar, refreshed once per revalidation window
    pub async fn contributions(&self) -> Arc<ContributionCalendar> {
        self.contributions
            .get_or_refresh(|| async move {
                load_calendar(self.calendar.as_ref(), Utc::now().date_naive()).await
            })
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::content::fetcher::tests::MemorySource;

    pub(crate) fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.title = "Test Site".to_string();
        config.url = "https://example.com".to_string();
        config.content.listing_url = "https://content.example/posts".to_string();
        config
    }

    pub(crate) fn test_folio(source: Arc<MemorySource>) -> Folio {
        Folio::with_source(test_config(), source, Arc::new(ManualClock::new())).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let source = Arc::new(MemorySource::default());
        let result = Folio::with_source(
            SiteConfig::default(),
            source.clone(),
            Arc::new(ManualClock::new()),
        );
        assert!(result.is_err());

        let mut config = test_config();
        config.highlight.theme = "no-such-theme".to_string();
        let err = Folio::with_source(config, source, Arc::new(ManualClock::new()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("highlight.theme"));
    }

    #[test]
    fn test_new_loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "url: https://me.dev\ncontent:\n  listing_url: https://c.example/list\nper_page: 3\n",
        )
        .unwrap();

        let folio = Folio::new(&path).unwrap();
        assert_eq!(folio.per_page.get(), 3);
        assert_eq!(folio.site.url.as_str(), "https://me.dev/");
    }

    #[tokio::test]
    async fn test_contributions_fall_back_without_source() {
        let folio = test_folio(Arc::new(MemorySource::default()));
        let calendar = folio.contributions().await;
        assert!(calendar.weeks.len() >= calendar::FALLBACK_WEEKS);
        assert!(Arc::ptr_eq(&calendar, &folio.contributions().await));
    }
}
