//! Presentation layer
//!
//! Turns repository output into HTML pages and page metadata.

mod meta;
mod views;

pub use meta::{AnalyticsMeta, PageMeta, SocialPreview};
pub use views::{render_error, render_list, render_not_found, render_post, EMPTY_STATE};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use url::Url;

use crate::config::{ConfigError, SiteConfig};
use crate::helpers::full_date;

/// Site-wide values every view needs
#[derive(Debug, Clone)]
pub struct Site {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: Url,
    pub tz: Tz,
    pub analytics_key: Option<String>,
    pub analytics_host: Option<String>,
}

impl Site {
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.site_url()?,
            tz: config.tz()?,
            analytics_key: config.analytics.key.clone(),
            analytics_host: config.analytics.host.clone(),
        })
    }

    /// Display form of a post date in the site time zone
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        full_date(&date.with_timezone(&self.tz))
    }

    /// Analytics settings, present only when a key is configured
    pub fn analytics(&self) -> Option<AnalyticsMeta> {
        self.analytics_key.as_ref().map(|key| AnalyticsMeta {
            key: key.clone(),
            host: self.analytics_host.clone(),
        })
    }
}
