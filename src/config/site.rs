//! Site configuration (folio.yml plus environment overrides)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variables that override the file, as (variable, field) pairs
pub const ENV_VARS: &[(&str, &str)] = &[
    ("FOLIO_SITE_URL", "url"),
    ("FOLIO_CONTENT_URL", "content.listing_url"),
    ("FOLIO_CONTENT_TOKEN", "content.token"),
    ("FOLIO_ANALYTICS_KEY", "analytics.key"),
    ("FOLIO_ANALYTICS_HOST", "analytics.host"),
    ("FOLIO_CALENDAR_URL", "calendar.url"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("required setting `{0}` is not set")]
    Missing(&'static str),
    #[error("setting `{field}` is not a valid URL ({value:?}): {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("setting `{field}` {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Blog listing
    pub per_page: usize,

    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),

            url: String::new(),

            per_page: 10,

            content: ContentConfig::default(),
            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),
            analytics: AnalyticsConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup; blank values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (var, _) in ENV_VARS {
            let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            tracing::debug!("Setting overridden from {}", var);
            match *var {
                "FOLIO_SITE_URL" => self.url = value,
                "FOLIO_CONTENT_URL" => self.content.listing_url = value,
                "FOLIO_CONTENT_TOKEN" => self.content.token = Some(value),
                "FOLIO_ANALYTICS_KEY" => self.analytics.key = Some(value),
                "FOLIO_ANALYTICS_HOST" => self.analytics.host = Some(value),
                "FOLIO_CALENDAR_URL" => self.calendar.url = Some(value),
                _ => {}
            }
        }
    }

    /// Check required settings and their shapes
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site_url()?;
        self.listing_url()?;
        if let Some(host) = &self.analytics.host {
            parse_http_url("analytics.host", host)?;
        }
        self.calendar_url()?;
        self.tz()?;

        if self.per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "per_page",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.content.max_concurrent_fetches == 0 {
            return Err(ConfigError::InvalidValue {
                field: "content.max_concurrent_fetches",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn site_url(&self) -> Result<Url, ConfigError> {
        required_url("url", &self.url)
    }

    pub fn listing_url(&self) -> Result<Url, ConfigError> {
        required_url("content.listing_url", &self.content.listing_url)
    }

    pub fn calendar_url(&self) -> Result<Option<Url>, ConfigError> {
        self.calendar
            .url
            .as_deref()
            .map(|u| parse_http_url("calendar.url", u))
            .transpose()
    }

    /// Time zone used to display post dates
    pub fn tz(&self) -> Result<chrono_tz::Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "timezone",
                reason: format!("names an unknown time zone {:?}", self.timezone),
            })
    }

    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.content.revalidate_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.content.timeout_secs)
    }
}

fn required_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(field));
    }
    parse_http_url(field, value)
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

/// Remote content host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory-listing endpoint returning `[{ name, type, download_url }]`
    pub listing_url: String,
    /// Bearer token for the content host
    pub token: Option<String>,
    pub revalidate_secs: u64,
    pub max_concurrent_fetches: usize,
    pub timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            listing_url: String::new(),
            token: None,
            revalidate_secs: 60,
            max_concurrent_fetches: 8,
            timeout_secs: 10,
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: crate::content::DEFAULT_THEME.to_string(),
            line_number: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Clean rendered HTML instead of passing raw HTML through
    pub sanitize: bool,
}

/// Analytics collector, exposed to pages only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub key: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// JSON endpoint with `{ "contributions": [{ "date", "count" }] }`
    pub url: Option<String>,
}
