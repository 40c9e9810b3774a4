//! Remote content host access

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("entry {0} has no download URL")]
    NoDownloadUrl(String),
}

/// One item of the remote directory listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    /// Files ending in `.md` are posts; everything else is ignored
    pub fn is_post(&self) -> bool {
        self.kind == "file" && self.name.ends_with(".md")
    }
}

/// Where raw post documents come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the directory listing
    async fn list_entries(&self) -> Result<Vec<DirEntry>, FetchError>;

    /// Fetch a single document as text
    async fn fetch_raw(&self, entry: &DirEntry) -> Result<String, FetchError>;
}

/// Content source backed by an HTTP directory-listing API
pub struct HttpContentSource {
    client: Client,
    listing_url: Url,
    token: Option<String>,
}

impl HttpContentSource {
    pub fn new(listing_url: Url, token: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: listing_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            listing_url,
            token,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn list_entries(&self) -> Result<Vec<DirEntry>, FetchError> {
        let url = self.listing_url.as_str();
        tracing::debug!("Fetching content listing from {}", url);
        self.get(url)
            .await?
            .json::<Vec<DirEntry>>()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })
    }

    async fn fetch_raw(&self, entry: &DirEntry) -> Result<String, FetchError> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| FetchError::NoDownloadUrl(entry.name.clone()))?;
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })
    }
}
