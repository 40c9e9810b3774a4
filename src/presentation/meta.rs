//! Page metadata and social preview payloads

use serde::{Deserialize, Serialize};

use super::Site;
use crate::content::Post;
use crate::helpers::{
    full_url_for, html_escape, meta_generator, og_image_url, open_graph, post_path, strip_html,
};

/// Analytics collector settings exposed to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsMeta {
    pub key: String,
    pub host: Option<String>,
}

/// Everything that goes into a page's `<head>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub image_url: String,
    pub analytics: Option<AnalyticsMeta>,
}

impl PageMeta {
    /// Metadata for a generic page at `path`
    pub fn page(site: &Site, title: &str, description: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            canonical_url: full_url_for(&site.url, path),
            image_url: og_image_url(&site.url, title, None),
            analytics: site.analytics(),
        }
    }

    /// Metadata for a post detail page; the preview carries the post date
    pub fn post(site: &Site, post: &Post) -> Self {
        let date = site.format_date(&post.metadata.published);
        Self {
            title: post.metadata.title.clone(),
            // Descriptions may carry inline markup
            description: strip_html(&post.metadata.description),
            canonical_url: full_url_for(&site.url, &post_path(&post.slug)),
            image_url: og_image_url(&site.url, &post.metadata.title, Some(&date)),
            analytics: site.analytics(),
        }
    }

    /// Render the `<head>` contents
    pub fn to_html(&self, site: &Site) -> String {
        let title = if self.title == site.title {
            self.title.clone()
        } else {
            format!("{} | {}", self.title, site.title)
        };

        let mut head = vec![
            r#"<meta charset="utf-8">"#.to_string(),
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#.to_string(),
            meta_generator(),
            format!("<title>{}</title>", html_escape(&title)),
            format!(
                r#"<link rel="canonical" href="{}">"#,
                html_escape(&self.canonical_url)
            ),
        ];
        if !self.description.is_empty() {
            head.push(format!(
                r#"<meta name="description" content="{}">"#,
                html_escape(&self.description)
            ));
        }
        head.push(open_graph(
            &self.title,
            &self.description,
            &self.canonical_url,
            Some(&self.image_url),
            &site.title,
        ));

        if let Some(analytics) = &self.analytics {
            head.push(format!(
                r#"<meta name="analytics-key" content="{}">"#,
                html_escape(&analytics.key)
            ));
            if let Some(host) = &analytics.host {
                head.push(format!(
                    r#"<meta name="analytics-host" content="{}">"#,
                    html_escape(host)
                ));
            }
        }

        head.join("\n")
    }
}

/// Input for the external social image renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPreview {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
}

impl SocialPreview {
    /// Build a payload from query values; blank values fall back to the site title
    pub fn new(site: &Site, title: Option<&str>, top: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&site.title);
        Self {
            title: title.to_string(),
            top: top
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn image_url(&self, site: &Site) -> String {
        og_image_url(&site.url, &self.title, self.top.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::tests::{sample_post, test_site};

    #[test]
    fn test_post_meta() {
        let site = test_site();
        let meta = PageMeta::post(&site, &sample_post("hello", "Hello World", "2024-01-15"));
        assert_eq!(meta.canonical_url, "https://example.com/blog/hello");
        assert_eq!(
            meta.image_url,
            "https://example.com/og?title=Hello%20World&top=January%2015%2C%202024"
        );
        assert_eq!(meta.analytics, None);
    }

    #[test]
    fn test_head_html() {
        let mut site = test_site();
        site.analytics_key = Some("phc_1".to_string());
        site.analytics_host = Some("https://collector.example".to_string());

        let meta = PageMeta::page(&site, "Blog", "All <posts>", "/blog");
        let head = meta.to_html(&site);
        assert!(head.contains("<title>Blog | Test Site</title>"));
        assert!(head.contains(r#"<link rel="canonical" href="https://example.com/blog">"#));
        assert!(head.contains("All &lt;posts&gt;"));
        assert!(head.contains(r#"<meta name="analytics-key" content="phc_1">"#));
        assert!(head.contains("analytics-host"));
    }

    #[test]
    fn test_social_preview() {
        let site = test_site();
        let preview = SocialPreview::new(&site, Some("  Hi "), Some(""));
        assert_eq!(preview.title, "Hi");
        assert_eq!(preview.top, None);
        assert_eq!(preview.image_url(&site), "https://example.com/og?title=Hi");

        let preview = SocialPreview::new(&site, None, Some("2024-01-15"));
        assert_eq!(preview.title, "Test Site");
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["top"], "2024-01-15");
    }
}
