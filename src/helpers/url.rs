//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters left alone in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&base, "/blog/hello") // -> "https://example.com/blog/hello"
/// ```
pub fn full_url_for(base: &Url, path: &str) -> String {
    let root = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Encode a query value
pub fn encode_url(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Path of a post detail page
pub fn post_path(slug: &str) -> String {
    format!("/blog/{}", encode_url(slug))
}

/// Path of a blog list page, keeping the active search term
pub fn blog_page_path(page: usize, search: Option<&str>) -> String {
    let mut path = format!("/blog?page={}", page);
    if let Some(term) = search {
        path.push_str("&q=");
        path.push_str(&encode_url(term));
    }
    path
}

/// Social preview image URL for a page
///
/// # Examples
/// ```ignore
/// og_image_url(&base, "Hello World", Some("2024-01-15"))
/// // -> "https://example.com/og?title=Hello%20World&top=2024-01-15"
/// ```
pub fn og_image_url(base: &Url, title: &str, top: Option<&str>) -> String {
    let mut url = full_url_for(base, &format!("/og?title={}", encode_url(title)));
    if let Some(top) = top {
        url.push_str("&top=");
        url.push_str(&encode_url(top));
    }
    url
}
