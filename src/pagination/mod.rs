//! Pagination and title search over a post list

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::content::Post;

/// One page of a (possibly filtered) post list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<'a> {
    pub items: Vec<&'a Post>,
    /// 1-based page actually shown
    pub page: usize,
    pub per_page: usize,
    /// Zero when there is nothing to show
    pub total_pages: usize,
    /// Number of posts after filtering
    pub total_items: usize,
    /// Normalized search term, if one was applied
    pub search: Option<String>,
}

impl Paged<'_> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Normalize a search term; blank terms mean "no search"
pub fn normalize_search(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// Posts whose title contains `term`, ignoring case
pub fn filter_by_title<'a>(posts: &'a [Post], term: Option<&str>) -> Vec<&'a Post> {
    match normalize_search(term) {
        Some(term) => {
            let needle = term.to_lowercase();
            posts
                .iter()
                .filter(|post| post.title().to_lowercase().contains(&needle))
                .collect()
        }
        None => posts.iter().collect(),
    }
}

/// Number of pages needed for `count` items
pub fn total_pages(count: usize, per_page: NonZeroUsize) -> usize {
    count.div_ceil(per_page.get())
}

/// Raw slice for a 1-based page number; empty when the page is out of range
pub fn page_slice<T>(items: &[T], per_page: NonZeroUsize, page: usize) -> &[T] {
    let Some(index) = page.checked_sub(1) else {
        return &[];
    };
    let start = index.saturating_mul(per_page.get());
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page.get()).min(items.len());
    &items[start..end]
}

/// Clamp a requested page into `[1, max(total_pages, 1)]`
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Filter by title, then cut out the requested page.
///
/// Out-of-range requests are clamped to the nearest valid page.
pub fn paginate<'a>(
    posts: &'a [Post],
    per_page: NonZeroUsize,
    requested_page: usize,
    search: Option<&str>,
) -> Paged<'a> {
    let search = normalize_search(search);
    let filtered = filter_by_title(posts, search);
    let total_pages = total_pages(filtered.len(), per_page);
    let page = clamp_page(requested_page, total_pages);
    let items = page_slice(&filtered, per_page, page).to_vec();

    Paged {
        items,
        page,
        per_page: per_page.get(),
        total_pages,
        total_items: filtered.len(),
        search: search.map(str::to_string),
    }
}
