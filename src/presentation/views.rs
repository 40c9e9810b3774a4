//! HTML views for the blog pages

use super::{PageMeta, Site};
use crate::content::{reading_minutes, Post, RenderedPost};
use crate::helpers::{blog_page_path, html_escape, post_path, time_tag, truncate};
use crate::pagination::Paged;

/// Shown when a list page has nothing to display
pub const EMPTY_STATE: &str = "No articles found";

const CARD_DESCRIPTION_CHARS: usize = 200;

fn layout(site: &Site, meta: &PageMeta, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
{head}
</head>
<body>
<header class="site-header"><a href="/">{title}</a> <nav><a href="/blog">Blog</a></nav></header>
<main>
{body}
</main>
<footer class="site-footer">&copy; {author}</footer>
</body>
</html>
"#,
        lang = html_escape(&site.language),
        head = meta.to_html(site),
        title = html_escape(&site.title),
        body = body,
        author = html_escape(&site.author),
    )
}

fn search_form(search: Option<&str>) -> String {
    format!(
        r#"<form class="search" method="get" action="/blog"><input type="search" name="q" placeholder="Search articles" value="{}"></form>"#,
        html_escape(search.unwrap_or(""))
    )
}

fn post_card(site: &Site, post: &Post) -> String {
    format!(
        r#"<li class="post-card">
<a href="{href}"><h2>{title}</h2></a>
<div class="post-meta">{date} &middot; {minutes} min read</div>
<p>{description}</p>
</li>"#,
        href = post_path(&post.slug),
        title = html_escape(&post.metadata.title),
        date = time_tag(&post.metadata.published, site.tz),
        minutes = reading_minutes(&post.content),
        description = html_escape(&truncate(
            &post.metadata.description,
            CARD_DESCRIPTION_CHARS,
            None
        )),
    )
}

fn pager(paged: &Paged) -> String {
    if paged.total_pages <= 1 {
        return String::new();
    }
    let search = paged.search.as_deref();
    let mut links = Vec::new();
    if paged.has_prev() {
        links.push(format!(
            r#"<a class="prev" href="{}">Newer</a>"#,
            html_escape(&blog_page_path(paged.page - 1, search))
        ));
    }
    links.push(format!(
        r#"<span class="page-number">Page {} of {}</span>"#,
        paged.page, paged.total_pages
    ));
    if paged.has_next() {
        links.push(format!(
            r#"<a class="next" href="{}">Older</a>"#,
            html_escape(&blog_page_path(paged.page + 1, search))
        ));
    }
    format!(r#"<nav class="pager">{}</nav>"#, links.join(" "))
}

/// Blog list page
pub fn render_list(site: &Site, paged: &Paged) -> String {
    let path = blog_page_path(paged.page, paged.search.as_deref());
    let meta = PageMeta::page(site, "Blog", &site.description, &path);

    let mut body = String::from("<h1>Blog</h1>\n");
    body.push_str(&search_form(paged.search.as_deref()));
    body.push('\n');

    if paged.items.is_empty() {
        body.push_str(&format!(r#"<p class="empty-state">{}</p>"#, EMPTY_STATE));
    } else {
        body.push_str(r#"<ul class="post-list">"#);
        for post in &paged.items {
            body.push_str(&post_card(site, post));
        }
        body.push_str("</ul>\n");
        body.push_str(&pager(paged));
    }

    layout(site, &meta, &body)
}

/// Post detail page; neighbours come from the date-ordered listing
pub fn render_post(site: &Site, rendered: &RenderedPost, posts: &[Post]) -> String {
    let post = &rendered.post;
    let meta = PageMeta::post(site, post);

    let mut body = format!(
        r#"<article class="post">
<h1>{title}</h1>
<div class="post-meta">{date} &middot; {minutes} min read</div>
<div class="post-content">
{html}
</div>
</article>
"#,
        title = html_escape(&post.metadata.title),
        date = time_tag(&post.metadata.published, site.tz),
        minutes = rendered.reading_minutes,
        html = rendered.html,
    );

    let mut nav = Vec::new();
    if let Some(newer) = post.prev(posts) {
        nav.push(format!(
            r#"<a class="prev" href="{}">{}</a>"#,
            post_path(&newer.slug),
            html_escape(newer.title())
        ));
    }
    if let Some(older) = post.next(posts) {
        nav.push(format!(
            r#"<a class="next" href="{}">{}</a>"#,
            post_path(&older.slug),
            html_escape(older.title())
        ));
    }
    if !nav.is_empty() {
        body.push_str(&format!(r#"<nav class="post-nav">{}</nav>"#, nav.join(" ")));
        body.push('\n');
    }

    if let Some(id) = &post.metadata.discussion_id {
        body.push_str(&format!(
            r#"<section id="discussion" class="discussion" data-discussion-id="{}"></section>"#,
            html_escape(id)
        ));
        body.push('\n');
    }

    layout(site, &meta, &body)
}

/// Page for a slug that does not exist
pub fn render_not_found(site: &Site, slug: &str) -> String {
    let meta = PageMeta::page(site, "Not Found", "", &post_path(slug));
    let body = format!(
        r#"<h1>Post not found</h1>
<p>There is no article called <code>{}</code>.</p>
<p><a href="/blog">Back to the blog</a></p>"#,
        html_escape(slug)
    );
    layout(site, &meta, &body)
}

/// Page for a post that exists but failed to render
pub fn render_error(site: &Site, path: &str) -> String {
    let meta = PageMeta::page(site, "Something went wrong", "", path);
    let body = r#"<h1>Something went wrong</h1>
<p>This page could not be displayed. Please try again later.</p>
<p><a href="/blog">Back to the blog</a></p>"#;
    layout(site, &meta, body)
}
