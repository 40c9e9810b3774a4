//! HTTP server for the blog pages and JSON endpoints

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::helpers::post_path;
use crate::pagination::paginate;
use crate::presentation::{self, SocialPreview};
use crate::Folio;

/// Query string of the list routes
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<String>,
    q: Option<String>,
}

impl ListQuery {
    /// 1-based page; anything unparsable means the first page
    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Default, Deserialize)]
struct PreviewQuery {
    title: Option<String>,
    top: Option<String>,
}

/// Build the router; static files are served from `static_dir` when given
pub fn router(folio: Arc<Folio>, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/", get(|| async { Redirect::temporary("/blog") }))
        .route("/blog", get(blog_list))
        .route("/blog/:slug", get(blog_post))
        .route("/og", get(social_preview))
        .route("/api/posts", get(api_posts))
        .route("/api/contributions", get(api_contributions))
        .route("/healthz", get(|| async { "ok" }))
        .fallback(not_found);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(folio)
}

/// Start the server
pub async fn start(folio: Arc<Folio>, ip: &str, port: u16, static_dir: Option<PathBuf>) -> Result<()> {
    let app = router(folio, static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn blog_list(State(folio): State<Arc<Folio>>, Query(query): Query<ListQuery>) -> Html<String> {
    let posts = folio.repository.list_posts().await;
    let paged = paginate(&posts, folio.per_page, query.page(), query.q.as_deref());
    Html(presentation::render_list(&folio.site, &paged))
}

async fn blog_post(State(folio): State<Arc<Folio>>, Path(slug): Path<String>) -> Response {
    // Page body and neighbour links come from one snapshot
    let posts = folio.repository.list_posts().await;
    match folio.repository.render_from(&posts, &slug) {
        Ok(Some(rendered)) => {
            Html(presentation::render_post(&folio.site, &rendered, &posts)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Html(presentation::render_not_found(&folio.site, &slug)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render post {}: {}", slug, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(presentation::render_error(&folio.site, &post_path(&slug))),
            )
                .into_response()
        }
    }
}

async fn social_preview(
    State(folio): State<Arc<Folio>>,
    Query(query): Query<PreviewQuery>,
) -> Json<SocialPreview> {
    Json(SocialPreview::new(
        &folio.site,
        query.title.as_deref(),
        query.top.as_deref(),
    ))
}

async fn api_posts(State(folio): State<Arc<Folio>>, Query(query): Query<ListQuery>) -> Response {
    let posts = folio.repository.list_posts().await;
    let paged = paginate(&posts, folio.per_page, query.page(), query.q.as_deref());
    Json(&paged).into_response()
}

async fn api_contributions(State(folio): State<Arc<Folio>>) -> Response {
    let calendar = folio.contributions().await;
    Json(calendar.as_ref()).into_response()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fetcher::tests::{post_document, MemorySource};
    use crate::presentation::EMPTY_STATE;
    use crate::tests::test_folio;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn app_with(posts: &[(&str, &str, &str)]) -> (Router, Arc<MemorySource>) {
        let source = Arc::new(MemorySource::with_posts(posts));
        let folio = Arc::new(test_folio(source.clone()));
        (router(folio, None), source)
    }

    #[tokio::test]
    async fn test_blog_list_pages() {
        let posts: Vec<(String, String)> = (1..=12)
            .map(|i| (format!("post-{i:02}"), format!("2024-01-{i:02}")))
            .collect();
        let refs: Vec<(&str, &str, &str)> = posts
            .iter()
            .map(|(slug, date)| (slug.as_str(), slug.as_str(), date.as_str()))
            .collect();
        let (app, _) = app_with(&refs);

        let (status, body) = get_page(app.clone(), "/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/blog/post-12"));
        assert!(body.contains("/blog/post-03"));
        assert!(!body.contains("/blog/post-02\""));
        assert!(body.contains("Page 1 of 2"));

        // Out-of-range and garbage pages clamp or fall back
        let (_, body) = get_page(app.clone(), "/blog?page=99").await;
        assert!(body.contains("Page 2 of 2"));
        assert!(body.contains("/blog/post-01"));
        let (status, body) = get_page(app, "/blog?page=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Page 1 of 2"));
    }

    #[tokio::test]
    async fn test_blog_search() {
        let (app, _) = app_with(&[
            ("rust", "Learning Rust", "2024-01-01"),
            ("go", "Go tips", "2024-01-02"),
        ]);
        let (_, body) = get_page(app.clone(), "/blog?q=RUST").await;
        assert!(body.contains("/blog/rust"));
        assert!(!body.contains("/blog/go\""));

        let (_, body) = get_page(app, "/blog?q=python").await;
        assert!(body.contains(EMPTY_STATE));
    }

    #[tokio::test]
    async fn test_post_detail_and_not_found() {
        let (app, source) = app_with(&[("hello", "Hello", "2024-01-01")]);
        source.put("bad-math", &post_document("Bad", "2024-01-02", "$$\\notacommand{x}$$"));

        let (status, body) = get_page(app.clone(), "/blog/hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Hello</h1>"));

        let (status, body) = get_page(app.clone(), "/blog/nonexistent-slug").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post not found"));

        let (status, body) = get_page(app, "/blog/bad-math").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Something went wrong"));
    }

    #[tokio::test]
    async fn test_post_detail_links_neighbours() {
        let (app, _) = app_with(&[
            ("a", "Alpha", "2024-01-01"),
            ("b", "Beta", "2024-02-01"),
            ("c", "Gamma", "2024-03-01"),
        ]);
        let (status, body) = get_page(app, "/blog/b").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<a class="prev" href="/blog/c">Gamma</a>"#));
        assert!(body.contains(r#"<a class="next" href="/blog/a">Alpha</a>"#));
    }

    #[tokio::test]
    async fn test_json_endpoints() {
        let (app, _) = app_with(&[("a", "Alpha", "2024-01-01"), ("b", "Beta", "2024-02-01")]);

        let (status, body) = get_page(app.clone(), "/api/posts?q=alp").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["items"][0]["slug"], "a");
        assert_eq!(json["items"][0]["metadata"]["title"], "Alpha");

        let (_, body) = get_page(app.clone(), "/og?title=Hello%20World&top=2024-01-01").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["title"], "Hello World");
        assert_eq!(json["top"], "2024-01-01");

        let (status, body) = get_page(app.clone(), "/api/contributions").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["weeks"].as_array().unwrap().len() >= 52);

        let (status, body) = get_page(app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_root_redirects_and_unknown_routes() {
        let (app, _) = app_with(&[]);
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let (status, _) = get_page(app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
