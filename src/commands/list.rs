//! List posts from the content host

use anyhow::Result;

use crate::content::Post;
use crate::helpers::local_date;
use crate::pagination::filter_by_title;
use crate::Folio;

/// List posts, newest first, optionally filtered by title
pub async fn run(folio: &Folio, search: Option<&str>) -> Result<()> {
    let posts = folio.repository.list_posts().await;
    let matched = filter_by_title(&posts, search);

    println!("Posts ({}):", matched.len());
    for line in format_lines(folio, &matched) {
        println!("{}", line);
    }
    Ok(())
}

fn format_lines(folio: &Folio, posts: &[&Post]) -> Vec<String> {
    posts
        .iter()
        .map(|post| {
            format!(
                "  {} - {} [{}]",
                local_date(&post.metadata.published, folio.site.tz, "YYYY-MM-DD"),
                post.metadata.title,
                post.slug
            )
        })
        .collect()
}
