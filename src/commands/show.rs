//! Show a single post

use anyhow::{bail, Result};

use crate::helpers::local_date;
use crate::Folio;

/// Print a post's metadata followed by its body, raw or rendered
pub async fn run(folio: &Folio, slug: &str, html: bool) -> Result<()> {
    let Some(rendered) = folio.repository.render_post(slug).await? else {
        bail!("Post not found: {}", slug);
    };
    let meta = &rendered.post.metadata;

    println!("Title:       {}", meta.title);
    println!("Description: {}", meta.description);
    println!(
        "Date:        {}",
        local_date(&meta.published, folio.site.tz, "YYYY-MM-DD HH:mm")
    );
    if let Some(id) = &meta.discussion_id {
        println!("Discussion:  {}", id);
    }
    println!("Reading:     {} min", rendered.reading_minutes);
    println!();

    if html {
        println!("{}", rendered.html);
    } else {
        println!("{}", rendered.post.content);
    }
    Ok(())
}
