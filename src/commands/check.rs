//! Validate every post on the content host

use anyhow::{bail, Result};

use crate::content::FetchReport;
use crate::Folio;

/// Posts that were fetched but could not be rendered
pub struct CheckSummary {
    pub valid: usize,
    pub problems: Vec<(String, String)>,
}

/// Fetch, validate and render every post, reporting the ones that fail
pub async fn run(folio: &Folio) -> Result<()> {
    let report = folio.repository.fetch_report().await;
    if let Some(e) = &report.listing_error {
        bail!("Could not list content: {}", e);
    }

    let summary = summarize(folio, report);
    println!("{} posts OK", summary.valid);
    for (name, problem) in &summary.problems {
        println!("  ✗ {}: {}", name, problem);
    }

    if !summary.problems.is_empty() {
        bail!("{} posts have problems", summary.problems.len());
    }
    Ok(())
}

fn summarize(folio: &Folio, report: FetchReport) -> CheckSummary {
    let mut problems: Vec<(String, String)> = report
        .skipped
        .into_iter()
        .map(|(name, e)| (name, e.to_string()))
        .collect();

    let mut valid = 0;
    for post in &report.posts {
        match folio.repository.render(post) {
            Ok(_) => valid += 1,
            Err(e) => {
                tracing::debug!("Render failed for {}: {}", post.slug, e);
                problems.push((format!("{}.md", post.slug), e.to_string()));
            }
        }
    }

    CheckSummary { valid, problems }
}
