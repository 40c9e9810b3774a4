//! Scaffold a new post file

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::FrontMatter;

/// Write `<slug>.md` with a frontmatter block into `dir`
pub fn create_post(
    dir: &Path,
    title: &str,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        bail!("Title {:?} does not produce a usable slug", title);
    }

    fs::create_dir_all(dir)?;
    let file_path = dir.join(format!("{}.md", slug));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let mut fm = FrontMatter::default();
    fm.insert("title", title);
    fm.insert("description", description.unwrap_or(title));
    fm.insert("date", now.format("%Y-%m-%d").to_string());

    let content = format!("{}\nWrite your post here.\n", fm.to_block());
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use chrono::TimeZone;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let path = create_post(dir.path(), "Hello, World!", None, now).unwrap();
        assert_eq!(path.file_name().unwrap(), "hello-world.md");

        let document = fs::read_to_string(&path).unwrap();
        let post = Post::from_document("hello-world", &document).unwrap();
        assert_eq!(post.metadata.title, "Hello, World!");
        assert_eq!(post.metadata.description, "Hello, World!");
        assert_eq!(post.metadata.date, "2024-05-01");
        assert_eq!(post.content, "Write your post here.");
    }

    #[test]
    fn test_existing_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        create_post(dir.path(), "Same", Some("first"), now).unwrap();
        assert!(create_post(dir.path(), "Same", Some("second"), now).is_err());

        let document = fs::read_to_string(dir.path().join("same.md")).unwrap();
        assert!(document.contains("description: \"first\""));
    }

    #[test]
    fn test_unusable_title() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_post(dir.path(), "!!!", None, Utc::now()).is_err());
    }
}
