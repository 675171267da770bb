//! Source and destination post models

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::frontmatter::{self, MatterFormat, SourceMeta};
use super::normalize::DestinationMatter;

/// A Hugo post as read from disk
#[derive(Debug, Clone)]
pub struct SourcePost {
    /// Full source file path
    pub path: PathBuf,

    /// File name, used in messages
    pub filename: String,

    /// Parsed front-matter
    pub meta: SourceMeta,

    /// Trimmed markdown body
    pub body: String,

    /// Front-matter convention found in the file
    pub format: Option<MatterFormat>,

    /// Front-matter was only readable with the fallback parser
    pub used_fallback: bool,
}

impl SourcePost {
    /// Read and split a post file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_content(path, &content)
    }

    pub fn from_content(path: &Path, content: &str) -> Result<Self> {
        let parsed = frontmatter::parse(content)?;
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            meta: parsed.meta,
            body: parsed.body.to_string(),
            format: parsed.format,
            used_fallback: parsed.used_fallback,
        })
    }

    /// Output directory name: the file name without its extension, as is
    pub fn slug(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.filename.clone())
    }
}

/// A migrated Astro post
#[derive(Debug, Clone)]
pub struct DestinationPost {
    pub matter: DestinationMatter,
    pub body: String,
}

impl DestinationPost {
    pub fn new(matter: DestinationMatter, body: String) -> Self {
        Self { matter, body }
    }

    /// Serialize as YAML front-matter followed by the body
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.matter).context("Failed to serialize front-matter")?;
        Ok(format!("---\n{}---\n\n{}\n", yaml, self.body.trim_end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter;
    use crate::content::normalize::CoverImage;
    use chrono::NaiveDate;

    #[test]
    fn test_slug_keeps_filename_verbatim() {
        let post = SourcePost::from_content(
            Path::new("/blog/My Post_v2.md"),
            "+++\ntitle = \"x\"\n+++\nBody",
        )
        .unwrap();
        assert_eq!(post.slug(), "My Post_v2");
        assert_eq!(post.filename, "My Post_v2.md");
        assert_eq!(post.format, Some(MatterFormat::Toml));
    }

    #[test]
    fn test_render_reads_back() {
        let post = DestinationPost::new(
            DestinationMatter {
                title: "Hello: World".to_string(),
                published: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                draft: None,
                description: None,
                author: Some("David".to_string()),
                tags: vec!["C#".to_string(), "Go".to_string()],
                series: None,
                cover_image: Some(CoverImage {
                    src: "./cover.png".to_string(),
                    alt: "Cover".to_string(),
                }),
            },
            "# Heading\n\nText.\n\n".to_string(),
        );

        let rendered = post.render().unwrap();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("\n\n# Heading\n\nText.\n"));
        assert!(rendered.contains("coverImage:"));

        let parsed = frontmatter::parse(&rendered).unwrap();
        assert_eq!(parsed.body, "# Heading\n\nText.");
        let back: DestinationMatter =
            serde_yaml::from_str(rendered.split("---\n").nth(1).unwrap()).unwrap();
        assert_eq!(back, post.matter);
    }
}
