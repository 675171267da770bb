//! List source posts and how they will migrate

use anyhow::Result;
use serde::Serialize;

use crate::content::{parse_published, shortcode, ShortcodeRewriter, SourcePost};
use crate::Migrator;

/// One source post as seen by the migration
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub file: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub draft: bool,
    /// Shortcodes the rewriter would leave behind
    pub unconverted: Vec<String>,
    /// Set when the file could not be read or parsed
    pub error: Option<String>,
}

/// Inspect every source post without writing anything
pub fn entries(migrator: &Migrator) -> Result<Vec<ListEntry>> {
    let rewriter = ShortcodeRewriter::new(migrator.config.remove_shortcodes.as_slice())?;
    let mut entries = Vec::new();

    for path in migrator.source_files()? {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let entry = match SourcePost::load(&path) {
            Ok(post) => {
                let converted = rewriter.rewrite(&post.body);
                ListEntry {
                    file,
                    date: post
                        .meta
                        .date
                        .as_deref()
                        .and_then(parse_published)
                        .map(|d| d.to_string()),
                    title: post.meta.title.clone(),
                    draft: post.meta.is_draft(),
                    unconverted: shortcode::unconverted(&converted)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    error: None,
                }
            }
            Err(e) => ListEntry {
                file,
                title: None,
                date: None,
                draft: false,
                unconverted: Vec::new(),
                error: Some(format!("{:#}", e)),
            },
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Print the source posts
pub fn run(migrator: &Migrator, json: bool) -> Result<()> {
    let entries = entries(migrator)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Posts ({}):", entries.len());
    for entry in &entries {
        let status = if let Some(error) = &entry.error {
            format!("error: {}", error)
        } else if entry.draft {
            "draft".to_string()
        } else if !entry.unconverted.is_empty() {
            format!("{} unconverted shortcodes", entry.unconverted.len())
        } else {
            "ok".to_string()
        };
        println!(
            "  {} - {} [{}] {}",
            entry.date.as_deref().unwrap_or("????-??-??"),
            entry.title.as_deref().unwrap_or("(untitled)"),
            entry.file,
            status
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrateConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a-draft.md"),
            "+++\ntitle = \"Draft\"\ndraft = true\n+++\nBody",
        )
        .unwrap();
        fs::write(
            tmp.path().join("b-post.md"),
            "---\ntitle: Post\ndate: 2024-03-01\n---\n{{< youtube abc >}} {{< widget >}}",
        )
        .unwrap();
        fs::write(tmp.path().join("notes.txt"), "not a post").unwrap();

        let config = MigrateConfig::default().with_dirs(Some(tmp.path().to_path_buf()), None, None);
        let migrator = Migrator::new(config).unwrap();
        let entries = entries(&migrator).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file, "a-draft.md");
        assert!(entries[0].draft);
        assert_eq!(entries[1].date.as_deref(), Some("2024-03-01"));
        assert_eq!(entries[1].unconverted, vec!["{{< widget >}}"]);
    }
}
