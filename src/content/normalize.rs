//! Mapping of Hugo front-matter onto the Astro post schema

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::frontmatter::SourceMeta;
use crate::stats::RunStats;

/// Cover image entry of an Astro post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    pub src: String,
    pub alt: String,
}

/// Front-matter of a migrated post, in the order fields are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationMatter {
    pub title: String,
    pub published: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<CoverImage>,
}

/// Converts source metadata to the destination schema.
///
/// Never fails: missing or unusable values are replaced by a synthesized
/// default and a warning.
pub struct Normalizer<'a> {
    today: NaiveDate,
    tag_aliases: &'a IndexMap<String, String>,
}

impl<'a> Normalizer<'a> {
    pub fn new(today: NaiveDate, tag_aliases: &'a IndexMap<String, String>) -> Self {
        Self { today, tag_aliases }
    }

    pub fn normalize(
        &self,
        meta: &SourceMeta,
        filename: &str,
        stats: &mut RunStats,
    ) -> DestinationMatter {
        let title = match non_blank(&meta.title) {
            Some(title) => title,
            None => {
                stats.warn(format!("Missing title in {}", filename));
                Path::new(filename)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(filename)
                    .to_string()
            }
        };

        let published = match meta.date.as_deref() {
            Some(raw) => parse_published(raw).unwrap_or_else(|| {
                stats.warn(format!(
                    "Invalid date \"{}\" in {}, using current date",
                    raw, filename
                ));
                self.today
            }),
            None => {
                stats.warn(format!("Missing date in {}, using current date", filename));
                self.today
            }
        };

        let draft = meta.draft_flag();
        if draft.is_none() {
            if let Some(raw) = meta.draft.as_ref().filter(|v| !v.is_null()) {
                stats.warn(format!(
                    "Non-boolean draft value {} in {}, treating the post as published",
                    serde_yaml::to_string(raw).unwrap_or_default().trim(),
                    filename
                ));
            }
        }

        let authors: Vec<&str> = meta
            .author
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if authors.len() > 1 {
            stats.warn(format!(
                "Multiple authors in {}, joined into one entry",
                filename
            ));
        }
        let author = if authors.is_empty() {
            None
        } else {
            Some(authors.join(", "))
        };

        let series = match meta.series.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            [first, rest @ ..] => {
                stats.warn(format!(
                    "Multiple series in {}, keeping \"{}\" and dropping {}",
                    filename,
                    first,
                    rest.len()
                ));
                Some(first.clone())
            }
        };

        let cover_name = meta
            .featured
            .as_deref()
            .or_else(|| meta.images.first().map(String::as_str))
            .and_then(file_name);
        let cover_image = cover_name.map(|name| CoverImage {
            src: format!("./{}", name),
            alt: meta.featuredalt.clone().unwrap_or_else(|| title.clone()),
        });

        if !meta.extra.is_empty() {
            tracing::debug!(
                "Dropping front-matter fields in {}: {}",
                filename,
                meta.extra.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }

        DestinationMatter {
            title,
            published,
            draft,
            description: non_blank(&meta.description),
            author,
            tags: self.merge_tags(&meta.tags, &meta.categories),
            series,
            cover_image,
        }
    }

    /// Union of tags and categories, aliased, deduplicated and sorted
    pub fn merge_tags(&self, tags: &[String], categories: &[String]) -> Vec<String> {
        tags.iter()
            .chain(categories)
            .map(|tag| self.tag_aliases.get(tag).unwrap_or(tag).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Present and not just whitespace
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn file_name(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(|s| s.to_str())
}

/// Parse a Hugo date value into a calendar date (UTC for offset-aware values)
pub fn parse_published(value: &str) -> Option<NaiveDate> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    let offset_formats = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S%.f %z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    ["%Y-%m-%d", "%Y/%m/%d"]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert("CSharp".to_string(), "C#".to_string());
        map
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_complete_metadata() {
        let meta = SourceMeta {
            title: Some("Exploring C# 12".to_string()),
            date: Some("2024-01-15T10:30:00-05:00".to_string()),
            draft: Some(serde_yaml::Value::Bool(false)),
            description: Some("What's new".to_string()),
            author: strings(&["David"]),
            series: strings(&["Language Features"]),
            featured: Some("cover.png".to_string()),
            featuredalt: Some("A cover".to_string()),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "csharp-12.md", &mut stats);

        assert!(stats.warnings.is_empty());
        assert_eq!(dest.title, "Exploring C# 12");
        assert_eq!(dest.published, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(dest.draft, Some(false));
        assert_eq!(dest.description.as_deref(), Some("What's new"));
        assert_eq!(dest.author.as_deref(), Some("David"));
        assert_eq!(dest.series.as_deref(), Some("Language Features"));
        assert_eq!(
            dest.cover_image,
            Some(CoverImage {
                src: "./cover.png".to_string(),
                alt: "A cover".to_string()
            })
        );
        assert!(dest.tags.is_empty());
    }

    #[test]
    fn test_missing_title_uses_filename() {
        let meta = SourceMeta {
            date: Some("2024-01-15".to_string()),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "my-post.md", &mut stats);

        assert_eq!(dest.title, "my-post");
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains("my-post.md"));
    }

    #[test]
    fn test_blank_text_fields_count_as_missing() {
        let meta = SourceMeta {
            title: Some("  ".to_string()),
            date: Some("2024-01-15".to_string()),
            description: Some(String::new()),
            author: strings(&[""]),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "blank.md", &mut stats);

        assert_eq!(dest.title, "blank");
        assert_eq!(dest.description, None);
        assert_eq!(dest.author, None);
        assert_eq!(stats.warnings, vec!["Missing title in blank.md".to_string()]);

        let yaml = serde_yaml::to_string(&dest).unwrap();
        assert!(!yaml.contains("description"));
        assert!(!yaml.contains("author"));
    }

    #[test]
    fn test_author_list_and_loose_draft() {
        let meta = SourceMeta {
            title: Some("Pair".to_string()),
            date: Some("2024-01-15".to_string()),
            draft: Some(serde_yaml::Value::String("false".to_string())),
            author: strings(&["David Pine", "Someone Else"]),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "pair.md", &mut stats);

        assert_eq!(dest.author.as_deref(), Some("David Pine, Someone Else"));
        assert_eq!(dest.draft, None);
        assert_eq!(stats.warnings.len(), 2, "{:?}", stats.warnings);
        assert!(stats.warnings.iter().any(|w| w.starts_with("Non-boolean draft")));
    }

    #[test]
    fn test_missing_date_uses_run_date() {
        let meta = SourceMeta {
            title: Some("Undated".to_string()),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "undated.md", &mut stats);

        assert_eq!(dest.published, today());
        assert_eq!(
            stats.warnings,
            vec!["Missing date in undated.md, using current date".to_string()]
        );
    }

    #[test]
    fn test_invalid_date_uses_run_date() {
        let meta = SourceMeta {
            title: Some("Bad".to_string()),
            date: Some("last tuesday".to_string()),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "bad.md", &mut stats);

        assert_eq!(dest.published, today());
        assert_eq!(stats.warnings.len(), 1);
        assert!(stats.warnings[0].contains("last tuesday"));
    }

    #[test]
    fn test_tags_merged_aliased_and_sorted() {
        let aliases = aliases();
        let normalizer = Normalizer::new(today(), &aliases);

        let tags = normalizer.merge_tags(&strings(&["Go", "C#"]), &strings(&["Go", "CSharp"]));
        assert_eq!(tags, vec!["C#", "Go"]);

        // Exact-match dedupe is case sensitive
        let tags = normalizer.merge_tags(&strings(&["rust", "Rust"]), &[]);
        assert_eq!(tags, vec!["Rust", "rust"]);
    }

    #[test]
    fn test_cover_from_images_falls_back_to_title_alt() {
        let meta = SourceMeta {
            title: Some("Gallery".to_string()),
            date: Some("2023-05-01".to_string()),
            images: strings(&["/img/2023/05/hero.jpg", "/img/2023/05/other.jpg"]),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "gallery.md", &mut stats);

        let cover = dest.cover_image.unwrap();
        assert_eq!(cover.src, "./hero.jpg");
        assert_eq!(cover.alt, "Gallery");
    }

    #[test]
    fn test_draft_only_written_when_present() {
        let meta = SourceMeta {
            title: Some("Plain".to_string()),
            date: Some("2023-05-01".to_string()),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "plain.md", &mut stats);
        let yaml = serde_yaml::to_string(&dest).unwrap();

        assert_eq!(dest.draft, None);
        assert!(!yaml.contains("draft"));
        assert!(!yaml.contains("tags"));
        assert!(!yaml.contains("coverImage"));
    }

    #[test]
    fn test_multiple_series_keeps_first() {
        let meta = SourceMeta {
            title: Some("S".to_string()),
            date: Some("2023-05-01".to_string()),
            series: strings(&["One", "Two"]),
            ..Default::default()
        };
        let aliases = aliases();
        let mut stats = RunStats::new();

        let dest = Normalizer::new(today(), &aliases).normalize(&meta, "s.md", &mut stats);

        assert_eq!(dest.series.as_deref(), Some("One"));
        assert_eq!(stats.warnings.len(), 1);
    }

    #[test]
    fn test_parse_published_formats() {
        let jan15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_published("2024-01-15"), Some(jan15));
        assert_eq!(parse_published("2024/01/15"), Some(jan15));
        assert_eq!(parse_published("2024-01-15 10:30:00"), Some(jan15));
        assert_eq!(parse_published("2024-01-15T10:30:00.123"), Some(jan15));
        assert_eq!(parse_published("2024-01-15T10:30:00Z"), Some(jan15));
        // Converted to UTC before the time of day is dropped
        assert_eq!(
            parse_published("2024-01-14T22:00:00-05:00"),
            Some(jan15)
        );
        assert_eq!(parse_published("not a date"), None);
    }
}
