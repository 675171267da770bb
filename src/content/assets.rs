//! Image relocation into a post's own directory

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::stats::RunStats;

lazy_static! {
    /// `![alt](path "optional title")`, the path may contain spaces
    static ref INLINE_IMAGE: Regex = Regex::new(r#"!\[([^\]]*)\]\(([^)"\s][^)"]*?)(\s+"[^"]*")?\s*\)"#)
        .expect("inline image pattern is valid");
}

/// Copies images referenced by one post next to its `index.md`.
///
/// Each file name is placed at most once per post directory.
pub struct AssetRelocator<'a> {
    static_dir: &'a Path,
    post_dir: &'a Path,
    prefix: &'a str,
    dry_run: bool,
    /// File name in the post directory -> source file it came from
    placed: HashMap<String, PathBuf>,
}

impl<'a> AssetRelocator<'a> {
    pub fn new(static_dir: &'a Path, post_dir: &'a Path, prefix: &'a str) -> Self {
        Self {
            static_dir,
            post_dir,
            prefix,
            dry_run: false,
            placed: HashMap::new(),
        }
    }

    /// Resolve and check references without touching the file system
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Number of distinct files placed in the post directory
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// Resolve a site-absolute reference against the static directory
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.static_dir.join(reference.trim_start_matches('/'))
    }

    /// Make `reference` available in the post directory.
    ///
    /// Returns the file name it is available under, or `None` (with a
    /// warning recorded) when it could not be placed.
    pub fn place(&mut self, reference: &str, stats: &mut RunStats) -> Option<String> {
        let source = self.resolve(reference);
        let name = source.file_name()?.to_string_lossy().to_string();

        if let Some(existing) = self.placed.get(&name) {
            if *existing == source {
                return Some(name);
            }
            stats.warn(format!(
                "Image name collision in {:?}: {:?} and {:?} are both named {}",
                self.post_dir, existing, source, name
            ));
            return None;
        }

        if !source.is_file() {
            stats.warn(format!("Image not found: {}", source.display()));
            return None;
        }

        if !self.dry_run {
            if let Err(e) = fs::copy(&source, self.post_dir.join(&name)) {
                stats.warn(format!(
                    "Failed to copy image {}: {}",
                    source.display(),
                    e
                ));
                return None;
            }
            tracing::info!("  Copied image: {}", name);
        }

        self.placed.insert(name.clone(), source);
        Some(name)
    }

    /// Copy inline images under the asset prefix and point them at the copies
    pub fn relocate_inline(&mut self, body: &str, stats: &mut RunStats) -> String {
        INLINE_IMAGE
            .replace_all(body, |caps: &Captures| {
                let path = &caps[2];
                if !path.starts_with(self.prefix) {
                    return caps[0].to_string();
                }
                match self.place(path, stats) {
                    Some(name) => format!(
                        "![{}](./{}{})",
                        &caps[1],
                        name,
                        caps.get(3).map_or("", |m| m.as_str())
                    ),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
