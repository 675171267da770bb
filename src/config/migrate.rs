//! Migration configuration (migrate.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;

/// Shortcodes that only make sense in the old theme and are dropped outright
pub const DEFAULT_REMOVED_SHORTCODES: &[&str] = &[
    "example-loading-page",
    "mirror-example-output",
    "magic-mirror-gallery",
    "photo-booth-gallery",
    "gifts-from-organizers",
    "four-images",
    "gallery",
    "git-graph",
    "credly-badges",
    "holopin",
    "lb-amazon-preview",
    "github-sponsor",
];

/// Main migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    // Directories
    pub source_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub dest_dir: Option<PathBuf>,

    // Input
    /// File name patterns a source post must match
    pub include: Vec<String>,

    // Output
    pub output_file: String,
    /// Inline images under this prefix are relocated next to the post
    pub asset_prefix: String,

    // Rewriting
    #[serde(default)]
    pub tag_aliases: IndexMap<String, String>,
    #[serde(default)]
    pub remove_shortcodes: Vec<String>,

    // Reporting
    pub max_warnings: usize,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        let mut tag_aliases = IndexMap::new();
        tag_aliases.insert("CSharp".to_string(), "C#".to_string());

        Self {
            source_dir: None,
            static_dir: None,
            dest_dir: None,

            include: vec!["*.md".to_string()],

            output_file: "index.md".to_string(),
            asset_prefix: "/img/".to_string(),

            tag_aliases,
            remove_shortcodes: DEFAULT_REMOVED_SHORTCODES
                .iter()
                .map(|s| s.to_string())
                .collect(),

            max_warnings: 20,
        }
    }
}

impl MigrateConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: MigrateConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Apply command line / environment overrides on top of the file values
    pub fn with_dirs(
        mut self,
        source_dir: Option<PathBuf>,
        static_dir: Option<PathBuf>,
        dest_dir: Option<PathBuf>,
    ) -> Self {
        if source_dir.is_some() {
            self.source_dir = source_dir;
        }
        if static_dir.is_some() {
            self.static_dir = static_dir;
        }
        if dest_dir.is_some() {
            self.dest_dir = dest_dir;
        }
        self
    }

    pub fn source_dir(&self) -> Result<&Path, MigrateError> {
        self.source_dir
            .as_deref()
            .ok_or(MigrateError::MissingSetting("source_dir"))
    }

    pub fn static_dir(&self) -> Result<&Path, MigrateError> {
        self.static_dir
            .as_deref()
            .ok_or(MigrateError::MissingSetting("static_dir"))
    }

    pub fn dest_dir(&self) -> Result<&Path, MigrateError> {
        self.dest_dir
            .as_deref()
            .ok_or(MigrateError::MissingSetting("dest_dir"))
    }

    /// Compile the include patterns
    pub fn include_patterns(&self) -> Result<Vec<glob::Pattern>, MigrateError> {
        self.include
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| MigrateError::Pattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}
