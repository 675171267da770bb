//! hugo-migrate: move a Hugo blog into an Astro content collection
//!
//! Posts are read from a flat Hugo content directory, their front-matter is
//! mapped onto the Astro post schema, Hugo shortcodes are rewritten to
//! markdown or `:::` directives, and referenced images are copied next to
//! each migrated `index.md`.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod stats;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use config::MigrateConfig;
pub use error::MigrateError;
pub use stats::RunStats;

/// The migration application
#[derive(Debug, Clone)]
pub struct Migrator {
    /// Migration configuration
    pub config: MigrateConfig,
    /// Hugo content directory holding the posts
    pub source_dir: PathBuf,
    /// Date used for posts without one
    pub today: NaiveDate,
    /// Check everything, write nothing
    pub dry_run: bool,
}

impl Migrator {
    /// Create a new migrator; the source directory setting is required
    pub fn new(config: MigrateConfig) -> Result<Self> {
        let source_dir = config.source_dir()?.to_path_buf();

        Ok(Self {
            config,
            source_dir,
            today: Utc::now().date_naive(),
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the migration
    pub fn migrate(&self) -> Result<RunStats> {
        commands::migrate::run(self)
    }

    /// Source posts in file name order (not recursive)
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        // Surface an unreadable directory instead of an empty listing
        fs::read_dir(&self.source_dir).map_err(|source| MigrateError::SourceDir {
            path: self.source_dir.clone(),
            source,
        })?;

        let patterns = self.config.include_patterns()?;
        let files = WalkDir::new(&self.source_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| is_included(path, &patterns))
            .collect();

        Ok(files)
    }
}

/// Check a file name against the include patterns
fn is_included(path: &Path, patterns: &[glob::Pattern]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| patterns.iter().any(|p| p.matches(name)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_files_flat_and_filtered() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.md"), "").unwrap();
        fs::write(tmp.path().join("a.md"), "").unwrap();
        fs::write(tmp.path().join("c.markdown"), "").unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/d.md"), "").unwrap();

        let config = MigrateConfig::default().with_dirs(Some(tmp.path().to_path_buf()), None, None);
        let migrator = Migrator::new(config).unwrap();
        let names: Vec<_> = migrator
            .source_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_missing_source_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config =
            MigrateConfig::default().with_dirs(Some(tmp.path().join("does-not-exist")), None, None);
        let migrator = Migrator::new(config).unwrap();

        let err = migrator.source_files().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrateError>(),
            Some(MigrateError::SourceDir { .. })
        ));
    }

    #[test]
    fn test_source_dir_required() {
        assert!(Migrator::new(MigrateConfig::default()).is_err());
    }
}
