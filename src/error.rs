//! Error types for the migration

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a single post or the whole run
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Failed to parse {format} front-matter ({primary}); fallback parser also failed ({fallback})")]
    Metadata {
        format: &'static str,
        primary: String,
        fallback: String,
    },

    #[error("Cannot read source directory {path:?}: {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required setting `{0}` (pass it on the command line, in the environment or in the config file)")]
    MissingSetting(&'static str),

    #[error("Invalid include pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },
}
