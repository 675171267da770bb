//! Run statistics collected across a migration

/// Counters and warnings for one migration run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: Vec<String>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable problem
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("Warning recorded: {}", message);
        self.warnings.push(message);
    }

    /// Render the end-of-run summary, showing at most `max_warnings` warnings
    pub fn summary(&self, max_warnings: usize) -> String {
        let mut out = String::new();
        out.push_str("Migration Summary:\n");
        out.push_str(&format!("  Successfully processed: {}\n", self.processed));
        out.push_str(&format!("  Skipped: {}\n", self.skipped));
        out.push_str(&format!("  Errors: {}\n", self.errors));

        if !self.warnings.is_empty() {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for warning in self.warnings.iter().take(max_warnings) {
                out.push_str(&format!("  - {}\n", warning));
            }
            if self.warnings.len() > max_warnings {
                out.push_str(&format!(
                    "  ... and {} more warnings\n",
                    self.warnings.len() - max_warnings
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let stats = RunStats {
            processed: 2,
            skipped: 1,
            errors: 0,
            warnings: Vec::new(),
        };
        let summary = stats.summary(20);
        assert!(summary.contains("Successfully processed: 2"));
        assert!(summary.contains("Skipped: 1"));
        assert!(summary.contains("Errors: 0"));
        assert!(!summary.contains("Warnings"));
    }

    #[test]
    fn test_summary_truncates_warnings() {
        let mut stats = RunStats::new();
        for i in 0..25 {
            stats.warn(format!("warning {}", i));
        }
        let summary = stats.summary(20);
        assert!(summary.contains("Warnings (25):"));
        assert!(summary.contains("warning 19"));
        assert!(!summary.contains("warning 20"));
        assert!(summary.contains("... and 5 more warnings"));
    }
}
