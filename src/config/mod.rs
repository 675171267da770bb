//! Configuration module

mod migrate;

pub use migrate::MigrateConfig;
pub use migrate::DEFAULT_REMOVED_SHORTCODES;
