//! CLI entry point for hugo-migrate

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hugo_migrate::{MigrateConfig, Migrator};

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG: &str = "migrate.yml";

#[derive(Parser)]
#[command(name = "hugo-migrate")]
#[command(version)]
#[command(about = "Migrate Hugo blog posts into an Astro content collection", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./migrate.yml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every post in the Hugo content directory
    #[command(alias = "m")]
    Migrate {
        /// Hugo content directory holding the posts
        #[arg(long, env = "HUGO_MIGRATE_SOURCE")]
        source: Option<PathBuf>,

        /// Hugo static directory that image paths resolve against
        #[arg(long = "static", env = "HUGO_MIGRATE_STATIC")]
        static_dir: Option<PathBuf>,

        /// Astro content collection directory to write posts into
        #[arg(long, env = "HUGO_MIGRATE_DEST")]
        dest: Option<PathBuf>,

        /// Report what would happen without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List source posts and how they will migrate
    List {
        /// Hugo content directory holding the posts
        #[arg(long, env = "HUGO_MIGRATE_SOURCE")]
        source: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<MigrateConfig> {
    match path {
        Some(path) => MigrateConfig::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => MigrateConfig::load(DEFAULT_CONFIG),
        None => Ok(MigrateConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Migrate {
            source,
            static_dir,
            dest,
            dry_run,
        } => {
            let config = config.with_dirs(source, static_dir, dest);
            let migrator = Migrator::new(config)?.dry_run(dry_run);
            tracing::info!("Starting Hugo to Astro migration...");

            let stats = migrator.migrate()?;
            hugo_migrate::commands::migrate::print_summary(&migrator, &stats);
        }

        Commands::List { source, json } => {
            let config = config.with_dirs(source, None, None);
            let migrator = Migrator::new(config)?;
            hugo_migrate::commands::list::run(&migrator, json)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "hugo_migrate=debug,info"
    } else {
        "hugo_migrate=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
