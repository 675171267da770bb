//! Migrate Hugo posts into the Astro content collection

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{
    AssetRelocator, DestinationPost, Normalizer, ShortcodeRewriter, SourceMeta, SourcePost,
};
use crate::stats::RunStats;
use crate::Migrator;

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Post written (or, in a dry run, would be written) to this path
    Migrated(PathBuf),
    /// Draft, nothing written
    Draft,
}

/// Everything a single post conversion needs, shared across the run
struct PostContext<'a> {
    static_dir: &'a Path,
    dest_dir: &'a Path,
    output_file: &'a str,
    asset_prefix: &'a str,
    dry_run: bool,
    normalizer: Normalizer<'a>,
    rewriter: ShortcodeRewriter,
}

/// Run the migration over every source post
pub fn run(migrator: &Migrator) -> Result<RunStats> {
    run_with_date(migrator, migrator.today)
}

/// Run the migration, using `today` for posts without a usable date
pub fn run_with_date(migrator: &Migrator, today: NaiveDate) -> Result<RunStats> {
    let config = &migrator.config;
    let static_dir = config.static_dir()?;
    let dest_dir = config.dest_dir()?;

    let sources = migrator.source_files()?;

    tracing::info!("Source: {:?}", migrator.source_dir);
    tracing::info!("Destination: {:?}", dest_dir);
    if migrator.dry_run {
        tracing::info!("Dry run: nothing will be written");
    } else {
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create destination {:?}", dest_dir))?;
    }

    let ctx = PostContext {
        static_dir,
        dest_dir,
        output_file: &config.output_file,
        asset_prefix: &config.asset_prefix,
        dry_run: migrator.dry_run,
        normalizer: Normalizer::new(today, &config.tag_aliases),
        rewriter: ShortcodeRewriter::new(config.remove_shortcodes.as_slice())
            .context("Invalid shortcode removal list")?,
    };

    tracing::info!("Found {} posts to migrate", sources.len());

    let mut stats = RunStats::new();
    for path in &sources {
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!("Processing: {}", filename);

        match migrate_post(&ctx, path, &mut stats) {
            Ok(PostOutcome::Migrated(output)) => {
                let shown = output.strip_prefix(dest_dir).unwrap_or(&output);
                tracing::info!("  Created: {}", shown.display());
                stats.processed += 1;
            }
            Ok(PostOutcome::Draft) => {
                tracing::info!("  Skipping draft post");
                stats.skipped += 1;
            }
            Err(e) => {
                tracing::error!("  Error processing {}: {:#}", filename, e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

fn migrate_post(ctx: &PostContext, path: &Path, stats: &mut RunStats) -> Result<PostOutcome> {
    let source = SourcePost::load(path)?;
    let filename = source.filename.as_str();

    if source.used_fallback {
        if let Some(format) = source.format {
            stats.warn(format!(
                "{} front-matter in {} was parsed with the fallback parser",
                format, filename
            ));
        }
    }

    if source.meta.is_draft() {
        return Ok(PostOutcome::Draft);
    }

    let post_dir = ctx.dest_dir.join(source.slug());
    if !ctx.dry_run && !post_dir.exists() {
        fs::create_dir_all(&post_dir)
            .with_context(|| format!("Failed to create {:?}", post_dir))?;
    }

    let matter = ctx.normalizer.normalize(&source.meta, filename, stats);

    let mut relocator =
        AssetRelocator::new(ctx.static_dir, &post_dir, ctx.asset_prefix).dry_run(ctx.dry_run);
    if let Some(cover) = cover_reference(&source.meta, filename, stats) {
        relocator.place(&cover, stats);
    }

    let body = ctx.rewriter.rewrite_post(&source.body, filename, stats);
    let body = relocator.relocate_inline(&body, stats);

    let post = DestinationPost::new(matter, body);
    let output = post_dir.join(ctx.output_file);
    if !ctx.dry_run {
        fs::write(&output, post.render()?)
            .with_context(|| format!("Failed to write {:?}", output))?;
    }

    Ok(PostOutcome::Migrated(output))
}

/// Static-tree path of the cover image named by the front-matter
fn cover_reference(meta: &SourceMeta, filename: &str, stats: &mut RunStats) -> Option<String> {
    match (&meta.featured, &meta.featuredpath) {
        (Some(featured), Some(dir)) => Some(format!("/{}/{}", dir.trim_matches('/'), featured)),
        (Some(featured), None) => match meta.images.first() {
            Some(image) => {
                stats.warn(format!(
                    "Featured image {} in {} has no featuredpath, copying {} instead",
                    featured, filename, image
                ));
                Some(image.clone())
            }
            None => {
                stats.warn(format!(
                    "Featured image {} in {} has no featuredpath, not copied",
                    featured, filename
                ));
                None
            }
        },
        (None, _) => meta.images.first().cloned(),
    }
}

/// Print the end-of-run summary and follow-up suggestions
pub fn print_summary(migrator: &Migrator, stats: &RunStats) {
    println!();
    println!("{}", stats.summary(migrator.config.max_warnings));

    if migrator.dry_run {
        println!("Dry run complete, nothing was written.");
        return;
    }

    println!("Migration complete!");
    println!();
    println!("Next steps:");
    if let Some(dest) = &migrator.config.dest_dir {
        println!("  1. Review migrated posts in {}", dest.display());
    } else {
        println!("  1. Review migrated posts");
    }
    println!("  2. Update the site configuration with your information");
    println!("  3. Run: npm run build");
    println!("  4. Run: npm run postbuild (for search indexing)");
    println!("  5. Manually review posts with warnings");
}
