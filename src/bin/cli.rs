//! Feed publisher CLI
//!
//! Local execution entry point for the sanitize, audit and publish pipelines.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use feed_publisher::{
    config::load_config,
    error::Result,
    models::ValidationReport,
    pipeline::{self, PipelineOptions},
    services::ChunkedUploader,
};

/// feedpub - ROM catalog feed publisher
#[derive(Parser, Debug)]
#[command(
    name = "feedpub",
    version,
    about = "Sanitize, audit and publish a ROM catalog feed"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "feed.toml")]
    config: PathBuf,

    /// Directory holding feed.json and the reports (overrides config)
    #[arg(short, long)]
    build_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace store-incompatible keys in feed.json (with backup)
    Sanitize,

    /// Check that every ROM URL is reachable and write reports
    Audit,

    /// Upload the feed to the tree store in chunks
    Publish {
        /// Items per chunk write
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Store path to publish under
        #[arg(long)]
        path: Option<String>,

        /// Publish into a local JSON tree file instead of the remote store
        #[arg(long)]
        local: Option<PathBuf>,

        /// Print the planned writes without sending anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run full pipeline: Sanitize → Audit → Publish
    Pipeline {
        /// Skip the URL audit
        #[arg(long)]
        skip_audit: bool,

        /// Skip the upload
        #[arg(long)]
        skip_publish: bool,

        /// Publish into a local JSON tree file instead of the remote store
        #[arg(long)]
        local: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,

    /// Show feed statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config);
    if let Some(dir) = cli.build_dir {
        config.paths.build_dir = dir;
    }
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Sanitize => {
            config.validate()?;
            pipeline::run_sanitize(&config).await?;
        }

        Command::Audit => {
            config.validate()?;
            pipeline::run_audit(&config).await?;
        }

        Command::Publish {
            chunk_size,
            path,
            local,
            dry_run,
        } => {
            if let Some(size) = chunk_size {
                config.upload.chunk_size = size;
            }
            if let Some(path) = path {
                config.upload.base_path = path;
            }
            config.validate()?;

            if dry_run {
                let feed = pipeline::load_feed(&config.paths.feed_path()).await?;
                let units = ChunkedUploader::plan(
                    &feed.document,
                    &config.upload.base_path,
                    config.upload.chunk_size,
                );
                for unit in &units {
                    log::info!("{:?} {} ← {}", unit.mode, unit.target_path, unit.kind);
                }
                log::info!("{} writes planned", units.len());
                return Ok(());
            }

            let store = pipeline::open_store(&config, local).await?;
            pipeline::run_publish(&config, store.as_ref()).await?;
        }

        Command::Pipeline {
            skip_audit,
            skip_publish,
            local,
        } => {
            config.validate()?;
            let store = if skip_publish {
                None
            } else {
                Some(pipeline::open_store(&config, local).await?)
            };
            let options = PipelineOptions {
                skip_audit,
                skip_publish,
            };
            pipeline::run_pipeline(&config, store.as_deref(), options).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("    Feed file: {}", config.paths.feed_path().display());
            log::info!("    Store: {}{}", config.store.database_url, config.upload.base_path);
            log::info!(
                "    Checker: {} concurrent, {}s timeout",
                config.checker.max_concurrent,
                config.checker.timeout_secs
            );
            log::info!("    Chunk size: {}", config.upload.chunk_size);
        }

        Command::Info => {
            let feed = pipeline::load_feed(&config.paths.feed_path()).await?;
            let urls = feed_publisher::services::extract_urls(&feed.document);
            log::info!("ROM URLs: {}", urls.len());
            log::info!(
                "Backup: {}",
                if config.paths.backup_path().exists() {
                    "exists"
                } else {
                    "not found"
                }
            );

            let report_path = config.paths.report_path();
            if let Ok(raw) = tokio::fs::read_to_string(&report_path).await {
                match serde_json::from_str::<ValidationReport>(&raw) {
                    Ok(report) => log::info!(
                        "Last audit ({}): {}/{} valid ({}%)",
                        report.timestamp.to_rfc3339(),
                        report.summary.valid,
                        report.summary.total,
                        report.summary.success_rate_percent
                    ),
                    Err(e) => log::warn!("Unreadable report {}: {}", report_path.display(), e),
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
