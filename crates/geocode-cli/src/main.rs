mod bounds;
mod parse;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geocode_core::{GeoCircle, GeoRectangle};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geocode-cli")]
#[command(about = "Parse geocoding service `places` responses into JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse one or more response files and print one JSON report per file
    Parse {
        /// Response files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Request bounds as TOP,LEFT,BOTTOM,RIGHT in degrees
        #[arg(long, value_parser = bounds::parse_rect, conflicts_with = "circle")]
        rect: Option<GeoRectangle>,
        /// Request bounds as LAT,LON,RADIUS (radius in metres)
        #[arg(long, value_parser = bounds::parse_circle)]
        circle: Option<GeoCircle>,
        /// Drop places outside the request bounds
        #[arg(long)]
        clip: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a response file parses, printing the place count
    Validate {
        /// Response file to check
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = geocode_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(env = %config.env, worker_threads = config.worker_threads, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.worker_threads)
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Parse {
                files,
                rect,
                circle,
                clip,
                pretty,
            } => {
                let bounds = bounds::to_shape(rect, circle);
                parse::run_parse(&config, &files, bounds, clip, pretty).await
            }
            Commands::Validate { file } => parse::run_validate(&config, &file).await,
        }
    })
}
