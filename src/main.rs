use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bird_site::config::Config;
use bird_site::credentials::Credentials;
use bird_site::error::{exit_code, EXIT_BAD_USER_ID, EXIT_FAILURE};
use bird_site::pipeline::{self, RunArgs};

/// Convert a Twitter data export into a static website.
#[derive(Debug, Parser)]
#[command(name = "bird-site", version, about)]
struct Cli {
    /// Export archive, e.g. archive.zip
    archive_path: PathBuf,

    /// Numeric id of the account whose posts are published
    #[arg(allow_hyphen_values = true)]
    user_id: String,

    /// Base URL used for canonical links, e.g. https://example.com
    canonical_root: String,

    /// Media URL list; read when no API credentials exist, written otherwise
    #[arg(default_value = "media_list.txt")]
    media_list_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_FAILURE,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Load .env file if present
    let _ = dotenvy::dotenv();

    if let Err(e) = init_tracing() {
        eprintln!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }

    let Ok(user_id) = cli.user_id.trim().parse::<i64>() else {
        error!(user_id = %cli.user_id, "USER_ID must be an integer");
        std::process::exit(EXIT_BAD_USER_ID);
    };

    if let Err(e) = run(cli, user_id).await {
        error!("Fatal error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli, user_id: i64) -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    let credentials = Credentials::load_optional(&config.credentials_path);
    if credentials.is_none() {
        warn!(
            path = %cli.media_list_path.display(),
            "No API credentials; reading the media list instead of scanning the archive"
        );
    }

    let args = RunArgs {
        archive_path: cli.archive_path,
        user_id,
        canonical_root: cli.canonical_root,
        media_list_path: cli.media_list_path,
    };

    let summary = pipeline::run(&config, &args, credentials).await?;
    info!(
        posts = summary.site.posts,
        months = summary.site.months,
        years = summary.site.years,
        media = summary.media,
        downloaded = summary.fetch.downloaded,
        failed = summary.fetch.failed,
        "Site generated"
    );

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bird_site=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
