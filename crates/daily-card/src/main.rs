mod card;
mod clock;
mod config;
mod quote;
mod version;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{error, info};

use crate::{
    card::{CardDatabase, DailyCardRunner, DryRun, NotionClient},
    clock::ResolvedDate,
    config::{NotionCredentials, open_config, write_default_config},
    version::{SHORT_VERSION, TARGET_TRIPLE, USER_AGENT},
};

#[derive(Parser)]
#[command(version = SHORT_VERSION, about = "Create today's habit card in a Notion database")]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Write a default configuration file and exit
    #[arg(long)]
    init: bool,

    /// Build the card but do not create it
    #[arg(long)]
    dry_run: bool,

    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: Option<String>,

    #[arg(long, env = "NOTION_DATABASE_ID")]
    database_id: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Failed to create daily card");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    if args.init {
        write_default_config(&args.config)?;
        info!(path = ?args.config, "Created default configuration");
        return Ok(());
    }

    info!(version = SHORT_VERSION, target = TARGET_TRIPLE, "daily-card version");

    let config = open_config(&args.config).context("Failed to load configuration")?;
    let credentials = NotionCredentials::new(args.notion_token, args.database_id)?;
    info!(
        timezone = %config.timezone,
        quote_provider = ?config.quote.provider,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(config.http.timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")?;

    let notion = NotionClient::new(&credentials)?;
    let database: Box<dyn CardDatabase> = if args.dry_run {
        Box::new(DryRun::new(notion))
    } else {
        Box::new(notion)
    };
    let quotes = quote::quote_source(config.quote.provider, http);

    let today = ResolvedDate::now(config.timezone);
    DailyCardRunner::new(database.as_ref(), quotes.as_ref(), &config)
        .run(today)
        .await?;

    Ok(())
}
