//! # potd-server
//!
//! Serves "the picture of the day for date D" over HTTP and from the command
//! line.
//!
//! - `serve` (default): the axum HTTP surface.
//! - `fetch <date>`: run the full pipeline once and print the view as JSON.
//! - `cache list|clear`: inspect or wipe the local asset cache.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use potd_core::{Clock, FixedClock, SystemClock};
use potd_model::{PictureViewResponse, parse_day_key};
use potd_server::{
    AppState, create_app,
    infra::{
        config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions},
        startup::build_picture_service,
    },
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "potd-server")]
#[command(about = "Picture-of-the-day resolver with walk-back retries and a local asset cache")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct GlobalArgs {
    /// Path to a potd.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_cli_date)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Resolve, walk back if needed, cache and print one day
    Fetch {
        /// Requested date (YYYY-MM-DD)
        date: String,
    },
    /// Operate on the local asset cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum CacheCommand {
    /// List cached dates
    List,
    /// Delete every cached asset
    Clear,
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    parse_day_key(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,potd_core=info,tower_http=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_runtime_config(&cli.global)?;
    let clock: Arc<dyn Clock> = match cli.global.today {
        Some(today) => {
            info!(%today, "clock pinned from the command line");
            Arc::new(FixedClock(today))
        }
        None => Arc::new(SystemClock),
    };

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_server(config, clock, args).await,
        Command::Fetch { date } => run_fetch(config, clock, &date).await,
        Command::Cache(command) => run_cache(config, clock, command).await,
    }
}

fn load_runtime_config(args: &GlobalArgs) -> anyhow::Result<Config> {
    let ConfigLoad { config, warnings } =
        ConfigLoader::with_options(ConfigLoaderOptions {
            config_path: args.config.clone(),
            env_file: args.env_file.clone(),
        })
        .load()
        .context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    Ok(config)
}

async fn run_server(
    mut config: Config,
    clock: Arc<dyn Clock>,
    args: ServeArgs,
) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let service = build_picture_service(&config, clock)?;
    let addr = config.bind_address();
    let router = create_app(AppState::new(service, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting picture-of-the-day server on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server stopped");
    Ok(())
}

async fn run_fetch(
    config: Config,
    clock: Arc<dyn Clock>,
    raw_date: &str,
) -> anyhow::Result<()> {
    let requested = parse_day_key(raw_date)
        .with_context(|| format!("invalid date {raw_date:?}"))?;
    let service = build_picture_service(&config, clock)?;

    let (view, preload) = service.view_tracked(requested).await;
    // Let the neighbors land in the cache before the process exits.
    preload.join().await;
    let view = view.with_context(|| format!("no picture for {requested}"))?;

    let response = PictureViewResponse::from(view);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_cache(
    config: Config,
    clock: Arc<dyn Clock>,
    command: CacheCommand,
) -> anyhow::Result<()> {
    let service = build_picture_service(&config, clock)?;
    let cache = service.cache();

    match command {
        CacheCommand::List => {
            let dates = cache.cached_dates().await?;
            for date in &dates {
                println!("{date}\t{}", cache.local_path(*date).display());
            }
            info!(count = dates.len(), root = %config.cache.root.display(), "cache listed");
        }
        CacheCommand::Clear => {
            let removed = cache.clear().await?;
            println!("removed {removed} cached assets");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
