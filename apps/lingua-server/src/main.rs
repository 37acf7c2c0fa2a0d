use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use i18n::I18nModule;
use i18n::config::I18nConfig;
use lingua_db::Db;
use lingua_kit::{AppConfig, CliOverrides, RestHost, logging, serve, wait_for_shutdown};

/// Lingua - localization service for entity property translations
#[derive(Parser)]
#[command(name = "lingua-server")]
#[command(about = "Lingua - localization service for entity property translations")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load_layered(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    });
    config.validate()?;

    logging::init_logging(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Lingua server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Migrate => migrate(&config).await,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let i18n: I18nConfig = config.module_config(i18n::MODULE_NAME)?;
    i18n.validate().map_err(anyhow::Error::msg)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn migrate(config: &AppConfig) -> Result<()> {
    let db = Db::connect(&config.database)
        .await
        .context("database connection failed")?;
    let report = I18nModule::migrate(&db).await?;
    println!("Applied {} migration(s)", report.applied.len());
    for name in &report.applied {
        println!("  {name}");
    }
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let config = Arc::new(config);
    let db = Db::connect(&config.database)
        .await
        .context("database connection failed")?;

    if config.database.auto_migrate {
        I18nModule::migrate(&db).await?;
    } else {
        tracing::info!("auto_migrate disabled; expecting an up-to-date schema");
    }

    tracing::info!("Initializing modules...");
    let i18n = I18nModule::new();
    i18n.init(&config, db.clone()).await?;

    let router = RestHost::new(Arc::clone(&config), db).build_router(&[&i18n])?;

    serve(router, &config.server.bind_addr, async {
        if let Err(e) = wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handling failed; shutting down");
        }
    })
    .await
}
