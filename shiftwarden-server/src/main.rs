mod infra;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use shiftwarden_config::Config;
use shiftwarden_core::expiry::{ExpiryTrigger, RunOutcome, TriggerKind};
use shiftwarden_core::time::SystemClock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use infra::{database, startup, wiring};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "shiftwarden-server")]
#[command(about = "Notifies people and their HR contacts before shift assignments expire")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to shiftwarden.toml (overrides SHIFTWARDEN_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file to load before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Keep notifications in memory instead of writing them to the database
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a single expiry run, print its summary and exit
    RunOnce,
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = startup::load_runtime_config(cli.serve.config.clone(), cli.serve.env_file.clone())?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::RunOnce) => run_once(&config, &cli.serve).await,
        None => run_daemon(&config, &cli.serve).await,
    }
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = database::connect(database::primary_url(config)?, 1).await?;
    database::migrate(&pool).await
}

async fn build_trigger(config: &Config, args: &ServeArgs) -> anyhow::Result<ExpiryTrigger> {
    let pool = database::connect(
        database::primary_url(config)?,
        config.database.max_connections,
    )
    .await?;
    if !args.dry_run {
        database::migrate(&pool).await?;
    }

    let stores = wiring::postgres_stores(config, pool, args.dry_run).await;
    let clock = Arc::new(SystemClock);
    let job = wiring::build_job(config, stores, clock.clone())?;
    Ok(ExpiryTrigger::new(job, wiring::trigger_schedule(config), clock))
}

async fn run_once(config: &Config, args: &ServeArgs) -> anyhow::Result<()> {
    let trigger = build_trigger(config, args).await?;
    let outcome = trigger
        .fire(TriggerKind::Manual)
        .await
        .ok_or_else(|| anyhow!("expiry run aborted"))?;

    match outcome {
        RunOutcome::AlreadyRunning => warn!("Expiry run already in progress"),
        RunOutcome::Completed(summary) => {
            let rendered =
                serde_json::to_string_pretty(&summary).context("failed to render run summary")?;
            println!("{rendered}");
        }
    }
    Ok(())
}

async fn run_daemon(config: &Config, args: &ServeArgs) -> anyhow::Result<()> {
    let trigger = build_trigger(config, args).await?;
    let shutdown = CancellationToken::new();
    let handle = trigger.spawn(shutdown.clone());

    info!(
        lead_days = config.notifications.lead_days,
        daily_at = %config.schedule.daily_at,
        zone = %wiring::calendar_zone(config),
        dry_run = args.dry_run,
        "shiftwarden started"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    shutdown.cancel();
    handle.await.context("expiry trigger task failed")?;
    Ok(())
}
