//! multibot CLI: runs the Telegram bot. Config from env and optional CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use multibot_cli::{build_multi_bot, load_config, Cli, Commands, RunArgs};
use multibot_core::init_tracing;
use multibot_telegram::run_repl;
use storage::SqliteGroupStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = load_config(args.token.clone())?;
    init_tracing(config.log_file.as_deref(), args.debug)?;

    info!(
        database_url = %args.db,
        respond_all_commands = args.respond_all_commands,
        max_concurrency = args.max_concurrency,
        "Initializing bot"
    );

    let store = SqliteGroupStore::new(&args.db)
        .await
        .with_context(|| format!("Open group database {}", args.db))?;
    let multi_bot = build_multi_bot(&args, Arc::new(store));

    info!(handlers = multi_bot.len(), "Bot started successfully");

    run_repl(config.build_bot(), multi_bot, config.dispatch_timeout).await
}
