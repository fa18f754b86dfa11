//! CLI parser, config loading and handler wiring.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use group_bot::{GroupBot, GroupBotParams};
use multi_bot::{MultiBot, DEFAULT_MAX_CONCURRENCY};
use multibot_telegram::TelegramConfig;
use storage::GroupStore;

/// SQLite file used when neither `--db` nor DATABASE_URL is given.
pub const DEFAULT_DATABASE_URL: &str = "multibot.db";

#[derive(Parser, Debug)]
#[command(name = "multibot")]
#[command(about = "Telegram MultiBot CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Telegram bot (config from env; flags override it).
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Bot token; overrides BOT_TOKEN.
    #[arg(short, long)]
    pub token: Option<String>,

    /// SQLite database holding the groups.
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub db: String,

    /// Answer malformed, unauthorized and failed commands instead of staying silent.
    #[arg(long, env = "RESPOND_ALL_COMMANDS")]
    pub respond_all_commands: bool,

    /// How many handlers may run at once for one message.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Debug logging.
    #[arg(long = "dbg", env = "DEBUG")]
    pub debug: bool,
}

/// Loads the Telegram config from the environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<TelegramConfig> {
    TelegramConfig::load(token)
}

/// Registers every handler of this bot with a dispatcher sized by the run flags.
pub fn build_multi_bot(args: &RunArgs, store: Arc<dyn GroupStore>) -> MultiBot {
    let group_bot = GroupBot::new(GroupBotParams {
        store,
        respond_all_commands: args.respond_all_commands,
        chat_members: None,
    });

    MultiBot::new()
        .with_max_concurrency(args.max_concurrency)
        .add_handler(Arc::new(group_bot))
}
