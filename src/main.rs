use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::io;

mod aggregate;
mod config;
mod dashboard;
mod loader;
mod notion;
mod output;
mod record;
mod telemetry;
mod util;

use dashboard::{RetryPolicy, Session, View};
use loader::Loader;
use notion::NotionSource;
use output::Emitter;
use output::config::OutputConfig;

#[derive(Parser)]
#[command(name = "subtrack", about = "Subscription dashboard backed by a Notion database")]
struct Cli {
    /// Notion integration token (falls back to NOTION_TOKEN)
    #[arg(global = true, long)]
    token: Option<String>,
    /// Notion database id (falls back to NOTION_DATABASE_ID)
    #[arg(global = true, long)]
    database: Option<String>,
    /// Treat this date (YYYY-MM-DD) as today
    #[arg(global = true, long)]
    today: Option<String>,
    /// Automatic reloads after a failed load before giving up
    #[arg(global = true, long, default_value_t = 0)]
    retries: u32,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cards, action items and the full table
    Summary(dashboard::WindowCmd),
    /// Renewals due within the window
    Upcoming(dashboard::WindowCmd),
    /// Subscriptions flagged as needing action
    Actions,
    /// Every subscription
    Ls,
    /// Reload and re-render the summary on an interval
    Watch(dashboard::WatchCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // initialize logging/tracing (stderr). Respect RUST_LOG and SUBTRACK_LOG_FORMAT
    telemetry::config::init_tracing();

    let today = util::time::parse_today_opt(&cli.today)?;

    let notion_cfg = config::NotionConfig::from_env().with_overrides(cli.token, cli.database);
    notion_cfg.validate()?;
    let source = NotionSource::new(notion_cfg).context("build Notion client")?;

    let session = Session {
        loader: Loader::new(source),
        emitter: Emitter::from_config(OutputConfig::from_env().with_json_flag(cli.json)),
        today,
        retry: RetryPolicy::from_terminal(cli.retries),
    };

    let mut out = io::stdout();
    match cli.command {
        Commands::Summary(args) => dashboard::run(&session, View::Summary { days: args.days }, &mut out).await?,
        Commands::Upcoming(args) => dashboard::run(&session, View::Upcoming { days: args.days }, &mut out).await?,
        Commands::Actions => dashboard::run(&session, View::Actions, &mut out).await?,
        Commands::Ls => dashboard::run(&session, View::List, &mut out).await?,
        Commands::Watch(args) => dashboard::watch(session, args, &mut out).await?,
    }

    Ok(())
}
