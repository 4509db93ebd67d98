mod dashboard;
mod feed;

use agrodash_core::{Actor, FeedSource, Role};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "agrodash")]
#[command(about = "Farm budget and marketplace dashboard client")]
struct Cli {
    /// User id or account email to act as (defaults to `AGRODASH_ACTOR`)
    #[arg(long, global = true)]
    actor: Option<Actor>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one aggregation cycle and print the dashboard state
    Dashboard {
        /// Also print the per-source report
        #[arg(long)]
        report: bool,
    },
    /// Print the merged alert and notification feed
    Feed {
        #[arg(long, default_value = "farmer")]
        role: Role,
    },
    /// Mark one feed item read
    Read {
        source: FeedSource,
        id: i64,
        #[arg(long, default_value = "farmer")]
        role: Role,
    },
    /// Dismiss one feed item
    Dismiss {
        source: FeedSource,
        id: i64,
        #[arg(long, default_value = "farmer")]
        role: Role,
    },
    /// Mark every unread feed item read
    ReadAll {
        #[arg(long, default_value = "farmer")]
        role: Role,
    },
    /// Print crop budget utilization
    Budget,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = agrodash_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let actor = cli
        .actor
        .or_else(|| config.default_actor.clone())
        .ok_or_else(|| anyhow::anyhow!("no actor given; pass --actor or set AGRODASH_ACTOR"))?;

    tracing::debug!(env = %config.env, command = ?cli.command, "starting");

    match cli.command {
        Commands::Dashboard { report } => dashboard::run_dashboard(&config, actor, report).await,
        Commands::Budget => dashboard::run_budget(&config, &actor).await,
        Commands::Feed { role } => feed::run_feed(&config, actor, role).await,
        Commands::Read { source, id, role } => {
            feed::run_mark_read(&config, actor, role, feed_key(source, id)).await
        }
        Commands::Dismiss { source, id, role } => {
            feed::run_dismiss(&config, actor, role, feed_key(source, id)).await
        }
        Commands::ReadAll { role } => feed::run_read_all(&config, actor, role).await,
    }
}

fn feed_key(source: FeedSource, id: i64) -> agrodash_core::FeedKey {
    agrodash_core::FeedKey { source, id }
}

/// Pretty-print any serializable value to stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
