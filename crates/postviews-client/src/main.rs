//! postviews-client - count post views from the command line.
//!
//! Keeps last-viewed timestamps in a JSON state file so that the cooldown
//! holds across invocations.

use clap::{Parser, Subcommand};
use postviews_client::{FileStorage, ViewClient, ViewGate, ViewTracker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// postviews client - count post views against a gateway
#[derive(Parser)]
#[command(name = "postviews-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the gateway
    #[arg(long, env = "POSTVIEWS_ENDPOINT", default_value = "http://localhost:3000")]
    endpoint: String,

    /// File holding last-viewed timestamps
    #[arg(long, env = "POSTVIEWS_STATE_FILE", default_value = "postviews-state.json")]
    state_file: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "POSTVIEWS_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Local cooldown between counted views of one post, in seconds
    #[arg(long, env = "POSTVIEWS_COOLDOWN_SECS", default_value_t = 1800)]
    cooldown_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count a view of a post, honouring the grace delay and cooldown
    View {
        /// Post identifier
        post_id: String,

        /// Send immediately instead of waiting out the grace delay
        #[arg(long)]
        no_grace: bool,
    },

    /// Report whether a view of a post would be counted now
    Check {
        /// Post identifier
        post_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "postviews_client=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let storage = Arc::new(FileStorage::new(&cli.state_file));
    let gate =
        Arc::new(ViewGate::new(storage).with_cooldown(Duration::from_secs(cli.cooldown_secs)));

    match cli.command {
        Commands::Check { post_id } => {
            let eligible = gate.should_count_view(&post_id);
            println!("{post_id}: {}", if eligible { "would count" } else { "in cooldown" });
        }
        Commands::View { post_id, no_grace } => {
            let client = Arc::new(ViewClient::with_timeout(
                &cli.endpoint,
                gate,
                Duration::from_secs(cli.timeout_secs),
            )?);

            let counted = if no_grace {
                client.increment_post_views(&post_id).await
            } else {
                match ViewTracker::new(client).track(&post_id) {
                    Some(view) => view.finished().await.unwrap_or(false),
                    None => false,
                }
            };

            println!("{post_id}: {}", if counted { "counted" } else { "not counted" });
        }
    }

    Ok(())
}
