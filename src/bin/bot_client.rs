//! Headless bot client for the trail arena
//!
//! Joins the matchmaking queue and plays with the trail-avoiding steering
//! policy. Useful as a practice opponent and for exercising a live server.

use clap::Parser;
use tracing::info;

use trail_arena::client::GameClient;

#[derive(Parser, Debug)]
#[command(
    name = "trail-arena-bot",
    about = "Headless client for the trail arena server"
)]
struct Args {
    /// WebSocket endpoint of the arena server
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    server_url: String,

    /// Stop after this many rounds (default: play until the peer leaves)
    #[arg(long)]
    rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut client = GameClient::new(&args.server_url);
    if let Some(rounds) = args.rounds {
        client = client.with_rounds_limit(rounds);
    }

    let summary = client.run().await?;
    info!(
        rounds = summary.rounds_played,
        score_p1 = summary.scores.0,
        score_p2 = summary.scores.1,
        "Session finished"
    );
    Ok(())
}
