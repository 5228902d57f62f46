mod controller;

use clap::Parser;
use controller::{router, SimConfig, SimState};
use rover_shared::Direction;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "controller-sim", about = "Simulated rover motion controller")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8081")]
    bind: String,

    /// Delay before answering each move, in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Directions to answer with 503 (repeatable)
    #[arg(long)]
    reject: Vec<Direction>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let state = SimState::new(SimConfig {
        latency: Duration::from_millis(args.latency_ms),
        reject: args.reject.into_iter().collect(),
    });

    let listener = TcpListener::bind(&args.bind).await?;
    info!("Controller simulator listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
