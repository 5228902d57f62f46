use anyhow::Result;
use clap::Parser;
use rover_console::controller::HttpController;
use rover_console::input::{self, ConsoleInput, HELP};
use rover_console::video::{FrameFeed, FramePump, LogDisplay, MjpegReader};
use rover_console::{ConsoleConfig, RoverConsole};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use tracing::{info, error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "rover-console", about = "Drive a camera rover and replay recorded paths")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Motion controller address (overrides config)
    #[arg(long)]
    controller: Option<String>,

    /// MJPEG stream URL (overrides config)
    #[arg(long)]
    stream: Option<String>,

    /// Run without the video stream
    #[arg(long)]
    no_video: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(controller) = args.controller {
        config.controller.address = controller;
    }
    if let Some(stream) = args.stream {
        config.video.stream_url = stream;
    }
    config.validate()?;

    let shutdown = CancellationToken::new();
    let feed = Arc::new(FrameFeed::new());
    let controller = Arc::new(HttpController::new(&config.controller)?);

    info!("Rover console starting");
    info!("  Controller: {}", controller.address());
    info!("  Stream: {}", config.video.stream_url);

    let console = RoverConsole::new(controller, feed.clone(), &config);

    // Spawn video stream reader
    if args.no_video {
        warn!("Video disabled");
    } else {
        let reader = MjpegReader::new(&config.video, feed.clone())?;
        tokio::spawn(reader.run(shutdown.clone()));
    }

    // Spawn frame pump
    let pump = FramePump::new(feed, LogDisplay::default());
    let pump_task = tokio::spawn(pump.run(config.video.frame_period(), shutdown.clone()));

    println!("{}", HELP);

    // Main input loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match input::parse_line(&line) {
            Ok(Some(ConsoleInput::Quit)) => break,
            Ok(Some(command)) => handle_input(&console, command).await,
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }

    console.shutdown();
    shutdown.cancel();
    if let Err(e) = pump_task.await {
        error!("Frame pump task failed: {}", e);
    }
    info!("Rover console stopped");
    Ok(())
}

async fn handle_input(console: &RoverConsole, command: ConsoleInput) {
    match command {
        ConsoleInput::Move(direction) => {
            console.issue(direction).await;
        }
        ConsoleInput::ToggleRecord => {
            let state = console.toggle_recording().await;
            info!("Recorder: {:?}", state);
        }
        ConsoleInput::StartRecord => console.start_recording().await,
        ConsoleInput::StopRecord => {
            console.stop_recording().await;
        }
        ConsoleInput::Reset => console.reset_path().await,
        ConsoleInput::Replay => match console.replay().await {
            // The replay task reports its own progress
            Ok(_handle) => info!("Replay started"),
            Err(e) => warn!("Replay rejected: {}", e),
        },
        ConsoleInput::CancelReplay => console.cancel_replay(),
        ConsoleInput::Capture(path) => {
            if let Err(e) = console.capture_still(path).await {
                warn!("Capture failed: {:#}", e);
            }
        }
        ConsoleInput::Status => info!("{}", console.status().await),
        ConsoleInput::Help => println!("{}", HELP),
        ConsoleInput::Quit => {}
    }
}
