//! Simulated motion controller

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use rover_shared::codec::MOVE_PATH;
use rover_shared::Direction;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Behaviour knobs for the simulator
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// Delay before answering each move
    pub latency: Duration,
    /// Directions answered with 503 instead of 200
    pub reject: HashSet<Direction>,
}

/// Query string of a move request: ?direction=up
#[derive(Debug, Deserialize)]
pub struct MoveQuery {
    direction: Option<String>,
}

/// Shared state for the simulator routes
#[derive(Clone)]
pub struct SimState {
    config: Arc<SimConfig>,
    moves: Arc<Mutex<HashMap<Direction, u64>>>,
}

impl SimState {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config: Arc::new(config),
            moves: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Accepted move count for a direction
    pub fn count(&self, direction: Direction) -> u64 {
        self.moves
            .lock()
            .map(|moves| moves.get(&direction).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

/// Build the simulator's routes
pub fn router(state: SimState) -> Router {
    Router::new()
        .route(MOVE_PATH, get(handle_move))
        .route("/status", get(handle_status))
        .with_state(state)
}

async fn handle_move(
    State(state): State<SimState>,
    Query(query): Query<MoveQuery>,
) -> (StatusCode, String) {
    let direction = match query.direction.as_deref().map(str::parse::<Direction>) {
        Some(Ok(direction)) => direction,
        Some(Err(e)) => {
            warn!("Bad move request: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string());
        }
        None => {
            warn!("Move request without direction");
            return (StatusCode::BAD_REQUEST, "missing direction".into());
        }
    };

    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }

    if state.config.reject.contains(&direction) {
        warn!("Rejecting move {}", direction);
        return (StatusCode::SERVICE_UNAVAILABLE, format!("{} unavailable", direction));
    }

    if let Ok(mut moves) = state.moves.lock() {
        *moves.entry(direction).or_insert(0) += 1;
    }
    info!("MOVE {}", direction);
    (StatusCode::OK, format!("moving {}", direction))
}

async fn handle_status(State(state): State<SimState>) -> String {
    Direction::ALL
        .iter()
        .map(|d| format!("{}={}", d, state.count(*d)))
        .collect::<Vec<_>>()
        .join(" ")
}
