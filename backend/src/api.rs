//! HTTP routes for playing against and training the agent
//!
//! The game position travels with every request as a FEN string, so the
//! server holds no per-game state. Only the shared Q-table lives here.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chess_agent::{ActionId, AgentError, AgentStats, ChessAgent, RulesEngine, TableStats};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Episodes per `/train_ai` call when the request leaves it out
pub const DEFAULT_TRAINING_GAMES: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ChessAgent>,
}

#[derive(Debug, Serialize)]
pub struct NewGameResponse {
    pub fen: String,
    pub legal_moves: Vec<ActionId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MakeMoveRequest {
    /// Position before the human move; the initial position when absent
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(rename = "move", default)]
    pub mv: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MakeMoveResponse {
    pub fen: String,
    pub ai_move: Option<ActionId>,
    pub legal_moves: Vec<ActionId>,
    pub game_over: bool,
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    #[serde(default = "default_training_games")]
    pub num_games: usize,
}

impl Default for TrainRequest {
    fn default() -> Self {
        Self {
            num_games: DEFAULT_TRAINING_GAMES,
        }
    }
}

fn default_training_games() -> usize {
    DEFAULT_TRAINING_GAMES
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: String,
    pub training_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoadModelResponse {
    pub states: usize,
    pub entries: usize,
}

impl From<TableStats> for LoadModelResponse {
    fn from(stats: TableStats) -> Self {
        Self {
            states: stats.states,
            entries: stats.entries,
        }
    }
}

/// Errors surfaced to HTTP clients as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No move provided")]
    MissingMove,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingMove => StatusCode::BAD_REQUEST,
            ApiError::Agent(err) => match err {
                AgentError::InvalidAction { .. } | AgentError::InvalidPosition { .. } => {
                    StatusCode::BAD_REQUEST
                }
                AgentError::TerminalState { .. } => StatusCode::CONFLICT,
                AgentError::SnapshotFormat(_) | AgentError::UnsupportedSnapshotVersion { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AgentError::Persistence(_) | AgentError::Config { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("[API] {}", self);
        } else {
            warn!("[API] Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(agent: Arc<ChessAgent>) -> Router {
    let state = AppState { agent };

    Router::new()
        .route("/new_game", post(new_game))
        .route("/make_move", post(make_move))
        .route("/train_ai", post(train_ai))
        .route("/model", get(export_model).put(import_model))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn new_game(State(state): State<AppState>) -> Json<NewGameResponse> {
    let agent = &state.agent;
    let pos = agent.new_game();
    Json(NewGameResponse {
        fen: agent.rules().to_fen(&pos),
        legal_moves: agent.legal_moves(&pos),
    })
}

async fn make_move(
    State(state): State<AppState>,
    Json(payload): Json<MakeMoveRequest>,
) -> Result<Json<MakeMoveResponse>, ApiError> {
    let agent = &state.agent;
    let rules = agent.rules();

    let pos = match payload.fen.as_deref() {
        Some(fen) => rules
            .from_fen(fen)
            .ok_or_else(|| AgentError::InvalidPosition {
                fen: fen.to_string(),
            })?,
        None => agent.new_game(),
    };
    let mv = payload.mv.ok_or(ApiError::MissingMove)?;

    let after_human = agent.apply_human_move(&pos, &mv)?;

    let (pos, ai_move) = if agent.status(&after_human).is_over() {
        (after_human, None)
    } else {
        let reply = agent.agent_respond(&after_human)?;
        (reply.position, Some(reply.action))
    };

    let status = agent.status(&pos);
    Ok(Json(MakeMoveResponse {
        fen: rules.to_fen(&pos),
        ai_move,
        legal_moves: agent.legal_moves(&pos),
        game_over: status.is_over(),
        result: status.result_message(),
    }))
}

async fn train_ai(
    State(state): State<AppState>,
    payload: Option<Json<TrainRequest>>,
) -> Json<TrainResponse> {
    let Json(request) = payload.unwrap_or_default();
    let handle = state.agent.start_training(request.num_games);
    info!(
        "[API] Training {} started for {} games",
        handle.id(),
        request.num_games
    );

    Json(TrainResponse {
        status: "Training started".to_string(),
        training_id: handle.id(),
    })
}

async fn export_model(State(state): State<AppState>) -> Result<Response, ApiError> {
    let blob = state.agent.persist()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], blob).into_response())
}

async fn import_model(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoadModelResponse>, ApiError> {
    let stats = state.agent.load(&body)?;
    Ok(Json(stats.into()))
}

async fn status(State(state): State<AppState>) -> Json<AgentStats> {
    Json(state.agent.stats())
}
