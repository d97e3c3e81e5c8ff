//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the game endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::protocol::{
    GuessRequest, HealthResponse, MessageResponse, ScoreResponse, StartRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use guessing_game_core::{start_game, submit_guess, GameError, GuessOutcome, SessionId};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::OpenApi;

/// How many rows `GET /scores` returns.
pub const TOP_SCORES_LIMIT: usize = 10;

type MessageReply = (StatusCode, Json<MessageResponse>);

/// Renders a body the JSON extractor refused in the same shape as every
/// other game reply, keeping the extractor's status (400, 415 or 422).
fn rejected_body(rejection: JsonRejection) -> MessageReply {
    debug!("Rejected body: {}", rejection.body_text());
    (
        rejection.status(),
        Json(MessageResponse::new(rejection.body_text())),
    )
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        start_handler,
        guess_handler,
        scores_handler,
        health_handler,
    ),
    components(
        schemas(StartRequest, GuessRequest, MessageResponse, ScoreResponse, HealthResponse)
    ),
    tags(
        (name = "Guessing Game API", description = "Start games, submit guesses, and read the leaderboard.")
    )
)]
pub struct ApiDoc;

/// The OpenAPI document for every game route, pretty-printed.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

//=========================================================================================
// Game Handlers
//=========================================================================================

/// Start a new game, replacing any game already in progress.
#[utoipa::path(
    post,
    path = "/start",
    request_body = StartRequest,
    responses(
        (status = 200, description = "Game started, or the difficulty was not recognized", body = MessageResponse),
        (status = 400, description = "The body is not valid JSON", body = MessageResponse),
        (status = 415, description = "The body is not sent as application/json", body = MessageResponse),
        (status = 500, description = "Session store unavailable", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(session = %session_id))]
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<MessageReply, ApiError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return Ok(rejected_body(rejection)),
    };

    let session = match start_game(req.difficulty(), state.secrets.as_ref()) {
        Ok(session) => session,
        Err(e @ GameError::InvalidDifficulty(_)) => {
            debug!("Rejected start: {:?}", e);
            return Ok((StatusCode::OK, Json(MessageResponse::new(e.to_string()))));
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    let _guard = state.locks.acquire(&session_id).await;
    state.sessions.save(&session_id, &session).await?;
    info!(difficulty = %session.difficulty, "Game started");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::with_attempts(
            format!("Game started ({})", session.difficulty),
            session.attempts_left,
        )),
    ))
}

/// Submit a guess for the game in progress.
#[utoipa::path(
    post,
    path = "/guess",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Win, loss, hint, or a request to start a game first", body = MessageResponse),
        (status = 400, description = "The guess is not a whole number from 1 to 100, or the body is not valid JSON", body = MessageResponse),
        (status = 415, description = "The body is not sent as application/json", body = MessageResponse),
        (status = 500, description = "Session or score store unavailable", body = MessageResponse)
    )
)]
#[instrument(skip_all, fields(session = %session_id))]
pub async fn guess_handler(
    State(state): State<Arc<AppState>>,
    Extension(session_id): Extension<SessionId>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<MessageReply, ApiError> {
    let _guard = state.locks.acquire(&session_id).await;
    let current = state.sessions.load(&session_id).await?;

    // Without a game the player is told to start one, whatever the body was.
    let req = match payload {
        Ok(Json(req)) => Some(req),
        Err(rejection) if current.is_some() => return Ok(rejected_body(rejection)),
        Err(_) => None,
    };
    let guess = req.as_ref().and_then(|req| req.guess.as_ref());

    let outcome = match submit_guess(current, guess) {
        Ok(outcome) => outcome,
        Err(e @ GameError::NoActiveGame) => {
            return Ok((StatusCode::OK, Json(MessageResponse::new(e.to_string()))));
        }
        Err(e @ GameError::InvalidGuess(_)) => {
            debug!("Rejected guess: {:?}", e);
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new(e.to_string())),
            ));
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    let message = outcome.to_string();
    let body = match outcome {
        GuessOutcome::Win {
            total_attempts,
            score,
        } => {
            // Score first, then drop the game. A failed insert leaves the
            // session at its pre-guess state; a failed destroy leaves it
            // winnable again, and the retried insert is a no-op for this game.
            let record = state.scores.insert(score).await?;
            state.sessions.destroy(&session_id).await?;
            info!(attempts = total_attempts, score_id = %record.id, "Game won");
            MessageResponse::new(message)
        }
        GuessOutcome::Loss { secret_number } => {
            state.sessions.destroy(&session_id).await?;
            info!(secret_number, "Game lost");
            MessageResponse::new(message)
        }
        GuessOutcome::Continue {
            hint,
            attempts_left,
            session,
        } => {
            state.sessions.save(&session_id, &session).await?;
            debug!(?hint, attempts_left, "Guess missed");
            MessageResponse::with_attempts(message, attempts_left)
        }
    };

    Ok((StatusCode::OK, Json(body)))
}

//=========================================================================================
// Read-only Handlers
//=========================================================================================

/// The best games so far, fewest attempts first.
#[utoipa::path(
    get,
    path = "/scores",
    responses(
        (status = 200, description = "Up to ten scores", body = [ScoreResponse]),
        (status = 500, description = "Score store unavailable", body = MessageResponse)
    )
)]
pub async fn scores_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScoreResponse>>, ApiError> {
    let scores = state.scores.top_scores(TOP_SCORES_LIMIT).await?;
    Ok(Json(scores.into_iter().map(ScoreResponse::from).collect()))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
