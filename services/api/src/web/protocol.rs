//! services/api/src/web/protocol.rs
//!
//! Defines the JSON bodies exchanged between the browser client and the API server.

use chrono::{DateTime, Utc};
use guessing_game_core::{GuessInput, ScoreRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Bodies Sent FROM the Client TO the Server
//=========================================================================================

/// Body of `POST /start`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct StartRequest {
    /// One of `easy`, `medium`, `hard`. Anything else is answered with
    /// "Invalid difficulty".
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "easy")]
    pub difficulty: Option<serde_json::Value>,
}

impl StartRequest {
    /// The requested difficulty as text; non-string values become empty.
    pub fn difficulty(&self) -> &str {
        self.difficulty
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }
}

/// Body of `POST /guess`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct GuessRequest {
    /// A whole number from 1 to 100, either as a JSON number or a numeric string.
    #[serde(default)]
    #[schema(value_type = Option<u32>, example = 42)]
    pub guess: Option<GuessInput>,
}

//=========================================================================================
// Bodies Sent FROM the Server TO the Client
//=========================================================================================

/// The reply to every game action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    /// Present while a game is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<u32>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts_left: None,
        }
    }

    pub fn with_attempts(message: impl Into<String>, attempts_left: u32) -> Self {
        Self {
            message: message.into(),
            attempts_left: Some(attempts_left),
        }
    }
}

/// One row of the leaderboard.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ScoreResponse {
    pub id: Uuid,
    #[schema(example = "easy")]
    pub difficulty: String,
    pub attempts: u32,
    pub date: DateTime<Utc>,
}

impl From<ScoreRecord> for ScoreResponse {
    fn from(record: ScoreRecord) -> Self {
        Self {
            id: record.id,
            difficulty: record.difficulty.to_string(),
            attempts: record.attempts,
            date: record.date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attempts_left_is_omitted_when_absent() {
        let body = serde_json::to_value(MessageResponse::new("Start game first!")).unwrap();
        assert_eq!(body, json!({ "message": "Start game first!" }));

        let body = serde_json::to_value(MessageResponse::with_attempts("Too Low", 4)).unwrap();
        assert_eq!(body, json!({ "message": "Too Low", "attemptsLeft": 4 }));
    }

    #[test]
    fn start_request_tolerates_missing_or_odd_difficulty() {
        let req: StartRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.difficulty(), "");
        let req: StartRequest = serde_json::from_value(json!({ "difficulty": 3 })).unwrap();
        assert_eq!(req.difficulty(), "");
        let req: StartRequest = serde_json::from_value(json!({ "difficulty": "hard" })).unwrap();
        assert_eq!(req.difficulty(), "hard");
    }

    #[test]
    fn guess_request_accepts_any_json_value() {
        let req: GuessRequest = serde_json::from_value(json!({ "guess": "12" })).unwrap();
        assert_eq!(req.guess.unwrap().parse(), Ok(12));
        let req: GuessRequest = serde_json::from_value(json!({ "guess": null })).unwrap();
        assert!(req.guess.is_none());
        let req: GuessRequest = serde_json::from_value(json!({ "guess": false })).unwrap();
        assert!(req.guess.unwrap().parse().is_err());
    }
}
