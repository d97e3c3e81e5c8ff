//! crates/guessing_game_core/src/domain.rs
//!
//! Defines the pure, core data structures for the game.
//! These structs are independent of any database or web framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use uuid::Uuid;

use crate::engine::GameError;

/// The inclusive range every secret number (and every valid guess) falls in.
pub const SECRET_RANGE: RangeInclusive<u32> = 1..=100;

//=========================================================================================
// Difficulty
//=========================================================================================

/// The game mode, which fixes how many guesses a player gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Total guesses allowed for this difficulty.
    pub fn attempt_budget(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 5,
            Difficulty::Hard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    // Matching is exact: "Easy" or " easy" are not recognized keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| GameError::InvalidDifficulty(s.to_string()))
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

/// Opaque identifier of a player's session, carried by the client in a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The state of one in-progress game, owned by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Identifies this game; a score is recorded at most once per game id.
    pub game_id: Uuid,
    pub secret_number: u32,
    pub attempts_left: u32,
    pub total_attempts: u32,
    pub difficulty: Difficulty,
}

impl GameSession {
    /// Builds a fresh session for `difficulty` around a known secret.
    pub fn new(difficulty: Difficulty, secret_number: u32) -> Result<Self, GameError> {
        if !SECRET_RANGE.contains(&secret_number) {
            return Err(GameError::SecretOutOfRange(secret_number));
        }
        Ok(Self {
            game_id: Uuid::new_v4(),
            secret_number,
            attempts_left: difficulty.attempt_budget(),
            total_attempts: 0,
            difficulty,
        })
    }
}

//=========================================================================================
// Scores
//=========================================================================================

/// The payload for a score insert; the store assigns the id and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub game_id: Uuid,
    pub difficulty: Difficulty,
    pub attempts: u32,
}

/// A persisted record of a won game. Never updated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub game_id: Uuid,
    pub difficulty: Difficulty,
    pub attempts: u32,
    pub date: DateTime<Utc>,
}

impl ScoreRecord {
    /// Stamps a `NewScore` with a fresh id and the current time.
    pub fn from_new(score: NewScore) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id: score.game_id,
            difficulty: score.difficulty,
            attempts: score.attempts,
            date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_follow_difficulty() {
        assert_eq!(Difficulty::Easy.attempt_budget(), 10);
        assert_eq!(Difficulty::Medium.attempt_budget(), 5);
        assert_eq!(Difficulty::Hard.attempt_budget(), 3);
    }

    #[test]
    fn difficulty_parses_lowercase_keys_only() {
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!(matches!(
            "Medium".parse::<Difficulty>(),
            Err(GameError::InvalidDifficulty(s)) if s == "Medium"
        ));
        assert!("".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_serializes_as_lowercase() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
    }

    #[test]
    fn session_rejects_secret_outside_range() {
        assert!(matches!(
            GameSession::new(Difficulty::Easy, 0),
            Err(GameError::SecretOutOfRange(0))
        ));
        assert!(GameSession::new(Difficulty::Easy, 101).is_err());
        let session = GameSession::new(Difficulty::Hard, 100).unwrap();
        assert_eq!(session.attempts_left, 3);
        assert_eq!(session.total_attempts, 0);
    }

    #[test]
    fn every_game_gets_its_own_id() {
        let a = GameSession::new(Difficulty::Easy, 10).unwrap();
        let b = GameSession::new(Difficulty::Easy, 10).unwrap();
        assert_ne!(a.game_id, b.game_id);
    }
}
