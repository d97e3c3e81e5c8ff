//! crates/guessing_game_core/src/ports.rs
//!
//! Defines the service contracts (traits) the game depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! engine independent of where sessions and scores actually live.

use async_trait::async_trait;
use rand::Rng;

use crate::domain::{GameSession, NewScore, ScoreRecord, SessionId, SECRET_RANGE};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific errors of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("Stored data could not be decoded: {0}")]
    Corrupt(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Ephemeral per-player game state, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the player's game, or `None` if there is none (or it expired).
    async fn load(&self, id: &SessionId) -> PortResult<Option<GameSession>>;

    /// Stores `session` under `id`, replacing any previous game and
    /// refreshing its expiry.
    async fn save(&self, id: &SessionId, session: &GameSession) -> PortResult<()>;

    /// Clears the player's game. Destroying a missing session is not an error.
    async fn destroy(&self, id: &SessionId) -> PortResult<()>;

    /// Drops every expired session and returns how many were removed.
    async fn purge_expired(&self) -> PortResult<u64>;
}

/// Durable, append-only record of won games.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Records a won game. Inserting a second score for the same `game_id`
    /// stores nothing and returns the record already kept for that game.
    async fn insert(&self, score: NewScore) -> PortResult<ScoreRecord>;

    /// The best `limit` scores: fewest attempts first, oldest first on ties.
    async fn top_scores(&self, limit: usize) -> PortResult<Vec<ScoreRecord>>;
}

//=========================================================================================
// Secret Source
//=========================================================================================

/// Where new games get their secret number from.
pub trait SecretSource: Send + Sync {
    fn draw(&self) -> u32;
}

/// Draws uniformly from `SECRET_RANGE` using the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSecret;

impl SecretSource for RandomSecret {
    fn draw(&self) -> u32 {
        rand::rng().random_range(SECRET_RANGE)
    }
}

/// Always yields the same number. Useful for scripted games.
#[derive(Debug, Clone, Copy)]
pub struct FixedSecret(pub u32);

impl SecretSource for FixedSecret {
    fn draw(&self) -> u32 {
        self.0
    }
}
