//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `SessionStore` and `ScoreStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guessing_game_core::domain::{Difficulty, GameSession, NewScore, ScoreRecord, SessionId};
use guessing_game_core::ports::{PortError, PortResult, ScoreStore, SessionStore};
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use uuid::Uuid;

use super::expiry_from_now;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports on top of Postgres.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    session_ttl: Duration,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Persistence(e.to_string())
}

fn parse_difficulty(raw: &str) -> PortResult<Difficulty> {
    raw.parse()
        .map_err(|_| PortError::Corrupt(format!("unknown difficulty '{}'", raw)))
}

fn to_count(column: &str, value: i32) -> PortResult<u32> {
    u32::try_from(value)
        .map_err(|_| PortError::Corrupt(format!("negative {} ({})", column, value)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct GameSessionRecord {
    game_id: Uuid,
    secret_number: i32,
    attempts_left: i32,
    total_attempts: i32,
    difficulty: String,
}
impl GameSessionRecord {
    fn to_domain(self) -> PortResult<GameSession> {
        Ok(GameSession {
            game_id: self.game_id,
            secret_number: to_count("secret_number", self.secret_number)?,
            attempts_left: to_count("attempts_left", self.attempts_left)?,
            total_attempts: to_count("total_attempts", self.total_attempts)?,
            difficulty: parse_difficulty(&self.difficulty)?,
        })
    }
}

#[derive(FromRow)]
struct ScoreRecordRow {
    id: Uuid,
    game_id: Uuid,
    difficulty: String,
    attempts: i32,
    date: DateTime<Utc>,
}
impl ScoreRecordRow {
    fn to_domain(self) -> PortResult<ScoreRecord> {
        Ok(ScoreRecord {
            id: self.id,
            game_id: self.game_id,
            difficulty: parse_difficulty(&self.difficulty)?,
            attempts: to_count("attempts", self.attempts)?,
            date: self.date,
        })
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn load(&self, id: &SessionId) -> PortResult<Option<GameSession>> {
        let record = sqlx::query_as::<_, GameSessionRecord>(
            "SELECT game_id, secret_number, attempts_left, total_attempts, difficulty \
             FROM game_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(GameSessionRecord::to_domain).transpose()
    }

    async fn save(&self, id: &SessionId, session: &GameSession) -> PortResult<()> {
        let expires_at = expiry_from_now(self.session_ttl)?;
        sqlx::query(
            "INSERT INTO game_sessions \
                (id, game_id, secret_number, attempts_left, total_attempts, difficulty, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                game_id = EXCLUDED.game_id, \
                secret_number = EXCLUDED.secret_number, \
                attempts_left = EXCLUDED.attempts_left, \
                total_attempts = EXCLUDED.total_attempts, \
                difficulty = EXCLUDED.difficulty, \
                expires_at = EXCLUDED.expires_at",
        )
        .bind(id.as_str())
        .bind(session.game_id)
        .bind(session.secret_number as i32)
        .bind(session.attempts_left as i32)
        .bind(session.total_attempts as i32)
        .bind(session.difficulty.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> PortResult<()> {
        sqlx::query("DELETE FROM game_sessions WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn purge_expired(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM game_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}

//=========================================================================================
// `ScoreStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScoreStore for DbAdapter {
    async fn insert(&self, score: NewScore) -> PortResult<ScoreRecord> {
        // On a repeated game_id the no-op update hands back the stored row.
        let record = sqlx::query_as::<_, ScoreRecordRow>(
            "INSERT INTO scores (id, game_id, difficulty, attempts) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (game_id) DO UPDATE SET game_id = EXCLUDED.game_id \
             RETURNING id, game_id, difficulty, attempts, date",
        )
        .bind(Uuid::new_v4())
        .bind(score.game_id)
        .bind(score.difficulty.as_str())
        .bind(score.attempts as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn top_scores(&self, limit: usize) -> PortResult<Vec<ScoreRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = sqlx::query_as::<_, ScoreRecordRow>(
            "SELECT id, game_id, difficulty, attempts, date FROM scores \
             ORDER BY attempts ASC, date ASC, id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(ScoreRecordRow::to_domain).collect()
    }
}
