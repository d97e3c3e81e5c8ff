//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the store ports. Sessions can be kept
//! here instead of Postgres (`SESSION_STORE=memory`); the HTTP tests use it
//! for both ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guessing_game_core::domain::{GameSession, NewScore, ScoreRecord, SessionId};
use guessing_game_core::ports::{PortResult, ScoreStore, SessionStore};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use super::expiry_from_now;

struct StoredSession {
    session: GameSession,
    expires_at: DateTime<Utc>,
}

/// Sessions and scores held in memory behind async mutexes.
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, StoredSession>>,
    scores: Mutex<Vec<ScoreRecord>>,
    session_ttl: Duration,
}

impl MemoryStore {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            scores: Mutex::new(Vec::new()),
            session_ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, id: &SessionId) -> PortResult<Option<GameSession>> {
        let sessions = self.sessions.lock().await;
        let now = Utc::now();
        Ok(sessions
            .get(id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.session.clone()))
    }

    async fn save(&self, id: &SessionId, session: &GameSession) -> PortResult<()> {
        let expires_at = expiry_from_now(self.session_ttl)?;
        self.sessions.lock().await.insert(
            id.clone(),
            StoredSession {
                session: session.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> PortResult<()> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> PortResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, stored| stored.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn insert(&self, score: NewScore) -> PortResult<ScoreRecord> {
        let mut scores = self.scores.lock().await;
        if let Some(existing) = scores.iter().find(|s| s.game_id == score.game_id) {
            return Ok(existing.clone());
        }
        let record = ScoreRecord::from_new(score);
        scores.push(record.clone());
        Ok(record)
    }

    async fn top_scores(&self, limit: usize) -> PortResult<Vec<ScoreRecord>> {
        let mut scores = self.scores.lock().await.clone();
        // Stable sort keeps insertion order among equal keys.
        scores.sort_by_key(|s| (s.attempts, s.date));
        scores.truncate(limit);
        Ok(scores)
    }
}
