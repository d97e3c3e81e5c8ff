//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-session lock table.

use crate::config::Config;
use crate::error::ApiError;
use crate::web::cookie::CookieSigner;
use guessing_game_core::ports::{ScoreStore, SecretSource, SessionStore};
use guessing_game_core::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub scores: Arc<dyn ScoreStore>,
    pub secrets: Arc<dyn SecretSource>,
    pub config: Arc<Config>,
    pub signer: CookieSigner,
    pub locks: SessionLocks,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        sessions: Arc<dyn SessionStore>,
        scores: Arc<dyn ScoreStore>,
        secrets: Arc<dyn SecretSource>,
    ) -> Result<Self, ApiError> {
        let signer = CookieSigner::new(
            &config.session_secret,
            config.session_ttl,
            config.cookie_secure,
        )?;
        Ok(Self {
            sessions,
            scores,
            secrets,
            config,
            signer,
            locks: SessionLocks::default(),
        })
    }
}

//=========================================================================================
// SessionLocks (Serializes Requests Against One Session)
//=========================================================================================

/// One async mutex per session id with a request in flight.
///
/// Handlers hold a session's lock across load, engine call, and save, so two
/// guesses from the same player never interleave. Entries are removed as soon
/// as nobody holds or waits on them.
#[derive(Default)]
pub struct SessionLocks {
    table: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    /// Waits until `id` is free and claims it for the guard's lifetime.
    pub async fn acquire(&self, id: &SessionId) -> SessionGuard<'_> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(id.clone()).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        SessionGuard {
            locks: self,
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of sessions currently locked or awaited.
    pub fn in_flight(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        // Release first so the strong count below no longer includes us.
        self.guard.take();
        let mut table = self
            .locks
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if table
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.id);
        }
    }
}
