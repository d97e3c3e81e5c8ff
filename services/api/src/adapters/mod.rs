pub mod db;
pub mod memory;

pub use db::DbAdapter;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use guessing_game_core::ports::{PortError, PortResult, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The instant a session saved now should stop being readable.
fn expiry_from_now(ttl: Duration) -> PortResult<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| PortError::Persistence(format!("session TTL {:?} is out of range", ttl)))
}

/// Periodically drops expired sessions until the runtime shuts down.
pub fn spawn_session_reaper(
    sessions: Arc<dyn SessionStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Failed to purge expired sessions: {:?}", e),
            }
        }
    })
}
