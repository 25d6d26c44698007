use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;

/// Cookie under which the session identifier travels.
pub const SESSION_COOKIE: &str = "session-id";

/// Session
///
/// Server-held authentication state for one logged-in client. Its existence
/// implies a prior successful credential verification.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    issued_at: Instant,
}

/// SessionStore
///
/// An in-process map from session identifier to session record. Sessions are
/// created at login, destroyed at logout, and lazily evicted once their TTL
/// lapses. The map lives behind an async RwLock; lookups are the common case.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// create
    ///
    /// Registers a new session for the given user and returns the opaque
    /// identifier the client will hold as a cookie. Identifiers are 32 random
    /// bytes, hex encoded; if the OS randomness source fails, the failure
    /// propagates and no session is created.
    pub async fn create(&self, user_id: Uuid) -> Result<String, ApiError> {
        let mut raw = [0u8; 32];
        getrandom::getrandom(&mut raw).map_err(|_| ApiError::Store)?;
        let id: String = raw.iter().map(|b| format!("{:02x}", b)).collect();

        let session = Session {
            user_id,
            issued_at: Instant::now(),
        };
        self.sessions.write().await.insert(id.clone(), session);
        Ok(id)
    }

    /// lookup
    ///
    /// Resolves a session identifier to the user it authenticates. Expired
    /// entries are removed on the way out.
    pub async fn lookup(&self, session_id: &str) -> Option<Uuid> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(s) if s.issued_at.elapsed() < self.ttl => return Some(s.user_id),
                None => return None,
                _ => {}
            }
        }
        // Expired: drop it under the write lock.
        self.sessions.write().await.remove(session_id);
        None
    }

    /// destroy
    ///
    /// Removes a session (logout). Returns true if a live session was removed.
    pub async fn destroy(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<SessionStore>;
