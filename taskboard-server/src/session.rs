//! Session token issuance, resolution, and revocation.
//!
//! Tokens are opaque random values (UUID v4) mapped to a caller identity
//! with a fixed TTL. Expired entries are dropped lazily on resolve; there
//! is no background sweeper. Cookie transport is the HTTP layer's concern.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use taskboard_core::user::Identity;

/// Default session lifetime: one day.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

struct SessionEntry {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// In-memory session store with TTL expiry. Thread-safe via [`RwLock`].
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates a session store whose tokens expire `ttl_secs` after
    /// establishment.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
        }
    }

    /// Issues a fresh opaque token for `identity`.
    pub async fn establish(&self, identity: Identity) -> String {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), SessionEntry { identity, expires_at });
        drop(sessions);
        token
    }

    /// Maps a token back to its identity, or `None` when the token is
    /// unknown or expired. An expired entry is removed on the way out.
    pub async fn resolve(&self, token: &str) -> Option<Identity> {
        self.resolve_at(token, Utc::now()).await
    }

    async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Identity> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(entry) if entry.expires_at > now => Some(entry.identity),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Drops a session. Returns `true` if the token existed.
    pub async fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }
}
