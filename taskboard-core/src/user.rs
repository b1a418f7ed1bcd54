//! User accounts, roles, and the resolved caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user account, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new time-ordered user identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `UserId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role attached to a user account. Defaults to `User` on registration;
/// at most one bootstrap `Admin` is seeded from configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account: sees and mutates only its own tasks.
    User,
    /// Administrator: unscoped access to every task.
    Admin,
}

impl Role {
    /// Returns `true` for the `Admin` role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns the lowercase wire spelling of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user account.
///
/// `email` is trimmed and lower-cased before storage; uniqueness is
/// case-insensitive. `password_hash` is an opaque PHC-format string and
/// must never be projected to clients.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique account identifier.
    pub id: UserId,
    /// Lower-cased email address, unique across the store.
    pub email: String,
    /// Opaque one-way password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Caller identity resolved from a session token.
///
/// Threaded explicitly into every policy and repository call; handlers never
/// read identity from ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The authenticated user's id.
    pub user_id: UserId,
    /// The authenticated user's role.
    pub role: Role,
}
