//! Service-wide error taxonomy.
//!
//! One enum covers every failure the HTTP surface can report; the server
//! crate maps variants to status codes. Missing-id and scope-excluded both
//! surface as [`ApiError::NotFound`] so callers cannot probe for the
//! existence of other users' tasks.

use crate::validate::ValidationError;

/// Unexpected failure inside the persistence layer. Never retried; surfaced
/// to callers as a generic failure while the detail is logged server-side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("store failure: {0}")]
pub struct StoreError(pub String);

/// Every failure the service can report to a caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Client-fixable input problems; carries all violations at once.
    #[error("validation error")]
    Validation(Vec<ValidationError>),
    /// No session, or an expired one.
    #[error("unauthorized")]
    Unauthorized,
    /// Login attempt with an unknown email or wrong password. The two cases
    /// are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Authenticated but lacking the role an admin-only action requires.
    #[error("forbidden")]
    Forbidden,
    /// Missing id or scope-excluded record; intentionally conflated.
    #[error("task not found")]
    NotFound,
    /// Duplicate unique key on registration.
    #[error("user exists")]
    Conflict,
    /// A path id that does not parse.
    #[error("invalid id")]
    InvalidId,
    /// See [`StoreError`].
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Single-violation convenience constructor.
    #[must_use]
    pub fn validation(error: ValidationError) -> Self {
        Self::Validation(vec![error])
    }
}
