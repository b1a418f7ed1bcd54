//! Ownership and role rules for task access.
//!
//! Two forms of the same policy: [`authorize`] decides a single-record
//! action, and [`scope_filter`] yields the mandatory owner predicate for
//! list/read-many operations. The scope is applied *before* any
//! user-supplied filter/sort/pagination so that pagination totals can never
//! leak the existence or count of other users' tasks.

use crate::user::{Identity, UserId};

/// Operations a caller can attempt against a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a single record.
    Read,
    /// Replace-style update.
    Update,
    /// Delete.
    Delete,
}

/// Marker returned when the policy rejects an action. Callers surface it as
/// `NotFound` so a denied record is indistinguishable from a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("access denied")]
pub struct Denied;

/// Decides whether `caller` may perform `action` on a task owned by
/// `owner_id`. Admins are allowed unconditionally; users only on their own
/// tasks. Unauthenticated callers never reach this function -- the session
/// resolver rejects them first.
///
/// # Errors
///
/// Returns [`Denied`] when a non-admin caller targets another user's task.
pub fn authorize(caller: &Identity, _action: Action, owner_id: &UserId) -> Result<(), Denied> {
    if caller.role.is_admin() || caller.user_id == *owner_id {
        Ok(())
    } else {
        Err(Denied)
    }
}

/// Returns the mandatory owner scope for list/read-many operations:
/// `None` for admins (unscoped), the caller's own id otherwise.
#[must_use]
pub fn scope_filter(caller: &Identity) -> Option<UserId> {
    if caller.role.is_admin() {
        None
    } else {
        Some(caller.user_id)
    }
}
