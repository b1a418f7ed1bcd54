//! Task input validation and normalization.
//!
//! [`validate`] turns raw client input into a canonical [`TaskDraft`],
//! collecting every hard violation instead of failing fast so a single
//! response reports all problems at once. Validation is deliberately
//! asymmetric: `title`, `details`, `status`, and `deadline` fail hard,
//! while `priority` and `category` silently coerce to defaults.
//!
//! The function is pure -- the reference date for the past-deadline rule is
//! an explicit parameter, never read from the clock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::task::{TaskPriority, TaskStatus};

/// Minimum title length in characters.
pub const TITLE_MIN: usize = 2;
/// Maximum title length in characters.
pub const TITLE_MAX: usize = 100;
/// Minimum details length in characters.
pub const DETAILS_MIN: usize = 2;
/// Maximum details length in characters.
pub const DETAILS_MAX: usize = 500;
/// Minimum category length in characters.
pub const CATEGORY_MIN: usize = 2;
/// Maximum category length in characters.
pub const CATEGORY_MAX: usize = 40;
/// Fallback category when the supplied one is missing or out of bounds.
pub const CATEGORY_DEFAULT: &str = "general";

/// Raw task fields as received from a client. Absent fields take the same
/// defaults a missing form field would: status "todo", priority "medium",
/// category "general", everything else empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaskInput {
    /// Raw title.
    pub title: String,
    /// Raw details.
    pub details: String,
    /// Raw status; absent means "todo".
    pub status: String,
    /// Raw priority; absent means "medium".
    pub priority: String,
    /// Raw category; absent means "general".
    pub category: String,
    /// Raw deadline; empty means no deadline.
    pub deadline: String,
}

impl Default for TaskInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            details: String::new(),
            status: TaskStatus::Todo.as_str().to_string(),
            priority: TaskPriority::Medium.as_str().to_string(),
            category: CATEGORY_DEFAULT.to_string(),
            deadline: String::new(),
        }
    }
}

/// A hard validation failure. Soft failures (bad priority/category) are
/// coerced, never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title outside 2-100 characters.
    #[error("title must be 2-100 chars")]
    TitleLength,
    /// Details outside 2-500 characters.
    #[error("details must be 2-500 chars")]
    DetailsLength,
    /// Status outside the closed set.
    #[error("status must be todo|inprogress|done")]
    StatusUnknown,
    /// Deadline supplied but unparsable.
    #[error("deadline must be a valid date")]
    DeadlineUnparsable,
    /// Deadline earlier than the start of the current day.
    #[error("deadline cannot be in the past")]
    DeadlinePast,
    /// Title filter parameter could not be compiled into a matcher.
    #[error("title filter is invalid")]
    TitleFilter,
    /// Registration email missing.
    #[error("email is required")]
    EmailRequired,
    /// Registration password shorter than 6 characters.
    #[error("password must be at least 6 chars")]
    PasswordTooShort,
}

/// Canonical task fields after trimming, normalization, and coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed details.
    pub details: String,
    /// Parsed status.
    pub status: TaskStatus,
    /// Parsed priority (coerced to `Medium` when unknown).
    pub priority: TaskPriority,
    /// Trimmed category (coerced to `general` when out of bounds).
    pub category: String,
    /// Parsed deadline, if supplied.
    pub deadline: Option<DateTime<Utc>>,
}

/// Validates and normalizes raw task input against the given reference date.
///
/// Returns the cleaned draft when no hard violation is found, otherwise the
/// complete list of violations. Re-validating a draft's own field renderings
/// yields an identical draft.
///
/// # Errors
///
/// Returns every [`ValidationError`] the input triggers, in field order.
pub fn validate(input: &TaskInput, today: NaiveDate) -> Result<TaskDraft, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let title = input.title.trim().to_string();
    let details = input.details.trim().to_string();

    // "in progress" -> "inprogress"
    let status_token: String = input
        .status
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect();

    let priority_token = input.priority.trim().to_lowercase();
    let category_raw = input.category.trim().to_string();
    let deadline_raw = input.deadline.trim();

    let title_len = title.chars().count();
    if title_len < TITLE_MIN || title_len > TITLE_MAX {
        errors.push(ValidationError::TitleLength);
    }

    let details_len = details.chars().count();
    if details_len < DETAILS_MIN || details_len > DETAILS_MAX {
        errors.push(ValidationError::DetailsLength);
    }

    let status = TaskStatus::from_normalized(&status_token);
    if status.is_none() {
        errors.push(ValidationError::StatusUnknown);
    }

    let priority = TaskPriority::from_normalized(&priority_token).unwrap_or_default();

    let category_len = category_raw.chars().count();
    let category = if category_len < CATEGORY_MIN || category_len > CATEGORY_MAX {
        CATEGORY_DEFAULT.to_string()
    } else {
        category_raw
    };

    let mut deadline = None;
    if !deadline_raw.is_empty() {
        match parse_deadline(deadline_raw) {
            None => errors.push(ValidationError::DeadlineUnparsable),
            Some(parsed) => {
                if parsed.date_naive() < today {
                    errors.push(ValidationError::DeadlinePast);
                } else {
                    deadline = Some(parsed);
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Status presence was checked above alongside the other hard failures.
    let Some(status) = status else {
        return Err(vec![ValidationError::StatusUnknown]);
    };

    Ok(TaskDraft {
        title,
        details,
        status,
        priority,
        category,
        deadline,
    })
}

/// Parses a deadline string. Accepts RFC 3339 datetimes and plain
/// `YYYY-MM-DD` dates (interpreted as midnight UTC). The full supplied
/// precision is retained; only the comparison against "today" is date-only.
#[must_use]
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
