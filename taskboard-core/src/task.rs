//! Task records and their closed field enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;
use crate::validate::TaskDraft;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a task id from its string rendering, tolerating surrounding
    /// whitespace. Returns `None` for anything that is not a valid UUID.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task. A closed set: values outside it are hard validation
/// errors, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Parses an already-normalized status token ("todo" | "inprogress" |
    /// "done"). Normalization (lower-casing, whitespace stripping) is the
    /// validator's job.
    #[must_use]
    pub fn from_normalized(token: &str) -> Option<Self> {
        match token {
            "todo" => Some(Self::Todo),
            "inprogress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns the lowercase wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a task. A closed set with lenient intake: values outside it
/// silently coerce to [`TaskPriority::Medium`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low urgency.
    Low,
    /// The default.
    #[default]
    Medium,
    /// High urgency.
    High,
}

impl TaskPriority {
    /// Parses a normalized priority token, returning `None` for unknown
    /// values (the validator coerces those to the default).
    #[must_use]
    pub fn from_normalized(token: &str) -> Option<Self> {
        match token {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Returns the lowercase wire spelling of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Owning user. Immutable after creation.
    pub owner_id: UserId,
    /// Short summary, 2-100 characters.
    pub title: String,
    /// Longer description, 2-500 characters.
    pub details: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Free-text grouping label.
    pub category: String,
    /// Optional due date. Stored at the input's full precision; validated
    /// date-only against the current day.
    pub deadline: Option<DateTime<Utc>>,
    /// When the record was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Assembles a new record from a validated draft, attributing ownership
    /// and stamping both timestamps with the same instant.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            owner_id,
            title: draft.title,
            details: draft.details,
            status: draft.status,
            priority: draft.priority,
            category: draft.category,
            deadline: draft.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replace-style update applied to an existing task.
///
/// Carries every mutable field; `owner_id`, `created_at`, and the id itself
/// are not patchable.
#[derive(Debug, Clone)]
pub struct TaskPatch {
    /// New title.
    pub title: String,
    /// New details.
    pub details: String,
    /// New status.
    pub status: TaskStatus,
    /// New priority.
    pub priority: TaskPriority,
    /// New category.
    pub category: String,
    /// New deadline (or its removal).
    pub deadline: Option<DateTime<Utc>>,
    /// Mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskPatch {
    /// Builds a patch from a validated draft and a mutation timestamp.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            details: draft.details,
            status: draft.status,
            priority: draft.priority,
            category: draft.category,
            deadline: draft.deadline,
            updated_at: now,
        }
    }

    /// Applies the patch in place.
    pub fn apply(&self, task: &mut Task) {
        task.title.clone_from(&self.title);
        task.details.clone_from(&self.details);
        task.status = self.status;
        task.priority = self.priority;
        task.category.clone_from(&self.category);
        task.deadline = self.deadline;
        task.updated_at = self.updated_at;
    }
}

/// Client-facing projection of a task with identifiers rendered as plain
/// strings and datetimes as RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task id as a string.
    pub id: String,
    /// Owner id as a string.
    pub owner_id: String,
    /// Title.
    pub title: String,
    /// Details.
    pub details: String,
    /// Status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Category.
    pub category: String,
    /// Deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            owner_id: task.owner_id.to_string(),
            title: task.title.clone(),
            details: task.details.clone(),
            status: task.status,
            priority: task.priority,
            category: task.category.clone(),
            deadline: task.deadline,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
