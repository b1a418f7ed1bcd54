//! Deterministic composition of filter, sort, and pagination parameters.
//!
//! [`TaskQuery::build`] combines the mandatory owner scope with the
//! caller-supplied [`ListParams`] into a query the store can execute.
//! Identical parameters over identical data always produce identical
//! ordering and paging: the sort comparator is total over the sortable
//! fields and ties are broken by the store's insertion order.
//!
//! The title filter is an exact, case-insensitive full-string match. The
//! raw parameter is passed through [`regex::escape`] before the anchored
//! pattern is built, so user input can never inject pattern semantics --
//! the escaping step is security-relevant normalization, not convenience.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId, TaskView};
use crate::user::UserId;
use crate::validate::ValidationError;

/// Default page number when pagination is active but `page` is absent or
/// unusable.
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size when pagination is active but `limit` is absent or
/// unusable.
pub const DEFAULT_LIMIT: u64 = 10;
/// Hard ceiling on the page size, regardless of what was requested.
pub const MAX_LIMIT: u64 = 50;

/// Raw list-endpoint query parameters. Numeric fields arrive as strings so
/// that coercion rules (non-numeric page -> 1, and so on) live here rather
/// than in the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Exact-match (case-insensitive) title filter.
    pub title: Option<String>,
    /// Sort key, optionally prefixed with `-` for descending.
    pub sort: Option<String>,
    /// 1-based page number. Presence activates pagination.
    pub page: Option<String>,
    /// Page size. Presence activates pagination.
    pub limit: Option<String>,
}

/// Case-insensitive exact-match title predicate built from escaped input.
#[derive(Debug, Clone)]
pub struct TitleMatch {
    pattern: Regex,
}

impl TitleMatch {
    /// Builds the anchored, case-insensitive matcher for `raw`, escaping
    /// every regex metacharacter first.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] if the pattern cannot be
    /// compiled (in practice only when the input exceeds the compiled-size
    /// limit).
    pub fn new(raw: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&format!("^{}$", regex::escape(raw)))
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// Returns `true` when `title` matches the filter exactly, ignoring
    /// case.
    #[must_use]
    pub fn matches(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }
}

/// Equality/predicate filter over task documents. Unset fields match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Match a specific task id.
    pub id: Option<TaskId>,
    /// Match a specific owner (the mandatory scope for non-admin callers).
    pub owner_id: Option<UserId>,
    /// Case-insensitive exact title match.
    pub title: Option<TitleMatch>,
}

impl TaskFilter {
    /// Returns `true` when `task` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(id) = self.id
            && task.id != id
        {
            return false;
        }
        if let Some(owner_id) = self.owner_id
            && task.owner_id != owner_id
        {
            return false;
        }
        if let Some(title) = &self.title
            && !title.matches(&task.title)
        {
            return false;
        }
        true
    }
}

/// Fields a list result can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Sort by title.
    Title,
    /// Sort by status (todo < inprogress < done).
    Status,
    /// Sort by priority (low < medium < high).
    Priority,
    /// Sort by category.
    Category,
    /// Sort by deadline; tasks without one sort first.
    Deadline,
    /// Sort by creation time.
    CreatedAt,
    /// Sort by last mutation time.
    UpdatedAt,
}

impl SortKey {
    /// Parses a sort field name. Accepts the camelCase wire spelling and
    /// tolerates snake_case. Unknown names return `None` (the caller falls
    /// back to the default sort).
    #[must_use]
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "title" => Some(Self::Title),
            "status" => Some(Self::Status),
            "priority" => Some(Self::Priority),
            "category" => Some(Self::Category),
            "deadline" => Some(Self::Deadline),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

/// A single-key sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    /// The field to order by.
    pub key: SortKey,
    /// Descending when `true`.
    pub descending: bool,
}

impl Default for TaskSort {
    /// Newest-first: `createdAt` descending.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            descending: true,
        }
    }
}

impl TaskSort {
    /// Parses a `sort` parameter (`-` prefix for descending). Absent or
    /// unknown field names fall back to the default order.
    #[must_use]
    pub fn parse(param: Option<&str>) -> Self {
        let Some(param) = param.map(str::trim).filter(|p| !p.is_empty()) else {
            return Self::default();
        };
        let (field, descending) = param
            .strip_prefix('-')
            .map_or((param, false), |rest| (rest, true));
        SortKey::parse(field).map_or_else(Self::default, |key| Self { key, descending })
    }

    /// Compares two tasks under this order. Ties return `Equal`; the store
    /// resolves them by insertion order via a stable sort.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::Category => a.category.cmp(&b.category),
            SortKey::Deadline => a.deadline.cmp(&b.deadline),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// An active pagination window (1-based page number and clamped limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u64,
    /// Page size, already clamped to [`MAX_LIMIT`].
    pub limit: u64,
}

impl Page {
    /// Number of documents to skip before this page starts.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.number - 1) * self.limit
    }
}

/// Coerces a raw `page` value: absent, non-numeric, or non-positive all
/// become page 1.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p > 0)
        .and_then(|p| u64::try_from(p).ok())
        .unwrap_or(DEFAULT_PAGE)
}

/// Coerces a raw `limit` value: absent, non-numeric, or non-positive become
/// the default of 10; anything above [`MAX_LIMIT`] is clamped down to it.
#[must_use]
pub fn parse_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|l| l.trim().parse::<i64>().ok())
        .filter(|l| *l > 0)
        .and_then(|l| u64::try_from(l).ok())
        .map_or(DEFAULT_LIMIT, |l| l.min(MAX_LIMIT))
}

/// `max(1, ceil(total / limit))` -- every result set has at least one page.
#[must_use]
pub fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1)).max(1)
}

/// A fully composed query: mandatory scope folded into the filter, resolved
/// sort order, and the pagination window if pagination was requested.
#[derive(Debug, Clone)]
pub struct TaskQuery {
    /// Document predicate (scope + user filters).
    pub filter: TaskFilter,
    /// Resolved sort order.
    pub sort: TaskSort,
    /// `Some` only when `page` or `limit` was supplied.
    pub page: Option<Page>,
}

impl TaskQuery {
    /// Composes the owner scope and raw list parameters into a query.
    ///
    /// The scope is folded into the filter itself, never layered on
    /// afterwards, so the pagination `total` is counted over the scoped set.
    /// Pagination activates only when `page` or `limit` is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TitleFilter`] when the title parameter
    /// cannot be compiled into a matcher.
    pub fn build(scope: Option<UserId>, params: &ListParams) -> Result<Self, Vec<ValidationError>> {
        let title = match params.title.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                TitleMatch::new(raw).map_err(|_| vec![ValidationError::TitleFilter])?,
            ),
        };

        let filter = TaskFilter {
            id: None,
            owner_id: scope,
            title,
        };

        let sort = TaskSort::parse(params.sort.as_deref());

        let page = (params.page.is_some() || params.limit.is_some()).then(|| Page {
            number: parse_page(params.page.as_deref()),
            limit: parse_limit(params.limit.as_deref()),
        });

        Ok(Self { filter, sort, page })
    }
}

/// Pagination envelope returned when paging parameters were supplied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    /// The page of task projections.
    pub items: Vec<TaskView>,
    /// 1-based page number served.
    pub page: u64,
    /// Page size used.
    pub limit: u64,
    /// Count of the filtered (but unpaginated) set.
    pub total: u64,
    /// `max(1, ceil(total / limit))`.
    pub total_pages: u64,
}

/// Result of a list operation: a plain sequence, or the pagination envelope
/// when paging was requested.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ListResult {
    /// Full scoped, filtered, sorted result set.
    Sequence(Vec<TaskView>),
    /// One page plus totals.
    Page(TaskPage),
}
