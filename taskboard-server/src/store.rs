//! Abstract document store and its in-memory reference implementation.
//!
//! The traits mirror the minimal surface of a document database: atomic
//! single-document insert/find/update/delete plus filtered count and fetch.
//! Authorization is encoded in the *filters* the repositories pass down, so
//! an update or delete whose compound `{id, owner}` condition matches
//! nothing reports `false` -- there is no separate check-then-act step to
//! race against.
//!
//! [`MemoryTaskStore`] keeps documents in insertion order, which doubles as
//! the stable secondary sort key required for deterministic paging.

use async_trait::async_trait;
use tokio::sync::RwLock;

use taskboard_core::error::StoreError;
use taskboard_core::query::{TaskFilter, TaskSort};
use taskboard_core::task::{Task, TaskPatch};
use taskboard_core::user::{User, UserId};

/// Document store for task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new document.
    async fn insert_one(&self, task: Task) -> Result<(), StoreError>;

    /// Returns the first document matching `filter`, if any.
    async fn find_one(&self, filter: &TaskFilter) -> Result<Option<Task>, StoreError>;

    /// Returns all documents matching `filter` under `sort`, optionally
    /// windowed by `skip`/`limit`. Ties within the sort key preserve
    /// insertion order.
    async fn find_many(
        &self,
        filter: &TaskFilter,
        sort: &TaskSort,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Counts documents matching `filter`.
    async fn count_matching(&self, filter: &TaskFilter) -> Result<u64, StoreError>;

    /// Atomically applies `patch` to the first document matching `filter`.
    /// Returns `false` when nothing matched.
    async fn update_one_matching(
        &self,
        filter: &TaskFilter,
        patch: &TaskPatch,
    ) -> Result<bool, StoreError>;

    /// Atomically removes the first document matching `filter`. Returns
    /// `false` when nothing matched.
    async fn delete_one_matching(&self, filter: &TaskFilter) -> Result<bool, StoreError>;
}

/// Document store for user accounts. Email uniqueness is the store's
/// responsibility; emails are stored lower-cased.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Returns `false` (and stores nothing) when the
    /// email is already taken -- the check and the insert are one atomic
    /// step.
    async fn insert_one(&self, user: User) -> Result<bool, StoreError>;

    /// Looks up an account by (lower-cased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Looks up an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// In-memory task store. Thread-safe via [`RwLock`]; the backing `Vec`
/// preserves insertion order across deletes, so a stable sort over it
/// yields the deterministic tie-break ordering.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    /// Creates a new, empty task store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert_one(&self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        tasks.push(task);
        Ok(())
    }

    async fn find_one(&self, filter: &TaskFilter) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| filter.matches(t)).cloned())
    }

    async fn find_many(
        &self,
        filter: &TaskFilter,
        sort: &TaskSort,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut matched: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
        drop(tasks);

        // Stable sort: ties within the key keep insertion order.
        matched.sort_by(|a, b| sort.compare(a, b));

        let skip = skip.map_or(0, |s| usize::try_from(s).unwrap_or(usize::MAX));
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn count_matching(&self, filter: &TaskFilter) -> Result<u64, StoreError> {
        let tasks = self.tasks.read().await;
        let count = tasks.iter().filter(|t| filter.matches(t)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn update_one_matching(
        &self,
        filter: &TaskFilter,
        patch: &TaskPatch,
    ) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter_mut().find(|t| filter.matches(t)) {
            Some(task) => {
                patch.apply(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one_matching(&self, filter: &TaskFilter) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.iter().position(|t| filter.matches(t)) {
            Some(index) => {
                // Shifting removal keeps insertion order for the remainder.
                tasks.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory user store with atomic email-uniqueness on insert.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Creates a new, empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_one(&self, user: User) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.push(user);
        Ok(true)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }
}
