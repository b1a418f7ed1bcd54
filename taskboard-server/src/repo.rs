//! Repositories: the only code that touches the document stores.
//!
//! Every operation takes the caller [`Identity`] and applies the access
//! policy before (or, for mutations, *as part of*) the store call. Updates
//! and deletes encode the ownership scope in the store predicate itself --
//! one atomic conditional operation, not an authorization read followed by
//! a write.

use std::sync::Arc;

use chrono::Utc;

use taskboard_core::error::ApiError;
use taskboard_core::policy::{self, Action};
use taskboard_core::query::{ListParams, ListResult, TaskFilter, TaskPage, TaskQuery, total_pages};
use taskboard_core::task::{Task, TaskId, TaskPatch, TaskView};
use taskboard_core::user::{Identity, Role, User, UserId};
use taskboard_core::validate::{TaskDraft, ValidationError};

use crate::auth;
use crate::store::{TaskStore, UserStore};

/// Minimum password length accepted at registration.
const PASSWORD_MIN: usize = 6;

/// CRUD over task documents with the access policy enforced on every call.
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
}

impl TaskRepository {
    /// Creates a repository over the given store.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Inserts a new task owned by the caller. Both timestamps are stamped
    /// with the same instant. Tasks have no natural key, so there is no
    /// duplicate check.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn create(&self, caller: &Identity, draft: TaskDraft) -> Result<TaskId, ApiError> {
        let task = Task::from_draft(draft, caller.user_id, Utc::now());
        let id = task.id;
        self.store.insert_one(task).await?;
        Ok(id)
    }

    /// Fetches a single task. A record that exists but is outside the
    /// caller's scope fails exactly like a missing one.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when absent or scope-excluded.
    pub async fn get_by_id(&self, caller: &Identity, id: TaskId) -> Result<Task, ApiError> {
        let filter = TaskFilter {
            id: Some(id),
            ..TaskFilter::default()
        };
        let task = self
            .store
            .find_one(&filter)
            .await?
            .ok_or(ApiError::NotFound)?;
        policy::authorize(caller, Action::Read, &task.owner_id).map_err(|_| ApiError::NotFound)?;
        Ok(task)
    }

    /// Lists tasks under the caller's mandatory scope plus any supplied
    /// filter/sort/pagination parameters.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an uncompilable title filter; store
    /// failures otherwise.
    pub async fn list(&self, caller: &Identity, params: &ListParams) -> Result<ListResult, ApiError> {
        let query =
            TaskQuery::build(policy::scope_filter(caller), params).map_err(ApiError::Validation)?;

        match query.page {
            None => {
                let tasks = self
                    .store
                    .find_many(&query.filter, &query.sort, None, None)
                    .await?;
                Ok(ListResult::Sequence(
                    tasks.iter().map(TaskView::from).collect(),
                ))
            }
            Some(page) => {
                // Count and fetch are two logical reads; a write landing
                // between them can skew `total` against `items`. Tolerated:
                // the store only guarantees single-document atomicity.
                let total = self.store.count_matching(&query.filter).await?;
                let items = self
                    .store
                    .find_many(&query.filter, &query.sort, Some(page.skip()), Some(page.limit))
                    .await?;
                Ok(ListResult::Page(TaskPage {
                    items: items.iter().map(TaskView::from).collect(),
                    page: page.number,
                    limit: page.limit,
                    total,
                    total_pages: total_pages(total, page.limit),
                }))
            }
        }
    }

    /// Replace-style update. The compound `{id, owner?}` condition rides in
    /// the store predicate, so authorization and mutation are one atomic
    /// step.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the conditional match count is zero --
    /// whether the id is missing or the scope excluded it.
    pub async fn update(
        &self,
        caller: &Identity,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<(), ApiError> {
        let filter = TaskFilter {
            id: Some(id),
            owner_id: policy::scope_filter(caller),
            ..TaskFilter::default()
        };
        let patch = TaskPatch::from_draft(draft, Utc::now());
        if self.store.update_one_matching(&filter, &patch).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }

    /// Deletes a task under the same atomic compound-condition discipline
    /// as [`Self::update`].
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when nothing matched.
    pub async fn delete(&self, caller: &Identity, id: TaskId) -> Result<(), ApiError> {
        let filter = TaskFilter {
            id: Some(id),
            owner_id: policy::scope_filter(caller),
            ..TaskFilter::default()
        };
        if self.store.delete_one_matching(&filter).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }
}

/// Account registration, credential verification, and the admin bootstrap.
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    /// Creates a repository over the given store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Registers a new `user`-role account. The email is trimmed and
    /// lower-cased; uniqueness is left to the store's atomic insert.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a missing email or short password,
    /// [`ApiError::Conflict`] when the email is taken.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();

        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push(ValidationError::EmailRequired);
        }
        if password.chars().count() < PASSWORD_MIN {
            errors.push(ValidationError::PasswordTooShort);
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let user = User {
            id: UserId::new(),
            email,
            password_hash: auth::hash_password(password)?,
            role: Role::User,
            created_at: Utc::now(),
        };
        if self.store.insert_one(user.clone()).await? {
            Ok(user)
        } else {
            Err(ApiError::Conflict)
        }
    }

    /// Checks a login attempt. Unknown email and wrong password fail
    /// identically.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidCredentials`] on any mismatch.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.store.find_by_email(&email).await? else {
            return Err(ApiError::InvalidCredentials);
        };
        if auth::verify_password(password, &user.password_hash) {
            Ok(user)
        } else {
            Err(ApiError::InvalidCredentials)
        }
    }

    /// Seeds the bootstrap admin account. Idempotent: returns `false`
    /// without touching the store when an account with that email already
    /// exists (whatever its role).
    ///
    /// # Errors
    ///
    /// Propagates hashing and store failures.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<bool, ApiError> {
        let email = email.trim().to_lowercase();
        if self.store.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        let admin = User {
            id: UserId::new(),
            email,
            password_hash: auth::hash_password(password)?,
            role: Role::Admin,
            created_at: Utc::now(),
        };
        // A concurrent registration can still win the insert; the store's
        // atomic uniqueness check makes that a clean skip.
        Ok(self.store.insert_one(admin).await?)
    }
}
