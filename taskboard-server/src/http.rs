//! HTTP surface: axum router, handlers, cookie transport, and the mapping
//! from the error taxonomy to status codes.
//!
//! Handlers resolve the caller identity from the `sid` cookie first, then
//! thread it explicitly into every repository call -- authorization state
//! never lives in ambient request context.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use taskboard_core::error::ApiError;
use taskboard_core::query::ListParams;
use taskboard_core::task::{TaskId, TaskView};
use taskboard_core::user::Identity;
use taskboard_core::validate::{self, TaskDraft, TaskInput};

use crate::repo::{TaskRepository, UserRepository};
use crate::session::SessionStore;
use crate::store::{MemoryTaskStore, MemoryUserStore};

/// Name of the session cookie.
const SESSION_COOKIE: &str = "sid";

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Task CRUD with policy enforcement.
    pub tasks: Arc<TaskRepository>,
    /// Registration, login verification, admin bootstrap.
    pub users: Arc<UserRepository>,
    /// Session token map.
    pub sessions: Arc<SessionStore>,
    /// Cookie Max-Age, mirroring the session TTL.
    pub session_ttl_secs: u64,
}

impl AppState {
    /// Builds a fully in-memory application state -- the default for both
    /// the binary and the integration tests.
    #[must_use]
    pub fn in_memory(session_ttl_secs: u64) -> Self {
        Self {
            tasks: Arc::new(TaskRepository::new(Arc::new(MemoryTaskStore::new()))),
            users: Arc::new(UserRepository::new(Arc::new(MemoryUserStore::new()))),
            sessions: Arc::new(SessionStore::new(session_ttl_secs)),
            session_ttl_secs,
        }
    }
}

/// Wrapper that renders an [`ApiError`] as an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            ApiError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation error",
                    "details": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"error": "unauthorized"})),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "invalid credentials"}),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({"error": "forbidden"})),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({"error": "task not found"})),
            ApiError::Conflict => (StatusCode::CONFLICT, json!({"error": "user exists"})),
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, json!({"error": "invalid id"})),
            ApiError::Store(e) => {
                // Full detail stays server-side; the caller gets a generic body.
                tracing::error!(error = %e, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "database error"}),
                )
            }
        };
        (status, axum::Json(body)).into_response()
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/admin/tasks", get(admin_list_tasks))
        .route(
            "/api/admin/tasks/{id}",
            put(admin_update_task).delete(admin_delete_task),
        )
        .route("/api/info", get(info))
        .fallback(fallback)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address and
/// a join handle. Used by both `main.rs` and the integration tests (which
/// bind to `127.0.0.1:0`).
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    state: AppState,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}

// ---------------------------------------------------------------------------
// Session cookie transport
// ---------------------------------------------------------------------------

/// Extracts the session token from the `Cookie` header, if present.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Renders the `Set-Cookie` value establishing a session.
fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Renders the `Set-Cookie` value clearing the session cookie.
fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolves the caller identity or rejects with 401.
async fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<Identity, HttpError> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;
    state
        .sessions
        .resolve(&token)
        .await
        .ok_or_else(|| HttpError(ApiError::Unauthorized))
}

/// Resolves the caller identity and additionally requires the admin role.
async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Identity, HttpError> {
    let caller = require_auth(state, headers).await?;
    if caller.role.is_admin() {
        Ok(caller)
    } else {
        Err(HttpError(ApiError::Forbidden))
    }
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

/// Login/registration request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credentials {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Response, HttpError> {
    let user = state.users.register(&body.email, &body.password).await?;
    tracing::info!(email = %user.email, "user registered");

    // Registration doubles as login.
    let token = state
        .sessions
        .establish(Identity {
            user_id: user.id,
            role: user.role,
        })
        .await;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token, state.session_ttl_secs))],
        axum::Json(json!({"message": "registered"})),
    )
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Response, HttpError> {
    let user = state
        .users
        .verify_credentials(&body.email, &body.password)
        .await?;
    let token = state
        .sessions
        .establish(Identity {
            user_id: user.id,
            role: user.role,
        })
        .await;
    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.session_ttl_secs))],
        axum::Json(json!({"message": "ok"})),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        axum::Json(json!({"message": "logged out"})),
    )
        .into_response()
}

/// Reports whether the caller holds a live session. Never rejects.
async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identity = match session_token(&headers) {
        Some(token) => state.sessions.resolve(&token).await,
        None => None,
    };
    axum::Json(json!({
        "authenticated": identity.is_some(),
        "role": identity.map(|i| i.role),
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

/// Parses a path id, mapping garbage to a 400 rather than a 404.
fn parse_task_id(raw: &str) -> Result<TaskId, HttpError> {
    TaskId::parse(raw).ok_or_else(|| HttpError(ApiError::InvalidId))
}

/// Validates a task body against today's date (UTC).
fn validate_input(input: &TaskInput) -> Result<TaskDraft, HttpError> {
    validate::validate(input, Utc::now().date_naive())
        .map_err(|violations| HttpError(ApiError::Validation(violations)))
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TaskInput>,
) -> Result<Response, HttpError> {
    let caller = require_auth(&state, &headers).await?;
    let draft = validate_input(&input)?;
    let id = state.tasks.create(&caller, draft).await?;
    Ok((
        StatusCode::CREATED,
        axum::Json(json!({"id": id.to_string()})),
    )
        .into_response())
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, HttpError> {
    let caller = require_auth(&state, &headers).await?;
    let result = state.tasks.list(&caller, &params).await?;
    Ok(axum::Json(result).into_response())
}

async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let caller = require_auth(&state, &headers).await?;
    let id = parse_task_id(&id)?;
    let task = state.tasks.get_by_id(&caller, id).await?;
    Ok(axum::Json(TaskView::from(&task)).into_response())
}

async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Response, HttpError> {
    let caller = require_auth(&state, &headers).await?;
    let id = parse_task_id(&id)?;
    let draft = validate_input(&input)?;
    state.tasks.update(&caller, id, draft).await?;
    Ok(axum::Json(json!({"message": "updated"})).into_response())
}

async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let caller = require_auth(&state, &headers).await?;
    let id = parse_task_id(&id)?;
    state.tasks.delete(&caller, id).await?;
    Ok(axum::Json(json!({"message": "deleted"})).into_response())
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

async fn admin_list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, HttpError> {
    let caller = require_admin(&state, &headers).await?;
    let result = state.tasks.list(&caller, &params).await?;
    Ok(axum::Json(result).into_response())
}

async fn admin_update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Response, HttpError> {
    let caller = require_admin(&state, &headers).await?;
    let id = parse_task_id(&id)?;
    let draft = validate_input(&input)?;
    state.tasks.update(&caller, id, draft).await?;
    Ok(axum::Json(json!({"message": "updated by admin"})).into_response())
}

async fn admin_delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let caller = require_admin(&state, &headers).await?;
    let id = parse_task_id(&id)?;
    state.tasks.delete(&caller, id).await?;
    Ok(axum::Json(json!({"message": "deleted by admin"})).into_response())
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

async fn info() -> Response {
    axum::Json(json!({
        "project": "TaskBoard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

async fn fallback(request: Request) -> Response {
    if request.uri().path().starts_with("/api") {
        (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"error": "api endpoint not found"})),
        )
            .into_response()
    } else {
        (StatusCode::NOT_FOUND, "404 - page not found").into_response()
    }
}

/// Logs every request with its resolved status.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!(%method, path = %path, status = response.status().as_u16(), "request");
    response
}
