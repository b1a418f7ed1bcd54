//! Admin gate and scope behavior over HTTP: role checks, unscoped listing,
//! admin mutations of other users' tasks, and the misc endpoints.

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

use taskboard_server::http::{self, AppState};

/// Starts an in-process server with a seeded admin and returns the base
/// URL.
async fn start_server_with_admin() -> String {
    let state = AppState::in_memory(3600);
    state
        .users
        .seed_admin("root@x.com", "hunter22")
        .await
        .expect("admin seed failed");
    let (addr, _handle) = http::start_server("127.0.0.1:0", state)
        .await
        .expect("failed to start test server");
    format!("http://{addr}")
}

fn sid_cookie(response: &Response) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn register(client: &Client, base: &str, email: &str) -> String {
    let response = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": email, "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    sid_cookie(&response)
}

async fn login_admin(client: &Client, base: &str) -> String {
    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "root@x.com", "password": "hunter22"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    sid_cookie(&response)
}

async fn create_task(client: &Client, base: &str, sid: &str, title: &str) -> String {
    let response = client
        .post(format!("{base}/api/tasks"))
        .header(COOKIE, sid)
        .json(&json!({"title": title, "details": "details"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn admin_endpoints_reject_non_admin_roles() {
    let base = start_server_with_admin().await;
    let client = Client::new();
    let alice = register(&client, &base, "alice@x.com").await;
    let task_id = create_task(&client, &base, &alice, "alice's task").await;

    // Authenticated but not admin: 403.
    let response = client
        .get(format!("{base}/api/admin/tasks"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let response = client
        .delete(format!("{base}/api/admin/tasks/{task_id}"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Anonymous: 401 before any role check.
    let response = client
        .get(format!("{base}/api/admin/tasks"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_list_is_unscoped() {
    let base = start_server_with_admin().await;
    let client = Client::new();

    let alice = register(&client, &base, "alice@x.com").await;
    let bob = register(&client, &base, "bob@x.com").await;
    create_task(&client, &base, &alice, "alice 1").await;
    create_task(&client, &base, &bob, "bob 1").await;
    create_task(&client, &base, &bob, "bob 2").await;

    // Each user sees only their own tasks.
    let list: Value = client
        .get(format!("{base}/api/tasks"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    // The admin sees everything.
    let admin = login_admin(&client, &base).await;
    let list: Value = client
        .get(format!("{base}/api/admin/tasks"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn admin_mutates_any_users_task() {
    let base = start_server_with_admin().await;
    let client = Client::new();

    let alice = register(&client, &base, "alice@x.com").await;
    let task_id = create_task(&client, &base, &alice, "alice's task").await;
    let admin = login_admin(&client, &base).await;

    let response = client
        .put(format!("{base}/api/admin/tasks/{task_id}"))
        .header(COOKIE, &admin)
        .json(&json!({"title": "retitled by admin", "details": "details", "status": "done"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "updated by admin");

    // Ownership did not move: alice still sees (and owns) the task.
    let list: Value = client
        .get(format!("{base}/api/tasks"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "retitled by admin");
    assert_eq!(items[0]["status"], "done");

    let response = client
        .delete(format!("{base}/api/admin/tasks/{task_id}"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "deleted by admin");
}

#[tokio::test]
async fn admin_created_tasks_are_attributed_to_the_admin() {
    let base = start_server_with_admin().await;
    let client = Client::new();

    let alice = register(&client, &base, "alice@x.com").await;
    let admin = login_admin(&client, &base).await;
    let task_id = create_task(&client, &base, &admin, "admin's note").await;

    // Invisible to regular users...
    let list: Value = client
        .get(format!("{base}/api/tasks"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list.as_array().unwrap().is_empty());

    // ...and owned by the admin identity, not left unattributed.
    let task: Value = client
        .get(format!("{base}/api/tasks/{task_id}"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!task["ownerId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn admin_missing_and_malformed_ids() {
    let base = start_server_with_admin().await;
    let client = Client::new();
    let admin = login_admin(&client, &base).await;

    let response = client
        .delete(format!(
            "{base}/api/admin/tasks/00000000-0000-7000-8000-000000000000"
        ))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{base}/api/admin/tasks/not-a-uuid"))
        .header(COOKIE, &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn default_sort_equals_explicit_created_at_descending() {
    let base = start_server_with_admin().await;
    let client = Client::new();
    let alice = register(&client, &base, "alice@x.com").await;

    for i in 0..5 {
        create_task(&client, &base, &alice, &format!("task {i}")).await;
    }

    let implicit: Value = client
        .get(format!("{base}/api/tasks"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let explicit: Value = client
        .get(format!("{base}/api/tasks?sort=-createdAt"))
        .header(COOKIE, &alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids = |v: &Value| -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(ids(&implicit), ids(&explicit));
}

#[tokio::test]
async fn info_and_unknown_endpoints() {
    let base = start_server_with_admin().await;
    let client = Client::new();

    let info: Value = client
        .get(format!("{base}/api/info"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info["project"], "TaskBoard");
    assert!(info["version"].is_string());

    let response = client
        .get(format!("{base}/api/no/such/endpoint"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "api endpoint not found");
}
