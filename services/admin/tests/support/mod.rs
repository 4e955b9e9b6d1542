//! In-process portfolio API used by the integration tests

#![allow(dead_code)]

use admin::{MemoryStorage, Prompt, SessionStore, Storage};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use common::ApiClient;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const EDITOR_TOKEN: &str = "editor-token";
/// Resolves like `ADMIN_TOKEN`, but only after a delay
pub const SLOW_TOKEN: &str = "slow-token";
/// Rejected, but only after a delay
pub const SLOW_EXPIRED_TOKEN: &str = "slow-expired";

/// Request seen by the fake API
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct FakeState {
    pub posts: Vec<Value>,
    pub projects: Vec<Value>,
    pub messages: Vec<Value>,
    pub next_id: i64,
    pub requests: Vec<Recorded>,
    /// Answer every admin mutation with 403 `{"detail":"Forbidden"}`
    pub forbid_mutations: bool,
    /// Answer the message list with a 500
    pub fail_messages: bool,
}

/// Handle on a running fake API
#[derive(Clone)]
pub struct FakeApi {
    pub base_url: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState {
            next_id: 100,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/me", get(me))
            .route("/api/auth/login", axum::routing::post(login))
            .route("/api/posts", get(list_posts))
            .route("/api/projects", get(list_projects))
            .route("/api/admin/messages", get(list_messages))
            .route("/api/admin/posts", axum::routing::post(create_post))
            .route("/api/admin/posts/:id", put(update_post).delete(delete_post))
            .route("/api/admin/projects", axum::routing::post(create_project))
            .route(
                "/api/admin/projects/:id",
                put(update_project).delete(delete_project),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().requests.clone()
    }

    /// Number of requests made to `path`
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn client(&self) -> ApiClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to build HTTP client");
        ApiClient::with_http(&self.base_url, http)
    }

    /// Session over in-memory storage, not yet restored
    pub fn session(&self) -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(self.client(), storage.clone() as Arc<dyn Storage>);
        (session, storage)
    }

    /// Session already logged in as the admin user
    pub async fn admin_session(&self) -> SessionStore {
        let (session, _) = self.session();
        session.login(ADMIN_TOKEN).await;
        assert!(session.is_authenticated(), "admin login failed");
        session
    }
}

pub fn post_json(id: i64, title: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "excerpt": format!("About {}", title),
        "content": "Body",
        "date": date,
        "readTime": "5 min",
        "category": "Rust",
        "tags": ["rust"],
        "slug": title.to_lowercase().replace(' ', "-"),
    })
}

pub fn project_json(id: i64, name: &str, technologies: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{} project", name),
        "technologies": technologies,
        "github": format!("https://github.com/me/{}", name.to_lowercase()),
        "demo": null,
    })
}

pub fn message_json(id: i64, email: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": "Visitor",
        "email": email,
        "subject": "Hello",
        "message": "Nice work",
        "created_at": created_at,
    })
}

type Shared = State<Arc<Mutex<FakeState>>>;

fn record(state: &Arc<Mutex<FakeState>>, method: Method, path: &str, body: Option<Value>) {
    state.lock().requests.push(Recorded {
        method,
        path: path.to_string(),
        body,
    });
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn identity(token: &str) -> Option<Value> {
    match token {
        ADMIN_TOKEN | SLOW_TOKEN => Some(
            json!({"id": 1, "username": "admin", "email": "admin@example.com", "is_admin": true}),
        ),
        EDITOR_TOKEN => Some(
            json!({"id": 2, "username": "editor", "email": "editor@example.com", "is_admin": false}),
        ),
        _ => None,
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Admin guard: 401 for unknown credentials, 403 for non-admins
fn require_admin(headers: &HeaderMap) -> Result<(), Response> {
    let Some(identity) = bearer(headers).as_deref().and_then(identity) else {
        return Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"));
    };
    if identity["is_admin"] != json!(true) {
        return Err(detail(StatusCode::FORBIDDEN, "Not enough permissions"));
    }
    Ok(())
}

fn guard_mutation(state: &Arc<Mutex<FakeState>>, headers: &HeaderMap) -> Result<(), Response> {
    require_admin(headers)?;
    if state.lock().forbid_mutations {
        return Err(detail(StatusCode::FORBIDDEN, "Forbidden"));
    }
    Ok(())
}

async fn me(State(state): Shared, headers: HeaderMap) -> Response {
    record(&state, Method::GET, "/api/auth/me", None);
    let token = bearer(&headers).unwrap_or_default();
    if token == SLOW_TOKEN || token == SLOW_EXPIRED_TOKEN {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    match identity(&token) {
        Some(identity) => Json(identity).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn login(State(state): Shared, Json(body): Json<Value>) -> Response {
    record(&state, Method::POST, "/api/auth/login", None);
    if body["username"] == "admin" && body["password"] == "s3cret" {
        Json(json!({"access_token": ADMIN_TOKEN, "token_type": "bearer"})).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect username or password")
    }
}

async fn list_posts(State(state): Shared) -> Response {
    record(&state, Method::GET, "/api/posts", None);
    Json(state.lock().posts.clone()).into_response()
}

async fn list_projects(State(state): Shared) -> Response {
    record(&state, Method::GET, "/api/projects", None);
    Json(state.lock().projects.clone()).into_response()
}

async fn list_messages(State(state): Shared, headers: HeaderMap) -> Response {
    record(&state, Method::GET, "/api/admin/messages", None);
    if let Err(response) = require_admin(&headers) {
        return response;
    }
    let state = state.lock();
    if state.fail_messages {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    Json(state.messages.clone()).into_response()
}

fn post_record(id: i64, body: &Value) -> Value {
    json!({
        "id": id,
        "title": body["title"],
        "excerpt": body["excerpt"],
        "content": body["content"],
        "date": "2024-06-01",
        "readTime": body["read_time"],
        "category": body["category"],
        "tags": body["tags"],
        "slug": body["title"].as_str().unwrap_or_default().to_lowercase().replace(' ', "-"),
    })
}

fn project_record(id: i64, body: &Value) -> Value {
    json!({
        "id": id,
        "name": body["name"],
        "description": body["description"],
        "technologies": body["technologies"],
        "github": body["github"],
        "demo": body["demo"],
    })
}

fn insert(
    state: &Arc<Mutex<FakeState>>,
    select: fn(&mut FakeState) -> &mut Vec<Value>,
    build: fn(i64, &Value) -> Value,
    body: &Value,
) -> Response {
    let mut state = state.lock();
    let id = state.next_id;
    state.next_id += 1;
    let record = build(id, body);
    select(&mut state).insert(0, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

fn replace(
    state: &Arc<Mutex<FakeState>>,
    select: fn(&mut FakeState) -> &mut Vec<Value>,
    build: fn(i64, &Value) -> Value,
    id: i64,
    body: &Value,
) -> Response {
    let mut state = state.lock();
    let items = select(&mut state);
    match items.iter_mut().find(|item| item["id"] == json!(id)) {
        Some(slot) => {
            *slot = build(id, body);
            Json(slot.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn remove(
    state: &Arc<Mutex<FakeState>>,
    select: fn(&mut FakeState) -> &mut Vec<Value>,
    id: i64,
) -> Response {
    let mut state = state.lock();
    let items = select(&mut state);
    let before = items.len();
    items.retain(|item| item["id"] != json!(id));
    if items.len() == before {
        detail(StatusCode::NOT_FOUND, "Not found")
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn posts(state: &mut FakeState) -> &mut Vec<Value> {
    &mut state.posts
}

fn projects(state: &mut FakeState) -> &mut Vec<Value> {
    &mut state.projects
}

async fn create_post(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, Method::POST, "/api/admin/posts", Some(body.clone()));
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    insert(&state, posts, post_record, &body)
}

async fn update_post(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/api/admin/posts/{}", id);
    record(&state, Method::PUT, &path, Some(body.clone()));
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    replace(&state, posts, post_record, id, &body)
}

async fn delete_post(State(state): Shared, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    record(&state, Method::DELETE, &format!("/api/admin/posts/{}", id), None);
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    remove(&state, posts, id)
}

async fn create_project(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, Method::POST, "/api/admin/projects", Some(body.clone()));
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    insert(&state, projects, project_record, &body)
}

async fn update_project(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/api/admin/projects/{}", id);
    record(&state, Method::PUT, &path, Some(body.clone()));
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    replace(&state, projects, project_record, id, &body)
}

async fn delete_project(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    record(&state, Method::DELETE, &format!("/api/admin/projects/{}", id), None);
    if let Err(response) = guard_mutation(&state, &headers) {
        return response;
    }
    remove(&state, projects, id)
}

/// Prompt with scripted confirmations that records everything shown
#[derive(Default)]
pub struct RecordingPrompt {
    answers: Mutex<VecDeque<bool>>,
    pub questions: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    /// Prompt answering `answers` in order, then yes
    pub fn answering(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Default::default()
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }
}

impl Prompt for RecordingPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().push(question.to_string());
        self.answers.lock().pop_front().unwrap_or(true)
    }

    fn acknowledge(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
