use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub deadline: String,
}

pub type Db = Arc<RwLock<HashMap<String, Todo>>>;

/// Router over a fresh, empty store.
pub fn app() -> Router {
    app_with(Db::default())
}

/// Router over `db`, so tests can inspect or seed the store directly.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(upsert_todo).delete(delete_all),
        )
        .route("/todos/{id}", get(get_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    let mut all: Vec<Todo> = todos.values().cloned().collect();
    all.sort_by(|a, b| a.id.cmp(&b.id));
    Json(all)
}

/// Create or overwrite by id. An omitted title keeps the stored one.
async fn upsert_todo(
    State(db): State<Db>,
    Json(mut input): Json<Todo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if input.id.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut todos = db.write().await;
    let status = match todos.get(&input.id) {
        Some(existing) => {
            if input.title.is_none() {
                input.title = existing.title.clone();
            }
            StatusCode::OK
        }
        None => StatusCode::CREATED,
    };
    tracing::debug!(id = %input.id, %status, "upsert");
    todos.insert(input.id.clone(), input.clone());
    Ok((status, Json(input)))
}

async fn get_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, StatusCode> {
    let todos = db.read().await;
    todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = db.write().await;
    todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_all(State(db): State<Db>) -> StatusCode {
    db.write().await.clear();
    StatusCode::NO_CONTENT
}
