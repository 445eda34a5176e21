use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use todo_core::{HttpStore, StoreError, Todo, TodoError, TodoInput, TodoService};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::transport::ReqwestTransport;

pub type Store = HttpStore<ReqwestTransport>;
pub type AppService = TodoService<Store, Store>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AppService>,
}

/// Error body returned for every rejected request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error; maps service failures onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let ApiError::Todo(err) = self;
        match err {
            TodoError::ClientError(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Collaborator { source, .. } => match source {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                // A store's own error status goes back to the client unchanged.
                StoreError::Http { status, .. } => match StatusCode::from_u16(*status) {
                    Ok(code) if code.is_client_error() || code.is_server_error() => code,
                    _ => StatusCode::BAD_GATEWAY,
                },
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Wire both stores and the service from configuration.
pub fn build_service(config: &Config) -> anyhow::Result<AppService> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend = HttpStore::new(&config.backend_url, ReqwestTransport::new(timeout)?);
    let cache = HttpStore::new(&config.cache_url, ReqwestTransport::new(timeout)?);
    Ok(TodoService::new(backend, cache, config.limit))
}

pub fn create_router(service: Arc<AppService>) -> Router {
    let state = AppState { service };
    Router::new()
        .route(
            "/",
            get(list_todos_handler)
                .post(create_todo_handler)
                .delete(delete_all_handler),
        )
        .route(
            "/{id}",
            get(get_todo_handler)
                .post(replace_todo_handler)
                .patch(patch_todo_handler)
                .delete(delete_todo_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, service: AppService) -> Result<(), std::io::Error> {
    axum::serve(listener, create_router(Arc::new(service))).await
}

#[tracing::instrument(skip(config))]
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let service = build_service(&config)?;

    let server_address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&server_address).await?;
    tracing::info!(
        backend = %config.backend_url,
        cache = %config.cache_url,
        limit = config.limit,
        "Todos API running on http://{}",
        server_address
    );

    serve(listener, service).await?;
    Ok(())
}

#[tracing::instrument(skip(state))]
pub async fn list_todos_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.service.list_all().await?))
}

#[tracing::instrument(skip(state))]
pub async fn create_todo_handler(
    State(state): State<AppState>,
    Json(input): Json<TodoInput>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let created = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip(state))]
pub async fn get_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(state.service.get_by_id(&id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn replace_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(state.service.replace(&id, input).await?))
}

#[tracing::instrument(skip(state))]
pub async fn patch_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TodoInput>,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(state.service.patch(&id, input).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_by_id(&id).await?;
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(state))]
pub async fn delete_all_handler(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.service.delete_all().await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use todo_core::StoreRole;

    use super::*;

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn client_error_is_bad_request() {
        let err = ApiError::from(TodoError::ClientError("todos.title cannot be null".into()));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            r#"{"error":"todos.title cannot be null"}"#
        );
    }

    #[tokio::test]
    async fn not_found_names_the_id() {
        let response = ApiError::from(TodoError::NotFound("abc".into())).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, r#"{"error":"todo.id = abc"}"#);
    }

    #[test]
    fn store_status_is_passed_through() {
        let err = ApiError::from(TodoError::Collaborator {
            store: StoreRole::Cache,
            source: StoreError::Http {
                status: 503,
                body: "unavailable".into(),
            },
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn store_non_error_status_is_bad_gateway() {
        for status in [304, 302, 100] {
            let err = ApiError::from(TodoError::Collaborator {
                store: StoreRole::Backend,
                source: StoreError::Http {
                    status,
                    body: String::new(),
                },
            });
            assert_eq!(err.status(), StatusCode::BAD_GATEWAY, "store status {status}");
        }
    }

    #[test]
    fn unreachable_store_is_bad_gateway() {
        let err = ApiError::from(TodoError::Collaborator {
            store: StoreRole::Backend,
            source: StoreError::Transport("connection refused".into()),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
