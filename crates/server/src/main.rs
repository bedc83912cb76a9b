use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use server_api::ApiContext;
use shared::{
    domain::{Todo, TodoId},
    error::{ApiError, ErrorCode},
    protocol::{CreateTodoRequest, UpdateTodoRequest},
};
use storage::Storage;
use tracing::{error, info};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "todo collection endpoint listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/todos", get(http_list_todos).post(http_create_todo))
        .route(
            "/todos/:todo_id",
            patch(http_update_todo).delete(http_delete_todo),
        )
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| api_error(ApiError::new(ErrorCode::Internal, e.to_string())))?;
    Ok("ok")
}

async fn http_list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = server_api::list_todos(&state.api).await.map_err(api_error)?;
    Ok(Json(todos))
}

async fn http_create_todo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = server_api::create_todo(&state.api, req.id, &req.todo)
        .await
        .map_err(api_error)?;
    Ok(Json(todo))
}

async fn http_update_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<i64>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = server_api::update_todo(&state.api, TodoId(todo_id), &req.todo)
        .await
        .map_err(api_error)?;
    Ok(Json(todo))
}

async fn http_delete_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<i64>,
) -> ApiResult<StatusCode> {
    server_api::delete_todo(&state.api, TodoId(todo_id))
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn api_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => {
            error!(message = %err.message, "internal error while serving todo request");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
