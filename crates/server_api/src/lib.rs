use shared::{
    domain::{Todo, TodoId},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_todos(ctx: &ApiContext) -> Result<Vec<Todo>, ApiError> {
    let todos = ctx.storage.list_todos().await.map_err(internal)?;
    Ok(todos.into_iter().map(|stored| stored.todo).collect())
}

pub async fn create_todo(ctx: &ApiContext, id: TodoId, text: &str) -> Result<Todo, ApiError> {
    let text = require_text(text)?;
    let stored = ctx
        .storage
        .insert_todo(&Todo::new(id, text))
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::Validation,
                format!("todo id {id} already exists"),
            )
        })?;
    info!(todo_id = id.0, created_at = %stored.created_at, "todo created");
    Ok(stored.todo)
}

pub async fn update_todo(ctx: &ApiContext, id: TodoId, text: &str) -> Result<Todo, ApiError> {
    let text = require_text(text)?;
    let stored = ctx
        .storage
        .update_todo_text(id, text)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("todo {id} not found")))?;
    Ok(stored.todo)
}

/// Deleting an id that is not stored succeeds; callers can retry freely.
pub async fn delete_todo(ctx: &ApiContext, id: TodoId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_todo(id).await.map_err(internal)?;
    info!(todo_id = id.0, removed, "todo delete handled");
    Ok(())
}

fn require_text(text: &str) -> Result<&str, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "todo text is required"));
    }
    Ok(text)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
