use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Todo, TodoId},
    error::{ApiError, ApiException},
    protocol::{CreateTodoRequest, UpdateTodoRequest},
};
use tracing::debug;
use url::Url;

/// The remote todo collection the store synchronizes with.
///
/// `delete_todo` on an id the collection does not hold succeeds;
/// `update_todo` on such an id fails.
#[async_trait]
pub trait TodoCollection: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<Todo>>;
    async fn create_todo(&self, todo: &Todo) -> Result<Todo>;
    async fn update_todo(&self, id: TodoId, text: &str) -> Result<Todo>;
    async fn delete_todo(&self, id: TodoId) -> Result<()>;
}

pub struct MissingTodoCollection;

#[async_trait]
impl TodoCollection for MissingTodoCollection {
    async fn list_todos(&self) -> Result<Vec<Todo>> {
        Err(anyhow!("todo collection endpoint is unavailable"))
    }

    async fn create_todo(&self, todo: &Todo) -> Result<Todo> {
        Err(anyhow!(
            "todo collection endpoint is unavailable; cannot create todo {}",
            todo.id
        ))
    }

    async fn update_todo(&self, id: TodoId, _text: &str) -> Result<Todo> {
        Err(anyhow!(
            "todo collection endpoint is unavailable; cannot update todo {id}"
        ))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        Err(anyhow!(
            "todo collection endpoint is unavailable; cannot delete todo {id}"
        ))
    }
}

/// REST client for `/todos`.
pub struct HttpTodoCollection {
    http: Client,
    base_url: Url,
}

impl HttpTodoCollection {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "unsupported scheme '{}' in server url '{server_url}'",
                base_url.scheme()
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build url for '{path}'"))
    }
}

#[async_trait]
impl TodoCollection for HttpTodoCollection {
    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let response = self
            .http
            .get(self.endpoint("todos")?)
            .send()
            .await
            .context("failed to reach todo collection")?;
        let todos: Vec<Todo> = check_status(response).await?.json().await?;
        debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    async fn create_todo(&self, todo: &Todo) -> Result<Todo> {
        let response = self
            .http
            .post(self.endpoint("todos")?)
            .json(&CreateTodoRequest::from(todo))
            .send()
            .await
            .context("failed to reach todo collection")?;
        let acknowledged = acknowledged_todo(check_status(response).await?).await?;
        Ok(acknowledged.unwrap_or_else(|| todo.clone()))
    }

    async fn update_todo(&self, id: TodoId, text: &str) -> Result<Todo> {
        let response = self
            .http
            .patch(self.endpoint(&format!("todos/{id}"))?)
            .json(&UpdateTodoRequest {
                todo: text.to_string(),
            })
            .send()
            .await
            .context("failed to reach todo collection")?;
        let acknowledged = acknowledged_todo(check_status(response).await?).await?;
        Ok(acknowledged.unwrap_or_else(|| Todo::new(id, text)))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("todos/{id}"))?)
            .send()
            .await
            .context("failed to reach todo collection")?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(todo_id = id.0, "delete of absent todo treated as done");
            return Ok(());
        }
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-success response into an error carrying the server's message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(anyhow::Error::new(ApiException::from(api_error))
            .context(format!("todo collection returned {status}"))),
        Err(_) if body.trim().is_empty() => Err(anyhow!("todo collection returned {status}")),
        Err(_) => Err(anyhow!("todo collection returned {status}: {}", body.trim())),
    }
}

/// The todo echoed back by the server, or `None` when the body is empty.
async fn acknowledged_todo(response: Response) -> Result<Option<Todo>> {
    let body = response
        .bytes()
        .await
        .context("failed to read todo collection response")?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let todo = serde_json::from_slice(&body).context("malformed todo in collection response")?;
    Ok(Some(todo))
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
