use serde::{Deserialize, Serialize};

use crate::domain::{Todo, TodoId};

/// Body of `POST /todos`. The client picks the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub id: TodoId,
    pub todo: String,
}

impl From<&Todo> for CreateTodoRequest {
    fn from(value: &Todo) -> Self {
        Self {
            id: value.id,
            todo: value.text.clone(),
        }
    }
}

/// Body of `PATCH /todos/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub todo: String,
}
