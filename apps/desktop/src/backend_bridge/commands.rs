//! Backend commands queued from UI to backend worker.

use shared::domain::{Todo, TodoId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Load,
    Add(Todo),
    Update { id: TodoId, text: String },
    Delete { id: TodoId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add(_) => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
