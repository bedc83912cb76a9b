use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Load,
    Add,
    Update,
    Delete,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only failure the store reports: the remote call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("remote {operation} failed: {reason}")]
    Remote {
        operation: StoreOperation,
        reason: String,
    },
}

impl StoreError {
    pub fn operation(&self) -> StoreOperation {
        match self {
            Self::Remote { operation, .. } => *operation,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Remote { reason, .. } => reason,
        }
    }
}
