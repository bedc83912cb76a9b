//! Events delivered to the UI thread.

use client_core::{CollectionSnapshot, StoreError};

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// One line typed by the user.
    Input(String),
    InputClosed,
    Info(String),
    StoreChanged(CollectionSnapshot),
    OperationFailed(StoreError),
}
