//! View state and its transitions.
//!
//! The controller never touches the store. It turns user gestures into
//! [`BackendCommand`]s and rebuilds its view from the snapshots the store
//! publishes. Dialogs go `Closed -> open -> confirmed -> dispatched -> Closed`;
//! a rejected confirmation keeps the dialog open with a field error.

use std::sync::Arc;

use client_core::{CollectionSnapshot, IdGenerator, StoreError, SyncStatus};
use shared::domain::{Todo, TodoId};

use crate::backend_bridge::commands::BackendCommand;

pub const FIELD_REQUIRED: &str = "Field is required.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub text: String,
    pub error: Option<String>,
}

impl TextField {
    fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    /// Text to dispatch, or `None` after flagging the field as required.
    fn validated(&mut self) -> Option<String> {
        if self.text.trim().is_empty() {
            self.error = Some(FIELD_REQUIRED.to_string());
            return None;
        }
        self.error = None;
        Some(self.text.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    #[default]
    Closed,
    Add(TextField),
    Edit {
        target: TodoId,
        field: TextField,
    },
    Delete {
        target: TodoId,
    },
}

pub struct TodoController {
    ids: Arc<dyn IdGenerator>,
    snapshot: CollectionSnapshot,
    dialog: Dialog,
    mounted: bool,
    notice: Option<String>,
}

impl TodoController {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            snapshot: CollectionSnapshot::default(),
            dialog: Dialog::Closed,
            mounted: false,
            notice: None,
        }
    }

    pub fn snapshot(&self) -> &CollectionSnapshot {
        &self.snapshot
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// First display. Only the first call asks for a load.
    pub fn mount(&mut self) -> Option<BackendCommand> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(BackendCommand::Load)
    }

    pub fn open_add(&mut self) {
        self.dialog = Dialog::Add(TextField::default());
    }

    /// Opens the edit dialog prefilled with the todo's current text.
    pub fn open_edit(&mut self, id: TodoId) -> bool {
        let Some(todo) = self.snapshot.find(id) else {
            self.notice = Some(format!("No todo with id {id}"));
            return false;
        };
        self.dialog = Dialog::Edit {
            target: id,
            field: TextField::with_text(todo.text.clone()),
        };
        true
    }

    pub fn open_delete(&mut self, id: TodoId) -> bool {
        if self.snapshot.find(id).is_none() {
            self.notice = Some(format!("No todo with id {id}"));
            return false;
        }
        self.dialog = Dialog::Delete { target: id };
        true
    }

    /// Replaces the text being composed. Ignored unless an add or edit dialog is open.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.dialog {
            Dialog::Add(field) | Dialog::Edit { field, .. } => {
                field.text = text.into();
                true
            }
            Dialog::Closed | Dialog::Delete { .. } => false,
        }
    }

    pub fn cancel(&mut self) {
        self.dialog = Dialog::Closed;
    }

    /// Validates the open dialog and returns the command to dispatch, if any.
    /// The dialog stays open until [`Self::dispatched`] is called, so a
    /// command that could not be queued keeps the draft.
    pub fn confirm(&mut self) -> Option<BackendCommand> {
        match &mut self.dialog {
            Dialog::Closed => None,
            Dialog::Add(field) => {
                let text = field.validated()?;
                Some(BackendCommand::Add(Todo::new(self.ids.next_id(), text)))
            }
            Dialog::Edit { target, field } => {
                let text = field.validated()?;
                Some(BackendCommand::Update { id: *target, text })
            }
            Dialog::Delete { target } => Some(BackendCommand::Delete { id: *target }),
        }
    }

    /// The confirmed command reached the backend queue.
    pub fn dispatched(&mut self) {
        self.dialog = Dialog::Closed;
    }

    pub fn apply_snapshot(&mut self, snapshot: CollectionSnapshot) {
        for todo in &snapshot.todos {
            self.ids.observe(todo.id);
        }
        match &snapshot.status {
            SyncStatus::Idle => self.notice = None,
            SyncStatus::Loading => {}
            SyncStatus::Failed { .. } => {
                self.notice
                    .get_or_insert_with(|| "Could not sync with the todo server.".to_string());
            }
        }
        self.snapshot = snapshot;
    }

    pub fn operation_failed(&mut self, error: &StoreError) {
        self.notice = Some(format!(
            "Could not {} todo: {}",
            error.operation(),
            error.reason()
        ));
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
