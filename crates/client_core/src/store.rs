//! Single source of truth for the todo list.
//!
//! Each operation issues one remote call and mutates the list only after that
//! call resolves. A failed call leaves the list untouched and records the
//! failure in [`SyncStatus`]; nothing is retried. Calls may overlap, and the
//! status always describes the most recently started one.

use std::sync::Arc;

use shared::domain::{Todo, TodoId};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::{
    collection::TodoCollection,
    error::{StoreError, StoreOperation},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub todos: Vec<Todo>,
    pub status: SyncStatus,
}

impl CollectionSnapshot {
    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    Changed(CollectionSnapshot),
}

/// Bookkeeping for overlapping remote calls.
///
/// `status` follows the most recently started call: `Loading` until it
/// resolves, then its outcome. A success only reads `Idle` once no other
/// call is still in flight.
#[derive(Debug, Default)]
struct StoreState {
    snapshot: CollectionSnapshot,
    latest_attempt: u64,
    latest_outcome: Option<SyncStatus>,
    in_flight: usize,
}

impl StoreState {
    fn settled_status(&self) -> SyncStatus {
        match &self.latest_outcome {
            None => SyncStatus::Loading,
            Some(SyncStatus::Failed { reason }) => SyncStatus::Failed {
                reason: reason.clone(),
            },
            Some(_) if self.in_flight > 0 => SyncStatus::Loading,
            Some(_) => SyncStatus::Idle,
        }
    }
}

pub struct TodoStore {
    collection: Arc<dyn TodoCollection>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl TodoStore {
    pub fn new(collection: Arc<dyn TodoCollection>) -> Arc<Self> {
        Self::with_todos(collection, Vec::new())
    }

    pub fn with_todos(collection: Arc<dyn TodoCollection>, todos: Vec<Todo>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            collection,
            state: RwLock::new(StoreState {
                snapshot: CollectionSnapshot {
                    todos,
                    status: SyncStatus::Idle,
                },
                ..StoreState::default()
            }),
            events,
        })
    }

    pub async fn snapshot(&self) -> CollectionSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replaces the list with the collection's contents, in the collection's order.
    pub async fn load(&self) -> Result<(), StoreError> {
        let attempt = self.begin(StoreOperation::Load).await;
        let result = self.collection.list_todos().await;
        self.finish(StoreOperation::Load, attempt, result, |todos, fetched| {
            *todos = fetched;
        })
        .await
    }

    /// Appends the acknowledged todo to the end of the list.
    pub async fn add(&self, todo: Todo) -> Result<(), StoreError> {
        let attempt = self.begin(StoreOperation::Add).await;
        let result = self.collection.create_todo(&todo).await;
        self.finish(StoreOperation::Add, attempt, result, |todos, acknowledged| {
            todos.push(acknowledged);
        })
        .await
    }

    /// Replaces the text of the todo with `id` in place. A missing `id` leaves the list as is.
    pub async fn update(&self, id: TodoId, text: impl Into<String>) -> Result<(), StoreError> {
        let text = text.into();
        let attempt = self.begin(StoreOperation::Update).await;
        let result = self.collection.update_todo(id, &text).await;
        self.finish(StoreOperation::Update, attempt, result, |todos, acknowledged| {
            match todos.iter_mut().find(|todo| todo.id == id) {
                Some(todo) => todo.text = acknowledged.text,
                None => debug!(todo_id = id.0, "updated todo is not in the local list"),
            }
        })
        .await
    }

    /// Removes the first todo with `id`. A missing `id` leaves the list as is.
    pub async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let attempt = self.begin(StoreOperation::Delete).await;
        let result = self.collection.delete_todo(id).await;
        self.finish(StoreOperation::Delete, attempt, result, |todos, ()| {
            if let Some(position) = todos.iter().position(|todo| todo.id == id) {
                todos.remove(position);
            }
        })
        .await
    }

    async fn begin(&self, operation: StoreOperation) -> u64 {
        let (attempt, snapshot) = {
            let mut state = self.state.write().await;
            state.latest_attempt += 1;
            state.latest_outcome = None;
            state.in_flight += 1;
            state.snapshot.status = SyncStatus::Loading;
            (state.latest_attempt, state.snapshot.clone())
        };
        debug!(operation = operation.as_str(), attempt, "remote call started");
        self.publish(snapshot);
        attempt
    }

    async fn finish<T>(
        &self,
        operation: StoreOperation,
        attempt: u64,
        result: anyhow::Result<T>,
        apply: impl FnOnce(&mut Vec<Todo>, T),
    ) -> Result<(), StoreError> {
        let (outcome, snapshot) = {
            let mut state = self.state.write().await;
            state.in_flight = state.in_flight.saturating_sub(1);
            let (outcome, status) = match result {
                Ok(value) => {
                    apply(&mut state.snapshot.todos, value);
                    (Ok(()), SyncStatus::Idle)
                }
                Err(error) => {
                    let reason = format!("{error:#}");
                    warn!(operation = operation.as_str(), attempt, %reason, "remote call failed");
                    let status = SyncStatus::Failed {
                        reason: reason.clone(),
                    };
                    (Err(StoreError::Remote { operation, reason }), status)
                }
            };
            if attempt == state.latest_attempt {
                state.latest_outcome = Some(status);
            } else {
                debug!(
                    operation = operation.as_str(),
                    attempt,
                    latest = state.latest_attempt,
                    "superseded call resolved"
                );
            }
            state.snapshot.status = state.settled_status();
            (outcome, state.snapshot.clone())
        };
        self.publish(snapshot);
        outcome
    }

    fn publish(&self, snapshot: CollectionSnapshot) {
        // No subscribers is fine; snapshots can still be pulled.
        let _ = self.events.send(StoreEvent::Changed(snapshot));
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
