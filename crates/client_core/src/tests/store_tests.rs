use super::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

/// In-memory collection that behaves like a stable server.
struct TestCollection {
    todos: Mutex<Vec<Todo>>,
    fail_with: Option<String>,
    calls: Mutex<Vec<StoreOperation>>,
}

impl TestCollection {
    fn with(todos: Vec<Todo>) -> Self {
        Self {
            todos: Mutex::new(todos),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: impl Into<String>) -> Self {
        Self {
            fail_with: Some(err.into()),
            ..Self::with(Vec::new())
        }
    }

    async fn record(&self, operation: StoreOperation) -> Result<()> {
        self.calls.lock().await.push(operation);
        match &self.fail_with {
            Some(err) => Err(anyhow!(err.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoCollection for TestCollection {
    async fn list_todos(&self) -> Result<Vec<Todo>> {
        self.record(StoreOperation::Load).await?;
        Ok(self.todos.lock().await.clone())
    }

    async fn create_todo(&self, todo: &Todo) -> Result<Todo> {
        self.record(StoreOperation::Add).await?;
        self.todos.lock().await.push(todo.clone());
        Ok(todo.clone())
    }

    async fn update_todo(&self, id: TodoId, text: &str) -> Result<Todo> {
        self.record(StoreOperation::Update).await?;
        let mut todos = self.todos.lock().await;
        let todo = todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or_else(|| anyhow!("todo {id} not found"))?;
        todo.text = text.to_string();
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        self.record(StoreOperation::Delete).await?;
        self.todos.lock().await.retain(|todo| todo.id != id);
        Ok(())
    }
}

fn todo(id: i64, text: &str) -> Todo {
    Todo::new(TodoId(id), text)
}

async fn seeded_store(todos: Vec<Todo>) -> (Arc<TodoStore>, Arc<TestCollection>) {
    let collection = Arc::new(TestCollection::with(todos));
    let store = TodoStore::new(collection.clone());
    store.load().await.expect("initial load");
    (store, collection)
}

#[tokio::test]
async fn load_replaces_list_in_collection_order() {
    let collection = Arc::new(TestCollection::with(vec![todo(3, "c"), todo(1, "a")]));
    let store = TodoStore::with_todos(collection, vec![todo(9, "stale")]);

    store.load().await.expect("load");

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.todos, vec![todo(3, "c"), todo(1, "a")]);
    assert_eq!(snapshot.status, SyncStatus::Idle);
}

#[tokio::test]
async fn failed_load_keeps_previous_list_and_records_reason() {
    let store = TodoStore::with_todos(
        Arc::new(TestCollection::failing("connection refused")),
        vec![todo(1, "a")],
    );

    let err = store.load().await.expect_err("load should fail");
    assert_eq!(err.operation(), StoreOperation::Load);
    assert!(err.reason().contains("connection refused"));

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.todos, vec![todo(1, "a")]);
    assert!(matches!(
        snapshot.status,
        SyncStatus::Failed { ref reason } if reason.contains("connection refused")
    ));
}

#[tokio::test]
async fn add_appends_to_the_end() {
    let (store, _) = seeded_store(vec![todo(1, "a")]).await;

    store.add(todo(2, "b")).await.expect("add");

    assert_eq!(
        store.snapshot().await.todos,
        vec![todo(1, "a"), todo(2, "b")]
    );
}

#[tokio::test]
async fn update_replaces_text_in_place() {
    let (store, _) = seeded_store(vec![todo(1, "a"), todo(2, "b")]).await;

    store.update(TodoId(1), "a2").await.expect("update");

    assert_eq!(
        store.snapshot().await.todos,
        vec![todo(1, "a2"), todo(2, "b")]
    );
}

#[tokio::test]
async fn update_of_id_missing_locally_leaves_list_unchanged() {
    let collection = Arc::new(TestCollection::with(vec![todo(5, "remote only")]));
    let store = TodoStore::with_todos(collection, vec![todo(1, "a")]);

    store.update(TodoId(5), "changed").await.expect("update");

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.todos, vec![todo(1, "a")]);
    assert_eq!(snapshot.status, SyncStatus::Idle);
}

#[tokio::test]
async fn update_rejected_by_collection_is_a_failure() {
    let (store, _) = seeded_store(vec![todo(1, "a")]).await;

    let err = store
        .update(TodoId(42), "x")
        .await
        .expect_err("unknown id should fail remotely");
    assert_eq!(err.operation(), StoreOperation::Update);
    assert_eq!(store.snapshot().await.todos, vec![todo(1, "a")]);
}

#[tokio::test]
async fn delete_removes_exactly_one_and_second_delete_is_a_noop() {
    let (store, _) = seeded_store(vec![todo(1, "a"), todo(2, "b")]).await;

    store.delete(TodoId(1)).await.expect("delete");
    assert_eq!(store.snapshot().await.todos, vec![todo(2, "b")]);

    store.delete(TodoId(1)).await.expect("second delete");
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.todos, vec![todo(2, "b")]);
    assert_eq!(snapshot.status, SyncStatus::Idle);
}

#[tokio::test]
async fn delete_removes_only_the_first_duplicate() {
    let collection = Arc::new(TestCollection::with(Vec::new()));
    let store = TodoStore::with_todos(collection, vec![todo(1, "a"), todo(1, "dup")]);

    store.delete(TodoId(1)).await.expect("delete");

    assert_eq!(store.snapshot().await.todos, vec![todo(1, "dup")]);
}

#[tokio::test]
async fn failed_mutations_leave_list_unchanged() {
    let store = TodoStore::with_todos(
        Arc::new(TestCollection::failing("503 service unavailable")),
        vec![todo(1, "a")],
    );

    assert!(store.add(todo(2, "b")).await.is_err());
    assert!(store.update(TodoId(1), "a2").await.is_err());
    assert!(store.delete(TodoId(1)).await.is_err());

    assert_eq!(store.snapshot().await.todos, vec![todo(1, "a")]);
}

#[tokio::test]
async fn add_then_load_contains_text_exactly_once() {
    let (store, collection) = seeded_store(vec![todo(1, "a")]).await;

    store.add(todo(2, "write report")).await.expect("add");
    store.load().await.expect("reload");

    let snapshot = store.snapshot().await;
    let matches = snapshot
        .todos
        .iter()
        .filter(|todo| todo.text == "write report")
        .count();
    assert_eq!(matches, 1);
    assert_eq!(
        *collection.calls.lock().await,
        vec![
            StoreOperation::Load,
            StoreOperation::Add,
            StoreOperation::Load
        ]
    );
}

#[tokio::test]
async fn scenario_add_update_delete() {
    let (store, _) = seeded_store(vec![todo(1, "a")]).await;

    store.add(todo(2, "b")).await.expect("add");
    assert_eq!(
        store.snapshot().await.todos,
        vec![todo(1, "a"), todo(2, "b")]
    );

    store.update(TodoId(1), "a2").await.expect("update");
    assert_eq!(
        store.snapshot().await.todos,
        vec![todo(1, "a2"), todo(2, "b")]
    );

    store.delete(TodoId(1)).await.expect("delete");
    assert_eq!(store.snapshot().await.todos, vec![todo(2, "b")]);
}

#[tokio::test]
async fn subscribers_see_loading_then_settled_snapshot() {
    let collection = Arc::new(TestCollection::with(vec![todo(1, "a")]));
    let store = TodoStore::new(collection);
    let mut events = store.subscribe();

    store.load().await.expect("load");

    let StoreEvent::Changed(first) = events.recv().await.expect("first event");
    assert_eq!(first.status, SyncStatus::Loading);
    assert!(first.todos.is_empty());

    let StoreEvent::Changed(second) = events.recv().await.expect("second event");
    assert_eq!(second.status, SyncStatus::Idle);
    assert_eq!(second.todos, vec![todo(1, "a")]);
}

#[tokio::test]
async fn missing_collection_reports_failure() {
    let store = TodoStore::new(Arc::new(crate::MissingTodoCollection));
    let err = store.load().await.expect_err("no endpoint");
    assert!(err.reason().contains("unavailable"));
}

/// Collection whose `list_todos` parks until released, so other calls can
/// start and finish while a load is still outstanding.
struct GatedCollection {
    entered: Notify,
    release: Notify,
    load_error: Option<String>,
}

impl GatedCollection {
    fn new(load_error: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            load_error: load_error.map(str::to_string),
        })
    }
}

#[async_trait]
impl TodoCollection for GatedCollection {
    async fn list_todos(&self) -> Result<Vec<Todo>> {
        self.entered.notify_one();
        self.release.notified().await;
        match &self.load_error {
            Some(err) => Err(anyhow!(err.clone())),
            None => Ok(vec![todo(1, "a")]),
        }
    }

    async fn create_todo(&self, todo: &Todo) -> Result<Todo> {
        Ok(todo.clone())
    }

    async fn update_todo(&self, _id: TodoId, _text: &str) -> Result<Todo> {
        Err(anyhow!("boom"))
    }

    async fn delete_todo(&self, _id: TodoId) -> Result<()> {
        Ok(())
    }
}

async fn start_gated_load(
    collection: &Arc<GatedCollection>,
) -> (Arc<TodoStore>, tokio::task::JoinHandle<Result<(), StoreError>>) {
    let store = TodoStore::new(collection.clone());
    let pending = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.load().await }
    });
    collection.entered.notified().await;
    (store, pending)
}

#[tokio::test]
async fn status_stays_loading_while_an_older_call_is_pending() {
    let collection = GatedCollection::new(None);
    let (store, pending) = start_gated_load(&collection).await;

    store.add(todo(2, "b")).await.expect("add");
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.status, SyncStatus::Loading);
    assert_eq!(snapshot.todos, vec![todo(2, "b")]);

    collection.release.notify_one();
    pending.await.expect("join").expect("load");
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.status, SyncStatus::Idle);
    assert_eq!(snapshot.todos, vec![todo(1, "a")]);
}

#[tokio::test]
async fn newest_failure_survives_an_older_success() {
    let collection = GatedCollection::new(None);
    let (store, pending) = start_gated_load(&collection).await;

    store
        .update(TodoId(1), "x")
        .await
        .expect_err("update fails");
    let failed = SyncStatus::Failed {
        reason: "boom".to_string(),
    };
    assert_eq!(store.snapshot().await.status, failed);

    collection.release.notify_one();
    pending.await.expect("join").expect("load");
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.status, failed);
    assert_eq!(snapshot.todos, vec![todo(1, "a")]);
}

#[tokio::test]
async fn older_failure_does_not_override_newest_success() {
    let collection = GatedCollection::new(Some("timed out"));
    let (store, pending) = start_gated_load(&collection).await;

    store.add(todo(2, "b")).await.expect("add");

    collection.release.notify_one();
    let err = pending.await.expect("join").expect_err("load fails");
    assert_eq!(err.operation(), StoreOperation::Load);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.status, SyncStatus::Idle);
    assert_eq!(snapshot.todos, vec![todo(2, "b")]);
}

#[tokio::test]
async fn published_statuses_follow_the_newest_call() {
    let collection = GatedCollection::new(None);
    let store = TodoStore::new(collection.clone());
    let mut events = store.subscribe();
    let pending = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.load().await }
    });
    collection.entered.notified().await;

    store.update(TodoId(1), "x").await.expect_err("update fails");
    collection.release.notify_one();
    pending.await.expect("join").expect("load");

    let mut statuses = Vec::new();
    while let Ok(StoreEvent::Changed(snapshot)) = events.try_recv() {
        statuses.push(snapshot.status);
    }
    let failed = SyncStatus::Failed {
        reason: "boom".to_string(),
    };
    assert_eq!(
        statuses,
        vec![
            SyncStatus::Loading,
            SyncStatus::Loading,
            failed.clone(),
            failed
        ]
    );
}
