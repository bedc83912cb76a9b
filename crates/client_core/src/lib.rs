//! Client-side todo state: the remote collection contract, its HTTP
//! implementation, id generation, and the store that owns the list.

pub mod collection;
pub mod error;
pub mod ids;
pub mod store;

pub use collection::{HttpTodoCollection, MissingTodoCollection, TodoCollection};
pub use error::{StoreError, StoreOperation};
pub use ids::{IdGenerator, MonotonicIds};
pub use store::{CollectionSnapshot, StoreEvent, SyncStatus, TodoStore};
