use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::str::FromStr;

use shared::domain::{Todo, TodoId};

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredTodo {
    pub todo: Todo,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database gets its own empty database.
        let max_connections = if database_url.starts_with(IN_MEMORY_URL) {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Todos in insertion order.
    pub async fn list_todos(&self) -> Result<Vec<StoredTodo>> {
        let rows = sqlx::query("SELECT id, text, created_at FROM todos ORDER BY position ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list todos")?;
        Ok(rows.into_iter().map(stored_todo_from_row).collect())
    }

    /// Inserts `todo` at the end of the list. `None` when a todo with the same id
    /// already exists; the stored row is left as is.
    pub async fn insert_todo(&self, todo: &Todo) -> Result<Option<StoredTodo>> {
        let row = sqlx::query(
            "INSERT INTO todos (id, text) VALUES (?, ?) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING id, text, created_at",
        )
        .bind(todo.id.0)
        .bind(&todo.text)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to insert todo {}", todo.id))?;
        Ok(row.map(stored_todo_from_row))
    }

    /// Replaces the text of an existing todo. `None` when no row has `id`.
    pub async fn update_todo_text(&self, id: TodoId, text: &str) -> Result<Option<StoredTodo>> {
        let row = sqlx::query(
            "UPDATE todos SET text = ? WHERE id = ? RETURNING id, text, created_at",
        )
        .bind(text)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update todo {id}"))?;
        Ok(row.map(stored_todo_from_row))
    }

    /// Returns whether a row was removed.
    pub async fn delete_todo(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete todo {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn stored_todo_from_row(row: sqlx::sqlite::SqliteRow) -> StoredTodo {
    StoredTodo {
        todo: Todo {
            id: TodoId(row.get::<i64, _>("id")),
            text: row.get::<String, _>("text"),
        },
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
