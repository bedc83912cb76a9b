use std::fmt::Write as _;

use client_core::SyncStatus;

use crate::controller::reducer::{Dialog, TextField, TodoController};

const ID_WIDTH: usize = 16;

/// Plain-text frame for the current controller state.
pub fn render(controller: &TodoController, status: &str) -> String {
    let mut out = String::new();
    let snapshot = controller.snapshot();

    let _ = writeln!(out, "Todo App");
    let _ = writeln!(out, "{:<ID_WIDTH$}  Todo List", "ID");
    let _ = writeln!(out, "{}", "-".repeat(ID_WIDTH + 12));
    if snapshot.todos.is_empty() {
        let _ = writeln!(out, "(no todos)");
    }
    for todo in &snapshot.todos {
        let _ = writeln!(out, "{:<ID_WIDTH$}  {}", todo.id.0, todo.text);
    }

    if snapshot.status == SyncStatus::Loading {
        let _ = writeln!(out, "[syncing...]");
    }
    if let Some(notice) = controller.notice() {
        let _ = writeln!(out, "! {notice}");
    }
    if !status.is_empty() {
        let _ = writeln!(out, "! {status}");
    }

    match controller.dialog() {
        Dialog::Closed => {}
        Dialog::Add(field) => render_text_dialog(&mut out, "Add New Todo", "New Todo", field),
        Dialog::Edit { field, .. } => render_text_dialog(&mut out, "Edit Todo", "Todo", field),
        Dialog::Delete { target } => {
            let _ = writeln!(out, "\n== Confirm Delete ==");
            let _ = writeln!(
                out,
                "Are you sure you want to delete this todo item? (#{target})"
            );
            let _ = writeln!(out, "[save] Delete  [cancel] Cancel");
        }
    }

    out
}

fn render_text_dialog(out: &mut String, title: &str, label: &str, field: &TextField) {
    let _ = writeln!(out, "\n== {title} ==");
    let _ = writeln!(out, "{label}: {}", field.text);
    if let Some(error) = &field.error {
        let _ = writeln!(out, "  {error}");
    }
    let _ = writeln!(out, "[type <text>] edit  [save] Save  [cancel] Cancel");
}
