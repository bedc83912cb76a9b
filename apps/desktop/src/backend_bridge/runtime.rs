//! Runtime bridge between UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::{StoreEvent, TodoStore};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Runs store operations on a dedicated tokio runtime thread.
///
/// Each command runs as its own task, so a slow call never holds up the
/// next one. The thread exits once every command sender is dropped.
pub fn launch(
    store: Arc<TodoStore>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Info(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut events = store.subscribe();
            let snapshot_tx = ui_tx.clone();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(StoreEvent::Changed(snapshot)) => {
                            if snapshot_tx.send(UiEvent::StoreChanged(snapshot)).is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "ui fell behind store events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let _ = ui_tx.send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let store = Arc::clone(&store);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    let result = match cmd {
                        BackendCommand::Load => store.load().await,
                        BackendCommand::Add(todo) => store.add(todo).await,
                        BackendCommand::Update { id, text } => store.update(id, text).await,
                        BackendCommand::Delete { id } => store.delete(id).await,
                    };
                    match result {
                        Ok(()) => tracing::debug!(command = name, "store command finished"),
                        Err(err) => {
                            let _ = ui_tx.send(UiEvent::OperationFailed(err));
                        }
                    }
                });
            }
            tracing::info!("command queue closed; backend worker stopping");
        });
    })
}
