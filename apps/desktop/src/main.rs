use std::{io, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpTodoCollection, MonotonicIds, TodoStore};
use crossbeam_channel::{bounded, unbounded};
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use controller::reducer::TodoController;
use ui::{app::spawn_stdin_reader, TerminalApp};

const COMMAND_QUEUE_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(about = "Terminal todo list backed by a remote todo collection")]
struct Args {
    #[arg(long, env = "TODO_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    /// Log filter, e.g. `info` or `client_core=debug`. Logs go to stderr.
    #[arg(long, env = "TODO_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let collection = HttpTodoCollection::new(&args.server_url)
        .with_context(|| format!("cannot use server url '{}'", args.server_url))?;
    tracing::info!(server_url = %collection.base_url(), "starting todo client");
    let store = TodoStore::new(Arc::new(collection));

    let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = unbounded();
    let worker = backend_bridge::runtime::launch(store, cmd_rx, ui_tx.clone());
    spawn_stdin_reader(ui_tx);

    let controller = TodoController::new(Arc::new(MonotonicIds::from_clock()));
    let app = TerminalApp::new(controller, cmd_tx);
    ui::app::run(app, ui_rx, io::stdout().lock())?;

    // `run` consumed the app, so the command sender is gone and the worker drains.
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    Ok(())
}
