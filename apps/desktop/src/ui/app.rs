//! Terminal app shell: owns the controller and the command queue, turns
//! `UiEvent`s into controller calls, and redraws after each one.

use std::{
    io::{self, BufRead, Write},
    thread,
};

use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::TodoController,
};
use crate::ui::{
    input::{parse_intent, Intent, HELP},
    render::render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct TerminalApp {
    controller: TodoController,
    cmd_tx: Sender<BackendCommand>,
    status: String,
}

impl TerminalApp {
    pub fn new(controller: TodoController, cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            controller,
            cmd_tx,
            status: String::new(),
        }
    }

    pub fn start(&mut self) {
        if let Some(cmd) = self.controller.mount() {
            self.dispatch(cmd);
        }
    }

    pub fn frame(&self) -> String {
        render(&self.controller, &self.status)
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Flow {
        match event {
            UiEvent::Input(line) => return self.handle_input(&line),
            UiEvent::InputClosed => return Flow::Quit,
            UiEvent::Info(message) => {
                tracing::info!(%message, "backend info");
            }
            UiEvent::StoreChanged(snapshot) => self.controller.apply_snapshot(snapshot),
            UiEvent::OperationFailed(err) => self.controller.operation_failed(&err),
        }
        Flow::Continue
    }

    fn handle_input(&mut self, line: &str) -> Flow {
        self.status.clear();
        let intent = match parse_intent(line) {
            Ok(intent) => intent,
            Err(message) => {
                self.status = message;
                return Flow::Continue;
            }
        };

        match intent {
            Intent::OpenAdd => self.controller.open_add(),
            Intent::OpenEdit(id) => {
                self.controller.open_edit(id);
            }
            Intent::OpenDelete(id) => {
                self.controller.open_delete(id);
            }
            Intent::Type(text) => {
                if !self.controller.set_text(text) {
                    self.status = "open an add or edit dialog first".to_string();
                }
            }
            Intent::Confirm => {
                if let Some(cmd) = self.controller.confirm() {
                    if self.dispatch(cmd) {
                        self.controller.dispatched();
                    }
                }
            }
            Intent::Cancel => self.controller.cancel(),
            Intent::Reload => {
                self.dispatch(BackendCommand::Load);
            }
            Intent::Help => self.status = HELP.to_string(),
            Intent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }
}

/// Processes UI events one at a time until the user quits or every sender is gone.
pub fn run(mut app: TerminalApp, ui_rx: Receiver<UiEvent>, mut out: impl Write) -> io::Result<()> {
    app.start();
    draw(&app, &mut out)?;
    while let Ok(event) = ui_rx.recv() {
        let flow = app.handle_event(event);
        draw(&app, &mut out)?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

fn draw(app: &TerminalApp, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", app.frame())?;
    write!(out, "> ")?;
    out.flush()
}

/// Forwards stdin lines to the UI loop from a background thread.
pub fn spawn_stdin_reader(ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if ui_tx.send(UiEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "failed to read stdin");
                    break;
                }
            }
        }
        let _ = ui_tx.send(UiEvent::InputClosed);
    });
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
