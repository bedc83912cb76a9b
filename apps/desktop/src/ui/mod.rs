//! Terminal UI layer: command parsing, text rendering, and the event loop.

pub mod app;
pub mod input;
pub mod render;

pub use app::TerminalApp;
