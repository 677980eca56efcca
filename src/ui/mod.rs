//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state and the keyboard event loop
//! - **[`panes`]**: render functions for each visible pane (source, report tabs,
//!   diagram, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`CompilationResult`] and call [`App::run`] to start the event loop.
//!
//! [`CompilationResult`]: crate::compiler::CompilationResult
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
