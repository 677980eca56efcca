//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and error markers
//! - [`report`]: Tab bar over the compilation result (errors, operators, structures)
//! - [`diagram`]: Flowchart of the program, styled by its configuration directives
//! - [`status`]: Status bar with keybindings and the compilation outcome
//!
//! Each pane module exports a primary `render_*` function plus the state or
//! render-data types it needs.

pub mod diagram;
pub mod report;
pub mod source;
pub mod status;

// Re-export render functions for convenience
pub use diagram::{render_diagram_pane, StyleTable};
pub use report::{render_report_pane, ReportRenderData};
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::render_status_bar;
