//! # Introduction
//!
//! decompi is a compiler front-end for a small educational pseudocode
//! language. It tokenizes and parses a program, recovers from errors so that
//! one pass reports as many problems as possible, and collects two auxiliary
//! reports used by the course tooling: every operator occurrence and every
//! control structure.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → (AST, diagnostics, reports) → CompilationResult → CLI / TUI
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST, recording
//!    diagnostics and report rows as it goes.
//! 2. [`diagnostics`]: the flat error and report records.
//! 3. [`compiler`]: runs one compilation and normalizes every outcome,
//!    fatal failures included, into a [`CompilationResult`].
//! 4. [`ui`]: ratatui-based report viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! let result = decompi::compile("var x = 2\nif x > 1 { show \"big\" }");
//! assert!(result.errors.is_empty());
//! assert_eq!(result.control_report[0].condition, "x > 1");
//! ```

pub mod compiler;
pub mod diagnostics;
pub mod parser;
pub mod ui;

pub use compiler::{compile, CompilationResult, Compiler};
