//! Compilation driver
//!
//! One call to [`Compiler::compile`] runs a fresh lexer and parser over the
//! source and always returns a [`CompilationResult`]. Nothing escapes this
//! boundary: parse failures and panics inside the front-end are turned into
//! diagnostics.
//!
//! # Contract on `program`
//!
//! `program` is `None` only when the parse failed outright. After ordinary
//! recovery it holds a best-effort tree *next to* the errors; such a tree is
//! not authoritative, and consumers should go through
//! [`CompilationResult::authoritative_program`].

use crate::diagnostics::{CompilationError, ControlStructure, OperatorOccurrence};
use crate::parser::ast::Program;
use crate::parser::lexer::Lexer;
use crate::parser::{Parser, DEFAULT_MAX_DEPTH};
use log::{debug, warn};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

/// Everything one compilation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub program: Option<Program>,
    pub errors: Vec<CompilationError>,
    pub operator_report: Vec<OperatorOccurrence>,
    pub control_report: Vec<ControlStructure>,
}

impl CompilationResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.program.is_some()
    }

    /// The program, if it can be trusted: present and with no diagnostics.
    pub fn authoritative_program(&self) -> Option<&Program> {
        if self.errors.is_empty() {
            self.program.as_ref()
        } else {
            None
        }
    }
}

/// Stateless front-end driver. Safe to share between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    max_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit on nested blocks, parentheses, unary operators and operator
    /// chains.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn compile(&self, source: &str) -> CompilationResult {
        let mut parser = Parser::new(Lexer::new(source)).with_max_depth(self.max_depth);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| parser.parse_program()));
        let (program, failure) = match outcome {
            Ok(Ok(program)) => (Some(program), None),
            Ok(Err(failure)) => (None, Some(failure.to_string())),
            Err(payload) => (None, Some(panic_message(payload.as_ref()))),
        };

        let (mut errors, reports) = parser.finish();
        if let Some(message) = failure {
            warn!("compilation failed: {}", message);
            if errors.is_empty() {
                errors.push(CompilationError::fatal(message));
            }
        }

        let (operator_report, control_report) = reports.into_parts();
        debug!(
            "compiled {} bytes: {} nodes, {} errors, {} operators, {} control structures",
            source.len(),
            program.as_ref().map_or(0, Program::node_count),
            errors.len(),
            operator_report.len(),
            control_report.len()
        );

        CompilationResult {
            program,
            errors,
            operator_report,
            control_report,
        }
    }
}

/// Compile with the default limits.
pub fn compile(source: &str) -> CompilationResult {
    Compiler::new().compile(source)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("internal error: {}", detail)
}
