//! Diagnostics and report records
//!
//! Flat records produced as a byproduct of parsing, independent of the AST:
//!
//! - [`CompilationError`]: one per lexical or syntactic problem, or a single
//!   synthetic entry for a fatal failure
//! - [`OperatorOccurrence`]: one per operator token consumed in a binary,
//!   relational or logical construct
//! - [`ControlStructure`]: one per recognized `if`/`while` header
//!
//! The parser writes reports into a [`Reports`] accumulator that it owns and
//! hands back when it finishes, so each parse is self-contained.

use crate::parser::ast::{Condition, SourceLocation};
use serde::Serialize;
use std::fmt;

/// Classification shown to users. The labels are the Spanish ones used by
/// the course tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "Error Léxico")]
    Lexical,
    #[serde(rename = "Error Sintáctico")]
    Syntactic,
    #[serde(rename = "Error Fatal")]
    Fatal,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "Error Léxico",
            ErrorKind::Syntactic => "Error Sintáctico",
            ErrorKind::Fatal => "Error Fatal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected problem. `line`/`column` are 1-based; `(0, 0)` means the
/// error has no source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationError {
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub description: String,
}

impl CompilationError {
    pub fn new(
        lexeme: impl Into<String>,
        location: SourceLocation,
        kind: ErrorKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lexeme: lexeme.into(),
            line: location.line,
            column: location.column,
            kind,
            description: description.into(),
        }
    }

    /// Position-less fatal error.
    pub fn fatal(description: impl Into<String>) -> Self {
        Self::new("N/A", SourceLocation::new(0, 0), ErrorKind::Fatal, description)
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {} ('{}'): {}",
            self.kind, self.line, self.column, self.lexeme, self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorOccurrence {
    pub operator: String,
    pub line: usize,
    pub column: usize,
    /// Rendering of the construct the operator builds, e.g. `b * 2`.
    pub occurrence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    If,
    While,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::If => f.write_str("if"),
            ControlKind::While => f.write_str("while"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlStructure {
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub line: usize,
    /// Rendered guard, e.g. `x > 3`.
    pub condition: String,
}

/// Handle to an operator entry whose occurrence text is not final yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSlot(usize);

/// Report accumulator filled during one parse.
///
/// Operator entries are opened when the operator token is consumed and
/// closed once the construct is built, which keeps the report in source
/// order even though inner constructs finish first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reports {
    pub operators: Vec<OperatorOccurrence>,
    pub controls: Vec<ControlStructure>,
}

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operator at the moment it is consumed. The occurrence text
    /// stays empty until [`Reports::close_operator`] fills it in, with the
    /// built construct or with a partial rendering if it never completes.
    pub fn open_operator(&mut self, operator: &str, location: SourceLocation) -> OperatorSlot {
        self.operators.push(OperatorOccurrence {
            operator: operator.to_string(),
            line: location.line,
            column: location.column,
            occurrence: String::new(),
        });
        OperatorSlot(self.operators.len() - 1)
    }

    pub fn close_operator(&mut self, slot: OperatorSlot, occurrence: String) {
        if let Some(entry) = self.operators.get_mut(slot.0) {
            entry.occurrence = occurrence;
        }
    }

    pub fn push_control(&mut self, kind: ControlKind, line: usize, condition: &Condition) {
        self.controls.push(ControlStructure {
            kind,
            line,
            condition: condition.to_string(),
        });
    }

    pub fn into_parts(self) -> (Vec<OperatorOccurrence>, Vec<ControlStructure>) {
        (self.operators, self.controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_keeps_source_order() {
        let mut reports = Reports::new();
        let outer = reports.open_operator("+", SourceLocation::new(1, 3));
        let inner = reports.open_operator("*", SourceLocation::new(1, 7));
        reports.close_operator(inner, "b * 2".into());
        reports.close_operator(outer, "a + b * 2".into());

        let (operators, _) = reports.into_parts();
        assert_eq!(operators[0].operator, "+");
        assert_eq!(operators[0].occurrence, "a + b * 2");
        assert_eq!(operators[1].operator, "*");
        assert_eq!(operators[1].occurrence, "b * 2");
    }

    #[test]
    fn test_error_kind_serializes_to_label() {
        let error = CompilationError::fatal("boom");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "Error Fatal");
        assert_eq!(json["line"], 0);
        assert_eq!(json["lexeme"], "N/A");
    }
}
