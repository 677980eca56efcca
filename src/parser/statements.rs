//! Instruction parsing implementation
//!
//! This module handles parsing of all instruction forms:
//!
//! - Variable declarations: `var x` / `var x = 42`
//! - Assignments: `x = x + 1`
//! - Control flow: `if cond { ... }`, `while cond { ... }`
//! - I/O: `show "text"`, `read x`
//! - Blocks: `{ ... }`, which may contain directives as well
//!
//! # Grammar
//!
//! ```text
//! item        ::= instruction | directive | ';'
//! instruction ::= var_decl | assignment | if_stmt | while_stmt | show | read
//! block       ::= '{' item* '}'
//! ```
//!
//! A trailing `;` after an instruction is optional.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::ControlKind;
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, TokenKind};
use crate::parser::parse::{ParseError, ParseFailure, Parser};
use log::trace;

impl Parser {
    /// Parse one item at statement position.
    ///
    /// Directives are collected on the parser and yield `Ok(None)`, as does
    /// a control structure whose header was unusable.
    pub(crate) fn parse_statement(&mut self) -> Result<Option<Instruction>, ParseError> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_var_declaration().map(Some),
            TokenKind::Keyword(Keyword::If) => self.parse_control(ControlKind::If),
            TokenKind::Keyword(Keyword::While) => self.parse_control(ControlKind::While),
            TokenKind::Keyword(Keyword::Show) => self.parse_show().map(Some),
            TokenKind::Keyword(Keyword::Read) => self.parse_read().map(Some),
            TokenKind::Directive(kind) => {
                self.parse_directive(kind)?;
                Ok(None)
            }
            TokenKind::Ident => self.parse_assignment().map(Some),
            _ => Err(self.error_at_current(format!(
                "Expected an instruction, found {}",
                self.current
            ))),
        }
    }

    /// Parse block: `{` items `}`
    ///
    /// Running out of input before the closing brace is fatal.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Instruction>, ParseError> {
        let open = self.expect_token(TokenKind::LBrace, "Expected '{' to open block")?;

        self.nested(|parser| {
            let body = parser.parse_items(Some(open.location))?;
            if parser.match_token(TokenKind::RBrace).is_some() {
                return Ok(body);
            }

            let err = parser.error_at_current(format!(
                "Expected '}}' to close block opened at line {}, found end of input",
                open.location.line
            ));
            parser.record(err)?;
            Err(ParseFailure::UnterminatedBlock {
                line: open.location.line,
            }
            .into())
        })
    }

    fn parse_var_declaration(&mut self) -> Result<Instruction, ParseError> {
        self.advance(); // 'var'
        let name = self.expect_identifier("Expected variable name after 'var'")?.lexeme;

        let value = if self.match_token(TokenKind::Eq).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.match_token(TokenKind::Semicolon);

        Ok(Instruction::VarDeclaration { name, value })
    }

    fn parse_assignment(&mut self) -> Result<Instruction, ParseError> {
        let name = self.advance().lexeme;
        self.expect_token(TokenKind::Eq, &format!("Expected '=' after '{}'", name))?;
        let value = self.parse_expression()?;
        self.match_token(TokenKind::Semicolon);

        Ok(Instruction::Assignment { name, value })
    }

    /// Parse `if`/`while`: keyword, condition, block.
    ///
    /// A bad condition is recorded and the body is still parsed so that
    /// errors inside it are reported, but the construct itself is dropped.
    fn parse_control(&mut self, kind: ControlKind) -> Result<Option<Instruction>, ParseError> {
        let keyword = self.advance();

        let condition = match self.parse_condition() {
            Ok(condition) => {
                self.reports.push_control(kind, keyword.location.line, &condition);
                Some(condition)
            }
            Err(err) => {
                self.record(err)?;
                self.skip_to_block();
                if !self.check(TokenKind::LBrace) {
                    return Ok(None);
                }
                None
            }
        };

        let body = self.parse_block()?;

        Ok(condition.map(|condition| match kind {
            ControlKind::If => Instruction::If { condition, body },
            ControlKind::While => Instruction::While { condition, body },
        }))
    }

    /// Skip the rest of a broken `if`/`while` header, stopping at its `{`
    /// or at anything that cannot belong to a header.
    fn skip_to_block(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Eof
                | TokenKind::Directive(_)
                | TokenKind::Keyword(
                    Keyword::Var | Keyword::If | Keyword::While | Keyword::Show | Keyword::Read,
                ) => break,
                _ => {
                    let skipped = self.advance();
                    trace!("recovery: skipping {} in header", skipped);
                }
            }
        }
    }

    fn parse_show(&mut self) -> Result<Instruction, ParseError> {
        self.advance(); // 'show'
        let content = self
            .expect_token(TokenKind::Str, "Expected a string after 'show'")?
            .lexeme;
        self.match_token(TokenKind::Semicolon);

        Ok(Instruction::Show { content })
    }

    fn parse_read(&mut self) -> Result<Instruction, ParseError> {
        self.advance(); // 'read'
        let variable = self
            .expect_identifier("Expected variable name after 'read'")?
            .lexeme;
        self.match_token(TokenKind::Semicolon);

        Ok(Instruction::Read { variable })
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::{CompilationError, ControlKind, Reports};
    use crate::parser::ast::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> (Program, Vec<CompilationError>, Reports) {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program().expect("parse should not fail");
        let (errors, reports) = parser.finish();
        (program, errors, reports)
    }

    #[test]
    fn test_if_with_block() {
        let (program, errors, reports) = parse("var x = 5\nif x > 3 {\n  show \"big\"\n}");
        assert!(errors.is_empty());
        assert_eq!(program.instructions.len(), 2);

        match &program.instructions[1] {
            Instruction::If { condition, body } => {
                assert_eq!(condition.to_string(), "x > 3");
                assert_eq!(
                    body,
                    &vec![Instruction::Show {
                        content: "big".into()
                    }]
                );
            }
            other => panic!("expected if, got {:?}", other),
        }

        assert_eq!(reports.controls.len(), 1);
        assert_eq!(reports.controls[0].kind, ControlKind::If);
        assert_eq!(reports.controls[0].line, 2);
        assert_eq!(reports.controls[0].condition, "x > 3");
    }

    #[test]
    fn test_nested_while_reports_in_order() {
        let source = "while a < 10 {\n  if a == 5 { show \"half\" }\n  a = a + 1\n}";
        let (program, errors, reports) = parse(source);
        assert!(errors.is_empty());
        assert_eq!(program.instructions.len(), 1);

        let kinds: Vec<_> = reports.controls.iter().map(|c| (c.kind, c.line)).collect();
        assert_eq!(kinds, vec![(ControlKind::While, 1), (ControlKind::If, 2)]);
    }

    #[test]
    fn test_spanish_keywords() {
        let (program, errors, _) = parse("SI x > 1 { MOSTRAR \"si\" }\nmientras x < 3 { leer x }");
        assert!(errors.is_empty());
        assert!(matches!(program.instructions[0], Instruction::If { .. }));
        assert!(matches!(program.instructions[1], Instruction::While { .. }));
    }

    #[test]
    fn test_bad_header_drops_construct_but_parses_body() {
        let (program, errors, reports) = parse("if x > { show 1 }\nread y");
        // one error for the header, one for `show 1`
        assert_eq!(errors.len(), 2);
        assert!(reports.controls.is_empty());
        assert_eq!(
            program.instructions,
            vec![Instruction::Read {
                variable: "y".into()
            }]
        );
    }

    #[test]
    fn test_show_requires_string() {
        let (program, errors, _) = parse("show x\nshow \"ok\"");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "x");
        assert_eq!(program.instructions.len(), 1);
    }

    #[test]
    fn test_missing_equals_in_assignment() {
        let (program, errors, _) = parse("x 5\ny = 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "5");
        assert_eq!(
            program.instructions,
            vec![Instruction::Assignment {
                name: "y".into(),
                value: Expression::Number(1.0)
            }]
        );
    }
}
