//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! error types, token helpers, error recovery and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, recovery and coordination
//! - `statements`: instructions and blocks (`var`, assignment, `if`, `while`, `show`, `read`)
//! - `expressions`: arithmetic expressions and conditions
//! - `directives`: `%color`, `%figure`, ... configuration directives
//!
//! # Token stream
//!
//! Tokens are pulled lazily from the [`Lexer`] with exactly one token of
//! lookahead (`current`). Lexical errors coming out of the lexer are recorded
//! as diagnostics and skipped, so the grammar never sees them.
//!
//! # Recovery
//!
//! A syntax error inside an instruction is recorded and the parser skips
//! ahead to the next statement boundary (see [`Parser::synchronize`]).
//! Only a [`ParseFailure`] aborts the parse.

use crate::diagnostics::{CompilationError, ErrorKind, Reports};
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Lexer, Token, TokenKind};
use log::trace;
use thiserror::Error;

/// Default limit on nested blocks, parentheses, unary operators and
/// operator chains.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Error raised inside a grammar production.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Recoverable: recorded as a diagnostic, then the parser resynchronizes.
    #[error("syntax error at {location}: {message}")]
    Syntax {
        lexeme: String,
        location: SourceLocation,
        message: String,
    },
    #[error(transparent)]
    Fatal(#[from] ParseFailure),
}

/// Unrecoverable parse failure. No `Program` is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("unexpected end of input: block opened at line {line} is never closed")]
    UnterminatedBlock { line: usize },
    #[error("nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Recursive descent parser for the pseudocode language
pub struct Parser {
    lexer: Lexer,
    pub(crate) current: Token,
    previous_location: SourceLocation,
    /// Number of tokens consumed so far, used to guarantee progress.
    consumed: usize,
    depth: usize,
    max_depth: usize,
    errors: Vec<CompilationError>,
    pub(crate) reports: Reports,
    pub(crate) configurations: Vec<ConfigInstruction>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::new(TokenKind::Eof, "", SourceLocation::new(1, 1)),
            previous_location: SourceLocation::new(1, 1),
            consumed: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            errors: Vec::new(),
            reports: Reports::new(),
            configurations: Vec::new(),
        };
        parser.current = parser.pull();
        parser
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the entire program.
    ///
    /// Syntax errors are recovered from and accumulate (see [`Parser::finish`]);
    /// `Err` is returned only when no program can be assembled.
    pub fn parse_program(&mut self) -> Result<Program, ParseFailure> {
        let instructions = self.parse_items(None)?;
        Ok(Program {
            instructions,
            configurations: std::mem::take(&mut self.configurations),
        })
    }

    /// Hand back everything accumulated during the parse, diagnostics in
    /// source order.
    pub fn finish(self) -> (Vec<CompilationError>, Reports) {
        let mut errors = self.errors;
        errors.sort_by_key(|error| (error.line, error.column));
        (errors, self.reports)
    }

    /// Parse items until end of input, or until the `}` closing the block
    /// opened at `block` (the brace itself is left for the caller).
    pub(crate) fn parse_items(
        &mut self,
        block: Option<SourceLocation>,
    ) -> Result<Vec<Instruction>, ParseFailure> {
        let mut instructions = Vec::new();

        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::RBrace if block.is_some() => break,
                TokenKind::RBrace => {
                    let err = self.error_at_current("Unexpected '}' with no open block");
                    self.record(err)?;
                    self.advance();
                    continue;
                }
                TokenKind::Semicolon => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let start = self.consumed;
            match self.parse_statement() {
                Ok(Some(instruction)) => instructions.push(instruction),
                Ok(None) => {}
                Err(err) => {
                    self.record(err)?;
                    self.synchronize();
                    if self.consumed == start {
                        self.advance();
                    }
                }
            }
        }

        Ok(instructions)
    }

    /// Skip tokens up to the next statement boundary: a statement keyword, a
    /// directive, `}`, end of input, an identifier that starts a new line, or
    /// just past a `;`.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof | TokenKind::RBrace => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                kind if starts_statement(kind) => break,
                TokenKind::Ident if self.current.location.line > self.previous_location.line => break,
                _ => {
                    let skipped = self.advance();
                    trace!("recovery: skipping {} at {}", skipped, skipped.location);
                }
            }
        }
    }

    /// Record a recoverable error as a diagnostic; fatal errors pass through.
    pub(crate) fn record(&mut self, error: ParseError) -> Result<(), ParseFailure> {
        match error {
            ParseError::Syntax {
                lexeme,
                location,
                message,
            } => {
                trace!("syntax error at {}: {}", location, message);
                self.errors.push(CompilationError::new(
                    lexeme,
                    location,
                    ErrorKind::Syntactic,
                    message,
                ));
                Ok(())
            }
            ParseError::Fatal(failure) => Err(failure),
        }
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.chain(|parser| {
            parser.deepen()?;
            f(parser)
        })
    }

    /// Run `f`, which may call [`Parser::deepen`] any number of times, and
    /// restore the current depth afterwards, whatever `f` returned.
    pub(crate) fn chain<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let depth = self.depth;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Take one more nesting level, failing past the limit.
    pub(crate) fn deepen(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseFailure::NestingTooDeep {
                limit: self.max_depth,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    // ===== Helper methods =====

    /// Next token from the lexer, recording lexical errors on the way.
    fn pull(&mut self) -> Token {
        loop {
            match self.lexer.next() {
                Some(Ok(token)) => return token,
                Some(Err(err)) => {
                    trace!("lexical error at {}: {}", err.location, err.message);
                    self.errors.push(CompilationError::new(
                        err.lexeme,
                        err.location,
                        ErrorKind::Lexical,
                        err.message,
                    ));
                }
                None => return Token::new(TokenKind::Eof, "", self.current.location),
            }
        }
    }

    /// Consume the current token and return it. At end of input the `Eof`
    /// token is returned and nothing is consumed.
    pub(crate) fn advance(&mut self) -> Token {
        if self.is_at_end() {
            return self.current.clone();
        }
        let next = self.pull();
        let token = std::mem::replace(&mut self.current, next);
        self.previous_location = token.location;
        self.consumed += 1;
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    pub(crate) fn expect_token(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(format!("{}, found {}", message, self.current)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, message: &str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::Ident, message)
    }

    pub(crate) fn error_at_current(&self, message: impl Into<String>) -> ParseError {
        error_at(&self.current, message)
    }
}

pub(crate) fn error_at(token: &Token, message: impl Into<String>) -> ParseError {
    let lexeme = if token.kind == TokenKind::Eof {
        "EOF".to_string()
    } else {
        token.lexeme.clone()
    };
    ParseError::Syntax {
        lexeme,
        location: token.location,
        message: message.into(),
    }
}

fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword(Keyword::Var | Keyword::If | Keyword::While | Keyword::Show | Keyword::Read)
            | TokenKind::Directive(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Result<Program, ParseFailure>, Vec<CompilationError>, Reports) {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        let (errors, reports) = parser.finish();
        (program, errors, reports)
    }

    #[test]
    fn test_parse_simple_program() {
        let (program, errors, _) = parse("var x; x = 5;");
        let program = program.unwrap();

        assert!(errors.is_empty());
        assert_eq!(
            program.instructions,
            vec![
                Instruction::VarDeclaration {
                    name: "x".into(),
                    value: None
                },
                Instruction::Assignment {
                    name: "x".into(),
                    value: Expression::Number(5.0)
                },
            ]
        );
    }

    #[test]
    fn test_recovery_collects_multiple_errors() {
        let source = "var = 1\nx = 2\nread 5\nshow \"ok\"";
        let (program, errors, _) = parse(source);
        let program = program.unwrap();

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Syntactic));
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 3);
        // `x = 2` and `show "ok"` survive
        assert_eq!(program.instructions.len(), 2);
    }

    #[test]
    fn test_stray_closing_brace() {
        let (program, errors, _) = parse("}\nread x");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "}");
        assert_eq!(program.unwrap().instructions.len(), 1);
    }

    #[test]
    fn test_unclosed_block_is_fatal() {
        let (program, errors, _) = parse("while x < 3 {\n  x = x + 1\n");
        assert_eq!(program, Err(ParseFailure::UnterminatedBlock { line: 1 }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "EOF");
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("x = {}1{}", "(".repeat(10), ")".repeat(10));
        let mut parser = Parser::new(Lexer::new(&source)).with_max_depth(4);
        assert_eq!(
            parser.parse_program(),
            Err(ParseFailure::NestingTooDeep { limit: 4 })
        );
        let (errors, _) = parser.finish();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_lexical_errors_are_skipped() {
        let (program, errors, _) = parse("x = 1 @ + 2\nx =\n#");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].kind, ErrorKind::Lexical);
        assert_eq!(errors[0].lexeme, "@");
        assert_eq!(errors[1].kind, ErrorKind::Lexical);
        assert_eq!(errors[1].lexeme, "#");
        assert_eq!(errors[2].kind, ErrorKind::Syntactic);
        assert_eq!(errors[2].lexeme, "EOF");
        assert_eq!(
            program.unwrap().instructions[0],
            Instruction::Assignment {
                name: "x".into(),
                value: Expression::binary(Expression::Number(1.0), "+", Expression::Number(2.0)),
            }
        );
    }
}
