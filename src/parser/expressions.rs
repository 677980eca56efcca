//! Expression and condition parsing implementation
//!
//! # Grammar
//!
//! ```text
//! expression ::= term (('+' | '-') term)*
//! term       ::= unary (('*' | '/') unary)*
//! unary      ::= ('-' | '+') unary | primary
//! primary    ::= NUMBER | IDENT | '(' expression ')'
//!
//! condition  ::= and_cond (('||' | 'or') and_cond)*
//! and_cond   ::= not_cond (('&&' | 'and') not_cond)*
//! not_cond   ::= ('!' | 'not') not_cond | relation
//! relation   ::= expression REL_OP expression | '(' condition ')'
//! ```
//!
//! Binary operators are left-associative. A `(` in condition position can
//! open either a grouped condition or a parenthesized arithmetic operand
//! (`(a + b) * 2 > c`); [`Grouped`] carries whichever was found so the parse
//! never backtracks.
//!
//! Every operator consumed here is entered in the operator report.
//!
//! Each binary or logical operator in a chain takes one nesting level, so the
//! height of a left-associative chain counts against the parser's depth limit
//! like parentheses do.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Token, TokenKind};
use crate::parser::parse::{error_at, ParseError, Parser};

/// Result of parsing a parenthesized group in condition position.
enum Grouped {
    Condition(Condition),
    Expression(Expression),
}

type ExpressionRule = fn(&mut Parser) -> Result<Expression, ParseError>;
type ConditionRule = fn(&mut Parser) -> Result<Condition, ParseError>;

impl Parser {
    // ===== Arithmetic =====

    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_term()?;
        self.parse_additive_from(left)
    }

    fn parse_additive_from(&mut self, left: Expression) -> Result<Expression, ParseError> {
        self.chain(|parser| {
            let mut left = left;
            while matches!(parser.current.kind, TokenKind::Plus | TokenKind::Minus) {
                let op = parser.advance();
                left = parser.finish_binary(left, op, Self::parse_term)?;
            }
            Ok(left)
        })
    }

    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_unary()?;
        self.parse_term_from(left)
    }

    fn parse_term_from(&mut self, left: Expression) -> Result<Expression, ParseError> {
        self.chain(|parser| {
            let mut left = left;
            while matches!(parser.current.kind, TokenKind::Star | TokenKind::Slash) {
                let op = parser.advance();
                left = parser.finish_binary(left, op, Self::parse_unary)?;
            }
            Ok(left)
        })
    }

    fn finish_binary(
        &mut self,
        left: Expression,
        op: Token,
        operand: ExpressionRule,
    ) -> Result<Expression, ParseError> {
        self.deepen()?;
        let slot = self.reports.open_operator(&op.lexeme, op.location);
        let right = match operand(self) {
            Ok(right) => right,
            Err(err) => {
                self.reports
                    .close_operator(slot, format!("{} {} …", left, op.lexeme));
                return Err(err);
            }
        };
        let node = Expression::binary(left, op.lexeme, right);
        self.reports.close_operator(slot, node.to_string());
        Ok(node)
    }

    /// Unary minus on a literal folds into the literal; on anything else it
    /// becomes `0 - operand`. Unary plus is dropped.
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        match self.current.kind {
            TokenKind::Minus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(match operand {
                    Expression::Number(value) => Expression::Number(-value),
                    other => Expression::binary(Expression::Number(0.0), "-", other),
                })
            }
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.advance();
                match token.lexeme.parse::<f64>() {
                    Ok(value) => Ok(Expression::Number(value)),
                    Err(_) => Err(error_at(&token, "Invalid number literal")),
                }
            }
            TokenKind::Ident => Ok(Expression::Identifier(self.advance().lexeme)),
            TokenKind::LParen => {
                let open = self.advance();
                let inner = self.nested(Self::parse_expression)?;
                self.expect_token(
                    TokenKind::RParen,
                    &format!("Expected ')' to close '(' at {}", open.location),
                )?;
                Ok(inner)
            }
            _ => Err(self.error_at_current(format!(
                "Expected an expression, found {}",
                self.current
            ))),
        }
    }

    // ===== Conditions =====

    pub(crate) fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let left = self.parse_and_condition()?;
        self.parse_or_from(left)
    }

    fn parse_or_from(&mut self, left: Condition) -> Result<Condition, ParseError> {
        self.chain(|parser| {
            let mut left = left;
            while matches!(
                parser.current.kind,
                TokenKind::OrOr | TokenKind::Keyword(Keyword::Or)
            ) {
                let op = parser.advance();
                left = parser.finish_logical(left, op, Self::parse_and_condition)?;
            }
            Ok(left)
        })
    }

    fn parse_and_condition(&mut self) -> Result<Condition, ParseError> {
        let left = self.parse_not_condition()?;
        self.parse_and_from(left)
    }

    fn parse_and_from(&mut self, left: Condition) -> Result<Condition, ParseError> {
        self.chain(|parser| {
            let mut left = left;
            while matches!(
                parser.current.kind,
                TokenKind::AndAnd | TokenKind::Keyword(Keyword::And)
            ) {
                let op = parser.advance();
                left = parser.finish_logical(left, op, Self::parse_not_condition)?;
            }
            Ok(left)
        })
    }

    fn finish_logical(
        &mut self,
        left: Condition,
        op: Token,
        operand: ConditionRule,
    ) -> Result<Condition, ParseError> {
        self.deepen()?;
        let slot = self.reports.open_operator(&op.lexeme, op.location);
        let right = match operand(self) {
            Ok(right) => right,
            Err(err) => {
                self.reports
                    .close_operator(slot, format!("{} {} …", left, op.lexeme));
                return Err(err);
            }
        };
        let node = Condition::logical(left, op.lexeme, right);
        self.reports.close_operator(slot, node.to_string());
        Ok(node)
    }

    fn parse_not_condition(&mut self) -> Result<Condition, ParseError> {
        if matches!(
            self.current.kind,
            TokenKind::Bang | TokenKind::Keyword(Keyword::Not)
        ) {
            let op = self.advance();
            let slot = self.reports.open_operator(&op.lexeme, op.location);
            let inner = match self.nested(Self::parse_not_condition) {
                Ok(inner) => inner,
                Err(err) => {
                    self.reports.close_operator(slot, format!("{} …", op.lexeme));
                    return Err(err);
                }
            };
            let node = Condition::Not(Box::new(inner));
            self.reports.close_operator(slot, node.to_string());
            return Ok(node);
        }

        match self.parse_relation_or_expression()? {
            Grouped::Condition(condition) => Ok(condition),
            Grouped::Expression(expression) => Err(self.error_at_current(format!(
                "Expected a relational operator after '{}', found {}",
                expression, self.current
            ))),
        }
    }

    /// Relation, parenthesized condition, or a bare arithmetic expression
    /// (which is only valid if the caller is inside a `(` group).
    fn parse_relation_or_expression(&mut self) -> Result<Grouped, ParseError> {
        let left = if self.check(TokenKind::LParen) {
            let open = self.advance();
            let inner = self.nested(Self::parse_grouped)?;
            self.expect_token(
                TokenKind::RParen,
                &format!("Expected ')' to close '(' at {}", open.location),
            )?;
            match inner {
                Grouped::Condition(condition) => return Ok(Grouped::Condition(condition)),
                Grouped::Expression(expression) => {
                    // `(a + b) * 2 > c`: the group was an arithmetic operand
                    let term = self.parse_term_from(expression)?;
                    self.parse_additive_from(term)?
                }
            }
        } else {
            self.parse_expression()?
        };

        if !self.current.kind.is_relational() {
            return Ok(Grouped::Expression(left));
        }

        let op = self.advance();
        let slot = self.reports.open_operator(&op.lexeme, op.location);
        let right = match self.parse_expression() {
            Ok(right) => right,
            Err(err) => {
                self.reports
                    .close_operator(slot, format!("{} {} …", left, op.lexeme));
                return Err(err);
            }
        };
        let node = Condition::Relational {
            left,
            operator: op.lexeme,
            right,
        };
        self.reports.close_operator(slot, node.to_string());
        Ok(Grouped::Condition(node))
    }

    /// Contents of a `(` group in condition position.
    fn parse_grouped(&mut self) -> Result<Grouped, ParseError> {
        let first = if matches!(
            self.current.kind,
            TokenKind::Bang | TokenKind::Keyword(Keyword::Not)
        ) {
            self.parse_not_condition()?
        } else {
            match self.parse_relation_or_expression()? {
                Grouped::Condition(condition) => condition,
                expression => return Ok(expression),
            }
        };

        let and = self.parse_and_from(first)?;
        Ok(Grouped::Condition(self.parse_or_from(and)?))
    }
}
