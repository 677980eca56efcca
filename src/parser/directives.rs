//! Configuration directive parsing
//!
//! ```text
//! directive ::= '%default'
//!             | '%color'    target '=' (HEX_COLOR | NUMBER ',' NUMBER ',' NUMBER)
//!             | '%figure'   target '=' IDENT
//!             | '%font'     target '=' (IDENT | STRING)
//!             | '%fontsize' target '=' expression
//! target    ::= 'if' | 'while' | 'var' | 'show' | 'read' | 'assign' | 'start' | 'end'
//! ```
//!
//! Directives may appear anywhere an instruction may. They do not become
//! instructions; each one is appended to the program's configuration list
//! with its 0-based occurrence index.

use crate::parser::ast::*;
use crate::parser::lexer::{DirectiveKind, Token, TokenKind};
use crate::parser::parse::{error_at, ParseError, Parser};

impl Parser {
    pub(crate) fn parse_directive(&mut self, kind: DirectiveKind) -> Result<(), ParseError> {
        let directive = self.advance();
        let index = self.configurations.len();

        let config = match kind {
            DirectiveKind::Default => ConfigInstruction::Default { index },
            DirectiveKind::Color => {
                let target = self.parse_target_and_eq(&directive)?;
                let value = self.parse_color()?;
                ConfigInstruction::Color {
                    target,
                    value,
                    index,
                }
            }
            DirectiveKind::Figure => {
                let target = self.parse_target_and_eq(&directive)?;
                let figure = self
                    .expect_identifier("Expected a figure name")?
                    .lexeme;
                ConfigInstruction::Figure {
                    target,
                    figure,
                    index,
                }
            }
            DirectiveKind::Font => {
                let target = self.parse_target_and_eq(&directive)?;
                let font = match self.current.kind {
                    TokenKind::Ident | TokenKind::Str => self.advance().lexeme,
                    _ => {
                        return Err(self.error_at_current(format!(
                            "Expected a font name, found {}",
                            self.current
                        )))
                    }
                };
                ConfigInstruction::Font {
                    target,
                    font,
                    index,
                }
            }
            DirectiveKind::FontSize => {
                let target = self.parse_target_and_eq(&directive)?;
                let size = self.parse_expression()?;
                ConfigInstruction::FontSize {
                    target,
                    size,
                    index,
                }
            }
        };

        self.match_token(TokenKind::Semicolon);
        self.configurations.push(config);
        Ok(())
    }

    /// `target '='`; returns the canonical target name.
    fn parse_target_and_eq(&mut self, directive: &Token) -> Result<String, ParseError> {
        let target = match self.current.kind {
            TokenKind::Keyword(keyword) => canonical_target(keyword.as_str()),
            TokenKind::Ident => canonical_target(&self.current.lexeme),
            _ => None,
        };
        let Some(target) = target else {
            return Err(self.error_at_current(format!(
                "Unknown target for '{}': expected one of {}",
                directive.lexeme,
                CONFIG_TARGETS.join(", ")
            )));
        };
        self.advance();

        self.expect_token(
            TokenKind::Eq,
            &format!("Expected '=' after '{} {}'", directive.lexeme, target),
        )?;
        Ok(target.to_string())
    }

    /// `#rrggbb`, `#rgb` or `r, g, b` with components in 0..=255.
    fn parse_color(&mut self) -> Result<ColorValue, ParseError> {
        if let Some(hex) = self.match_token(TokenKind::HexColor) {
            return Ok(ColorValue::Hex(hex.lexeme));
        }

        let r = self.parse_color_component()?;
        self.expect_token(TokenKind::Comma, "Expected ',' between color components")?;
        let g = self.parse_color_component()?;
        self.expect_token(TokenKind::Comma, "Expected ',' between color components")?;
        let b = self.parse_color_component()?;
        Ok(ColorValue::Rgb { r, g, b })
    }

    fn parse_color_component(&mut self) -> Result<u8, ParseError> {
        let token = self.expect_token(TokenKind::Number, "Expected a color")?;
        token.lexeme.parse::<u8>().map_err(|_| {
            error_at(
                &token,
                format!(
                    "Color component '{}' must be an integer between 0 and 255",
                    token.lexeme
                ),
            )
        })
    }
}

/// Map a target spelling (English or Spanish, any case) to its canonical name.
fn canonical_target(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    let canonical = match lower.as_str() {
        "asignacion" | "asignación" => "assign",
        "inicio" => "start",
        "fin" => "end",
        other => return CONFIG_TARGETS.iter().copied().find(|target| *target == other),
    };
    Some(canonical)
}
