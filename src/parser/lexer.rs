//! Lexer (tokenizer) for pseudocode source
//!
//! Converts raw source text into a lazy stream of [`Token`]s consumed by the
//! parser. The lexer is an [`Iterator`] over `Result<Token, LexError>`: a bad
//! character or malformed literal is yielded as an error *after* it has been
//! consumed, so pulling again simply continues with the rest of the input.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Reserved words. Matching is case-insensitive and accepts the Spanish
/// spellings used by the course material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    If,
    While,
    Show,
    Read,
    And,
    Or,
    Not,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        let keyword = match word.to_lowercase().as_str() {
            "var" => Keyword::Var,
            "if" | "si" => Keyword::If,
            "while" | "mientras" => Keyword::While,
            "show" | "mostrar" => Keyword::Show,
            "read" | "leer" => Keyword::Read,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            _ => return None,
        };
        Some(keyword)
    }

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Var => "var",
            Keyword::If => "if",
            Keyword::While => "while",
            Keyword::Show => "show",
            Keyword::Read => "read",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
        }
    }
}

/// `%name` configuration directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Default,
    Color,
    Figure,
    Font,
    FontSize,
}

impl DirectiveKind {
    fn lookup(name: &str) -> Option<Self> {
        let kind = match name.to_lowercase().as_str() {
            "default" => DirectiveKind::Default,
            "color" => DirectiveKind::Color,
            "figure" | "figura" => DirectiveKind::Figure,
            "font" | "fuente" => DirectiveKind::Font,
            "fontsize" | "tamfuente" => DirectiveKind::FontSize,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Default => "%default",
            DirectiveKind::Color => "%color",
            DirectiveKind::Figure => "%figure",
            DirectiveKind::Font => "%font",
            DirectiveKind::FontSize => "%fontsize",
        }
    }
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    Str,
    HexColor,

    Ident,
    Keyword(Keyword),
    Directive(DirectiveKind),

    // Arithmetic
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Assignment
    Eq, // =

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semicolon, // ;

    // End of input
    Eof,
}

/// Coarse lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Number,
    String,
    Color,
    Directive,
    Operator,
    Punctuation,
    EndOfInput,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind as T;
        match self {
            T::Number => TokenCategory::Number,
            T::Str => TokenCategory::String,
            T::HexColor => TokenCategory::Color,
            T::Ident => TokenCategory::Identifier,
            T::Keyword(Keyword::And | Keyword::Or | Keyword::Not) => TokenCategory::Operator,
            T::Keyword(_) => TokenCategory::Keyword,
            T::Directive(_) => TokenCategory::Directive,
            T::Plus
            | T::Minus
            | T::Star
            | T::Slash
            | T::EqEq
            | T::NotEq
            | T::Lt
            | T::Le
            | T::Gt
            | T::Ge
            | T::AndAnd
            | T::OrOr
            | T::Bang
            | T::Eq => TokenCategory::Operator,
            T::LParen | T::RParen | T::LBrace | T::RBrace | T::Comma | T::Semicolon => {
                TokenCategory::Punctuation
            }
            T::Eof => TokenCategory::EndOfInput,
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::Str => write!(f, "string"),
            TokenKind::HexColor => write!(f, "hex color"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Keyword(keyword) => write!(f, "'{}'", keyword.as_str()),
            TokenKind::Directive(kind) => write!(f, "'{}'", kind.as_str()),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A classified, positioned lexical unit.
///
/// `lexeme` is the source text of the token, except for string literals,
/// where it holds the unescaped contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number | TokenKind::Ident | TokenKind::HexColor => {
                write!(f, "{} '{}'", self.kind, self.lexeme)
            }
            TokenKind::Str => write!(f, "string \"{}\"", self.lexeme),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Lexer error: unrecognized character or malformed literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error at {location}: {message}")]
pub struct LexError {
    pub lexeme: String,
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    fn new(lexeme: impl Into<String>, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            lexeme: lexeme.into(),
            message: message.into(),
            location,
        }
    }
}

/// Lexer for pseudocode source
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Lex the next token. Returns `Eof` at (and after) the end of input.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, "", loc)),
        };

        match ch {
            '"' => self.string_literal(loc),
            '#' => self.hex_color(loc),
            '%' => self.directive(loc),
            '0'..='9' => self.number_literal(ch, loc),
            c if c.is_alphabetic() || c == '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => Ok(Token::new(TokenKind::Plus, "+", loc)),
            '-' => Ok(Token::new(TokenKind::Minus, "-", loc)),
            '*' => Ok(Token::new(TokenKind::Star, "*", loc)),
            '/' => Ok(Token::new(TokenKind::Slash, "/", loc)),
            '=' => Ok(self.one_or_two('=', TokenKind::Eq, TokenKind::EqEq, loc)),
            '!' => Ok(self.one_or_two('!', TokenKind::Bang, TokenKind::NotEq, loc)),
            '<' => Ok(self.one_or_two('<', TokenKind::Lt, TokenKind::Le, loc)),
            '>' => Ok(self.one_or_two('>', TokenKind::Gt, TokenKind::Ge, loc)),
            '&' | '|' => {
                if self.peek() == Some(ch) {
                    self.advance();
                    let kind = if ch == '&' { TokenKind::AndAnd } else { TokenKind::OrOr };
                    Ok(Token::new(kind, format!("{}{}", ch, ch), loc))
                } else {
                    Err(LexError::new(
                        ch.to_string(),
                        format!("Unexpected character '{}', did you mean '{}{}'?", ch, ch, ch),
                        loc,
                    ))
                }
            }
            '(' => Ok(Token::new(TokenKind::LParen, "(", loc)),
            ')' => Ok(Token::new(TokenKind::RParen, ")", loc)),
            '{' => Ok(Token::new(TokenKind::LBrace, "{", loc)),
            '}' => Ok(Token::new(TokenKind::RBrace, "}", loc)),
            ',' => Ok(Token::new(TokenKind::Comma, ",", loc)),
            ';' => Ok(Token::new(TokenKind::Semicolon, ";", loc)),

            _ => Err(LexError::new(
                ch.to_string(),
                format!("Unexpected character '{}'", ch),
                loc,
            )),
        }
    }

    /// `x` or `x=`.
    fn one_or_two(&mut self, first: char, single: TokenKind, with_eq: TokenKind, loc: SourceLocation) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            Token::new(with_eq, format!("{}=", first), loc)
        } else {
            Token::new(single, first.to_string(), loc)
        }
    }

    /// Parse string literal. Strings end at the line they start on.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut raw = String::from("\"");
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            raw.push(ch);

            match ch {
                '"' => return Ok(Token::new(TokenKind::Str, string, loc)),
                '\\' => {
                    let escape_loc = self.current_location();
                    let escaped = match self.peek() {
                        Some(c) if c != '\n' => c,
                        _ => break,
                    };
                    self.advance();
                    raw.push(escaped);
                    let unescaped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '\\' => '\\',
                        '"' => '"',
                        _ => {
                            self.skip_rest_of_string();
                            return Err(LexError::new(
                                format!("\\{}", escaped),
                                format!("Unknown escape sequence: \\{}", escaped),
                                escape_loc,
                            ));
                        }
                    };
                    string.push(unescaped);
                }
                _ => string.push(ch),
            }
        }

        Err(LexError::new(raw, "Unterminated string literal", loc))
    }

    /// Skip the remainder of a string literal after a bad escape.
    fn skip_rest_of_string(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == '"' {
                break;
            }
        }
    }

    /// `#rgb` or `#rrggbb`
    fn hex_color(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::from("#");
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let digits = &lexeme[1..];
        let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(Token::new(TokenKind::HexColor, lexeme, loc))
        } else {
            Err(LexError::new(
                lexeme.clone(),
                format!("Malformed hex color '{}', expected 3 or 6 hex digits", lexeme),
                loc,
            ))
        }
    }

    fn directive(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let lexeme = format!("%{}", name);
        if name.is_empty() {
            return Err(LexError::new(lexeme, "Unexpected character '%'", loc));
        }
        match DirectiveKind::lookup(&name) {
            Some(kind) => Ok(Token::new(TokenKind::Directive(kind), lexeme, loc)),
            None => Err(LexError::new(
                lexeme.clone(),
                format!("Unknown directive '{}'", lexeme),
                loc,
            )),
        }
    }

    /// Parse numeric literal: digits with an optional fraction. The value
    /// must fit a finite `f64`.
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);
        self.take_digits(&mut num_str);

        if self.peek() == Some('.') {
            self.advance();
            num_str.push('.');
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::new(
                    num_str.clone(),
                    format!("Malformed number literal '{}'", num_str),
                    loc,
                ));
            }
            self.take_digits(&mut num_str);
        }

        if !num_str.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(LexError::new(
                num_str.clone(),
                format!("Number literal '{}' is too large", num_str),
                loc,
            ));
        }

        Ok(Token::new(TokenKind::Number, num_str, loc))
    }

    fn take_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::lookup(&ident) {
            Some(keyword) => Token::new(TokenKind::Keyword(keyword), ident, loc),
            None => Token::new(TokenKind::Ident, ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new("/*", "Unterminated block comment", start_loc))
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokens are produced lazily. Exactly one `Eof` token is yielded, then
/// `None`.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if matches!(result, Ok(Token { kind: TokenKind::Eof, .. })) {
            self.finished = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .filter_map(Result::ok)
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("var x = 5; if x > 3 { show \"hi\" }");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Keyword(Keyword::If),
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Number,
                TokenKind::LBrace,
                TokenKind::Keyword(Keyword::Show),
                TokenKind::Str,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("== != <= >= < > && || ! = + - * /");
        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spanish_keywords_case_insensitive() {
        let tokens = kinds("SI Mientras mostrar LEER");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::If),
                TokenKind::Keyword(Keyword::While),
                TokenKind::Keyword(Keyword::Show),
                TokenKind::Keyword(Keyword::Read),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens: Vec<Token> = Lexer::new("x\n  y").filter_map(Result::ok).collect();
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("x // comment\ny /* block\ncomment */ z");
        assert_eq!(
            tokens,
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_literal_escapes() {
        let tokens: Vec<Token> = Lexer::new(r#""hello\n\"world\"""#)
            .filter_map(Result::ok)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "hello\n\"world\"");
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let results: Vec<_> = Lexer::new("a @ b").collect();
        assert_eq!(results.len(), 4);
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.lexeme, "@");
        assert_eq!(err.location, SourceLocation::new(1, 3));
        assert!(matches!(results[2], Ok(Token { kind: TokenKind::Ident, .. })));
    }

    #[test]
    fn test_unterminated_string_resumes_next_line() {
        let results: Vec<_> = Lexer::new("show \"oops\nread x").collect();
        assert!(results[1].is_err());
        assert!(matches!(
            results[2],
            Ok(Token { kind: TokenKind::Keyword(Keyword::Read), .. })
        ));
    }

    #[test]
    fn test_malformed_literals() {
        let err = Lexer::new("3.").next_token().unwrap_err();
        assert_eq!(err.lexeme, "3.");

        let err = Lexer::new("#12g").next_token().unwrap_err();
        assert_eq!(err.lexeme, "#12g");

        let ok = Lexer::new("#A0f").next_token().unwrap();
        assert_eq!(ok.kind, TokenKind::HexColor);
    }

    #[test]
    fn test_number_out_of_range() {
        let huge = "9".repeat(400);
        let mut lexer = Lexer::new(&format!("{} + 1", huge));
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.lexeme, huge);
        assert_eq!(err.location, SourceLocation::new(1, 1));
        // scanning resumes after the literal
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Plus);

        let wide = format!("{}.5", "9".repeat(300));
        assert_eq!(Lexer::new(&wide).next_token().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_directives() {
        let tokens = kinds("%default %COLOR %figura %font %fontsize");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Directive(DirectiveKind::Default),
                TokenKind::Directive(DirectiveKind::Color),
                TokenKind::Directive(DirectiveKind::Figure),
                TokenKind::Directive(DirectiveKind::Font),
                TokenKind::Directive(DirectiveKind::FontSize),
                TokenKind::Eof,
            ]
        );
        assert!(Lexer::new("%bogus").next_token().is_err());
    }

    #[test]
    fn test_iterator_ends_after_eof() {
        let mut lexer = Lexer::new("");
        assert!(matches!(lexer.next(), Some(Ok(Token { kind: TokenKind::Eof, .. }))));
        assert!(lexer.next().is_none());
    }
}
