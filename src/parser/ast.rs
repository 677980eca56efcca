// AST (Abstract Syntax Tree) definitions for the pseudocode language

use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Root of the tree: the compilation unit.
///
/// Configuration directives may be interleaved with instructions in the
/// source, including inside blocks; they are all hoisted here in source
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub configurations: Vec<ConfigInstruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the tree, the root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        Node::Program(self).walk(&mut |_| count += 1);
        count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Instruction {
    VarDeclaration {
        name: String,
        value: Option<Expression>,
    },
    Assignment {
        name: String,
        value: Expression,
    },
    If {
        condition: Condition,
        body: Vec<Instruction>,
    },
    While {
        condition: Condition,
        body: Vec<Instruction>,
    },
    Show {
        content: String,
    },
    Read {
        variable: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Number(f64),
    Identifier(String),
    Binary {
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn binary(left: Expression, operator: impl Into<String>, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            operator: operator.into(),
            right: Box::new(right),
        }
    }

    /// Binding strength of the node when printed; leaves bind tightest.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { operator, .. } => arithmetic_precedence(operator),
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    Relational {
        left: Expression,
        operator: String,
        right: Expression,
    },
    Logical {
        left: Box<Condition>,
        operator: String,
        right: Box<Condition>,
    },
    Not(Box<Condition>),
}

impl Condition {
    pub fn logical(left: Condition, operator: impl Into<String>, right: Condition) -> Self {
        Condition::Logical {
            left: Box::new(left),
            operator: operator.into(),
            right: Box::new(right),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Condition::Logical { operator, .. } => logical_precedence(operator),
            _ => 3,
        }
    }
}

/// Diagram styling directives. The front-end records them; interpreting
/// them is up to the renderer, in `index` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConfigInstruction {
    Default {
        index: usize,
    },
    Color {
        target: String,
        value: ColorValue,
        index: usize,
    },
    Figure {
        target: String,
        figure: String,
        index: usize,
    },
    Font {
        target: String,
        font: String,
        index: usize,
    },
    FontSize {
        target: String,
        size: Expression,
        index: usize,
    },
}

impl ConfigInstruction {
    pub fn index(&self) -> usize {
        match self {
            ConfigInstruction::Default { index }
            | ConfigInstruction::Color { index, .. }
            | ConfigInstruction::Figure { index, .. }
            | ConfigInstruction::Font { index, .. }
            | ConfigInstruction::FontSize { index, .. } => *index,
        }
    }

    /// The diagram element the directive styles; `None` for `%default`.
    pub fn target(&self) -> Option<&str> {
        match self {
            ConfigInstruction::Default { .. } => None,
            ConfigInstruction::Color { target, .. }
            | ConfigInstruction::Figure { target, .. }
            | ConfigInstruction::Font { target, .. }
            | ConfigInstruction::FontSize { target, .. } => Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColorValue {
    Rgb { r: u8, g: u8, b: u8 },
    Hex(String),
}

impl ColorValue {
    /// Resolve to RGB components. `#abc` expands to `#aabbcc`.
    pub fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            ColorValue::Rgb { r, g, b } => Some((*r, *g, *b)),
            ColorValue::Hex(hex) => {
                let digits = hex.strip_prefix('#').unwrap_or(hex);
                let expanded: String = match digits.len() {
                    3 => digits.chars().flat_map(|c| [c, c]).collect(),
                    6 => digits.to_string(),
                    _ => return None,
                };
                let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
                Some((channel(0)?, channel(2)?, channel(4)?))
            }
        }
    }
}

/// Directive targets, i.e. the diagram elements a directive can style.
pub const CONFIG_TARGETS: &[&str] = &["if", "while", "var", "assign", "show", "read", "start", "end"];

/// Borrowed view over any node family, for generic traversal.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Instruction(&'a Instruction),
    Expression(&'a Expression),
    Condition(&'a Condition),
    Config(&'a ConfigInstruction),
    Color(&'a ColorValue),
}

impl<'a> Node<'a> {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Program(program) => program
                .instructions
                .iter()
                .map(Node::Instruction)
                .chain(program.configurations.iter().map(Node::Config))
                .collect(),
            Node::Instruction(instruction) => match instruction {
                Instruction::VarDeclaration { value, .. } => {
                    value.iter().map(Node::Expression).collect()
                }
                Instruction::Assignment { value, .. } => vec![Node::Expression(value)],
                Instruction::If { condition, body } | Instruction::While { condition, body } => {
                    std::iter::once(Node::Condition(condition))
                        .chain(body.iter().map(Node::Instruction))
                        .collect()
                }
                Instruction::Show { .. } | Instruction::Read { .. } => Vec::new(),
            },
            Node::Expression(expression) => match expression {
                Expression::Binary { left, right, .. } => {
                    vec![Node::Expression(left), Node::Expression(right)]
                }
                Expression::Number(_) | Expression::Identifier(_) => Vec::new(),
            },
            Node::Condition(condition) => match condition {
                Condition::Relational { left, right, .. } => {
                    vec![Node::Expression(left), Node::Expression(right)]
                }
                Condition::Logical { left, right, .. } => {
                    vec![Node::Condition(left), Node::Condition(right)]
                }
                Condition::Not(inner) => vec![Node::Condition(inner)],
            },
            Node::Config(config) => match config {
                ConfigInstruction::Color { value, .. } => vec![Node::Color(value)],
                ConfigInstruction::FontSize { size, .. } => vec![Node::Expression(size)],
                ConfigInstruction::Default { .. }
                | ConfigInstruction::Figure { .. }
                | ConfigInstruction::Font { .. } => Vec::new(),
            },
            Node::Color(_) => Vec::new(),
        }
    }

    /// Pre-order traversal.
    pub fn walk<F: FnMut(Node<'a>)>(self, visit: &mut F) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

// ===== Canonical printer =====
//
// The `Display` impls print source text that parses back into an equal tree.

fn arithmetic_precedence(operator: &str) -> u8 {
    match operator {
        "*" | "/" => 2,
        _ => 1,
    }
}

fn logical_precedence(operator: &str) -> u8 {
    match operator.to_ascii_lowercase().as_str() {
        "&&" | "and" => 2,
        _ => 1,
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{}", value),
            Expression::Identifier(name) => f.write_str(name),
            Expression::Binary { left, operator, right } => {
                let precedence = arithmetic_precedence(operator);
                if left.precedence() < precedence {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", operator)?;
                // Left-associative: an equal-precedence right operand needs parens.
                if right.precedence() <= precedence {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Relational { left, operator, right } => {
                write!(f, "{} {} {}", left, operator, right)
            }
            Condition::Logical { left, operator, right } => {
                let precedence = logical_precedence(operator);
                if left.precedence() < precedence {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", operator)?;
                if right.precedence() <= precedence {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
            Condition::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Rgb { r, g, b } => write!(f, "{}, {}, {}", r, g, b),
            ColorValue::Hex(hex) => f.write_str(hex),
        }
    }
}

impl fmt::Display for ConfigInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigInstruction::Default { .. } => f.write_str("%default"),
            ConfigInstruction::Color { target, value, .. } => {
                write!(f, "%color {} = {}", target, value)
            }
            ConfigInstruction::Figure { target, figure, .. } => {
                write!(f, "%figure {} = {}", target, figure)
            }
            ConfigInstruction::Font { target, font, .. } => {
                write!(f, "%font {} = ", target)?;
                write_escaped(f, font)
            }
            ConfigInstruction::FontSize { target, size, .. } => {
                write!(f, "%fontsize {} = {}", target, size)
            }
        }
    }
}

impl Instruction {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "    ".repeat(depth);
        match self {
            Instruction::VarDeclaration { name, value: Some(value) } => {
                writeln!(f, "{}var {} = {}", pad, name, value)
            }
            Instruction::VarDeclaration { name, value: None } => writeln!(f, "{}var {}", pad, name),
            Instruction::Assignment { name, value } => writeln!(f, "{}{} = {}", pad, name, value),
            Instruction::If { condition, body } | Instruction::While { condition, body } => {
                let keyword = if matches!(self, Instruction::If { .. }) { "if" } else { "while" };
                writeln!(f, "{}{} {} {{", pad, keyword, condition)?;
                for instruction in body {
                    instruction.fmt_indented(f, depth + 1)?;
                }
                writeln!(f, "{}}}", pad)
            }
            Instruction::Show { content } => {
                write!(f, "{}show ", pad)?;
                write_escaped(f, content)?;
                writeln!(f)
            }
            Instruction::Read { variable } => writeln!(f, "{}read {}", pad, variable),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            instruction.fmt_indented(f, 0)?;
        }
        for config in &self.configurations {
            writeln!(f, "{}", config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    #[test]
    fn test_expression_parenthesization() {
        // (a + b) * 2
        let sum = Expression::binary(ident("a"), "+", ident("b"));
        let product = Expression::binary(sum, "*", Expression::Number(2.0));
        assert_eq!(product.to_string(), "(a + b) * 2");

        // a - (b - c) keeps its grouping
        let inner = Expression::binary(ident("b"), "-", ident("c"));
        let outer = Expression::binary(ident("a"), "-", inner);
        assert_eq!(outer.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_condition_printing() {
        let gt = Condition::Relational {
            left: ident("x"),
            operator: ">".to_string(),
            right: Expression::Number(3.0),
        };
        assert_eq!(gt.to_string(), "x > 3");

        let lt = Condition::Relational {
            left: ident("y"),
            operator: "<".to_string(),
            right: Expression::Number(1.5),
        };
        let either = Condition::logical(gt.clone(), "||", lt.clone());
        let both = Condition::logical(either, "&&", Condition::Not(Box::new(lt)));
        assert_eq!(both.to_string(), "(x > 3 || y < 1.5) && !(y < 1.5)");
    }

    #[test]
    fn test_hex_color_to_rgb() {
        assert_eq!(ColorValue::Hex("#ff8000".into()).to_rgb(), Some((255, 128, 0)));
        assert_eq!(ColorValue::Hex("#fff".into()).to_rgb(), Some((255, 255, 255)));
        assert_eq!(ColorValue::Rgb { r: 1, g: 2, b: 3 }.to_rgb(), Some((1, 2, 3)));
    }

    #[test]
    fn test_node_count() {
        let program = Program {
            instructions: vec![
                Instruction::VarDeclaration { name: "x".into(), value: None },
                Instruction::Assignment {
                    name: "x".into(),
                    value: Expression::binary(ident("x"), "+", Expression::Number(1.0)),
                },
            ],
            configurations: vec![ConfigInstruction::Default { index: 0 }],
        };
        // program, var, assign, binary, x, 1, default
        assert_eq!(program.node_count(), 7);
    }
}
