//! Flowchart pane
//!
//! Draws the program as a vertical text flowchart: one node per instruction,
//! `if`/`while` bodies indented under their header. Node styling comes from
//! the program's configuration directives, applied in `index` order:
//!
//! - `%color target = …` sets the node color
//! - `%figure target = name` sets the node outline (rectangle, diamond, ...)
//! - `%font` / `%fontsize` cannot change a terminal font; they are listed in
//!   a legend under the chart
//! - `%default` drops every style set so far
//!
//! The chart is only drawn from an authoritative program, i.e. when the
//! compilation produced no errors.

use crate::parser::ast::{ConfigInstruction, Instruction, Program};
use crate::ui::theme::DEFAULT_THEME;
use log::warn;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustc_hash::FxHashMap;

/// Node outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Rectangle,
    Diamond,
    Oval,
    Parallelogram,
    Circle,
}

impl Figure {
    /// Accepts English and Spanish names, any case.
    pub fn from_name(name: &str) -> Option<Self> {
        let figure = match name.to_lowercase().as_str() {
            "rectangle" | "rectangulo" | "rectángulo" | "box" | "process" | "proceso" => {
                Figure::Rectangle
            }
            "diamond" | "rombo" | "decision" | "decisión" => Figure::Diamond,
            "oval" | "ovalo" | "óvalo" | "ellipse" | "elipse" | "terminal" => Figure::Oval,
            "parallelogram" | "paralelogramo" | "io" => Figure::Parallelogram,
            "circle" | "circulo" | "círculo" => Figure::Circle,
            _ => return None,
        };
        Some(figure)
    }

    pub fn wrap(self, text: &str) -> String {
        match self {
            Figure::Rectangle => format!("[ {} ]", text),
            Figure::Diamond => format!("< {} >", text),
            Figure::Oval => format!("( {} )", text),
            Figure::Parallelogram => format!("/ {} /", text),
            Figure::Circle => format!("(( {} ))", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub figure: Figure,
    pub color: Option<Color>,
    pub font: Option<String>,
    pub font_size: Option<String>,
}

impl NodeStyle {
    /// Built-in look of a node kind before any directive applies.
    pub fn for_target(target: &str) -> Self {
        let figure = match target {
            "start" | "end" => Figure::Oval,
            "if" | "while" => Figure::Diamond,
            "show" | "read" => Figure::Parallelogram,
            _ => Figure::Rectangle,
        };
        Self {
            figure,
            color: None,
            font: None,
            font_size: None,
        }
    }
}

/// Per-target styles resolved from the configuration directives.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: FxHashMap<String, NodeStyle>,
}

impl StyleTable {
    pub fn from_configurations(configurations: &[ConfigInstruction]) -> Self {
        let mut ordered: Vec<&ConfigInstruction> = configurations.iter().collect();
        ordered.sort_by_key(|config| config.index());

        let mut table = Self::default();
        for config in ordered {
            match config {
                ConfigInstruction::Default { .. } => table.styles.clear(),
                ConfigInstruction::Color { target, value, .. } => {
                    if let Some((r, g, b)) = value.to_rgb() {
                        table.entry(target).color = Some(Color::Rgb(r, g, b));
                    }
                }
                ConfigInstruction::Figure { target, figure, .. } => match Figure::from_name(figure) {
                    Some(shape) => table.entry(target).figure = shape,
                    None => warn!("unknown figure '{}' for '{}', keeping the default", figure, target),
                },
                ConfigInstruction::Font { target, font, .. } => {
                    table.entry(target).font = Some(font.clone());
                }
                ConfigInstruction::FontSize { target, size, .. } => {
                    table.entry(target).font_size = Some(size.to_string());
                }
            }
        }
        table
    }

    fn entry(&mut self, target: &str) -> &mut NodeStyle {
        self.styles
            .entry(target.to_string())
            .or_insert_with(|| NodeStyle::for_target(target))
    }

    pub fn style_for(&self, target: &str) -> NodeStyle {
        self.styles
            .get(target)
            .cloned()
            .unwrap_or_else(|| NodeStyle::for_target(target))
    }

    /// Targets carrying a font or font size, sorted by name.
    pub fn font_legend(&self) -> Vec<(String, &NodeStyle)> {
        let mut legend: Vec<_> = self
            .styles
            .iter()
            .filter(|(_, style)| style.font.is_some() || style.font_size.is_some())
            .map(|(target, style)| (target.clone(), style))
            .collect();
        legend.sort_by(|a, b| a.0.cmp(&b.0));
        legend
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Node { target: &'static str, text: String },
    Arrow,
    Label(String),
}

/// One line of the chart. `depth` is the nesting level of the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRow {
    pub depth: usize,
    pub kind: RowKind,
}

/// Lay the program out top to bottom, between a start and an end node.
pub fn layout(program: &Program) -> Vec<DiagramRow> {
    let mut rows = vec![node(0, "start", "start".to_string())];
    layout_body(&program.instructions, 0, &mut rows);
    rows.push(DiagramRow {
        depth: 0,
        kind: RowKind::Arrow,
    });
    rows.push(node(0, "end", "end".to_string()));
    rows
}

fn layout_body(instructions: &[Instruction], depth: usize, rows: &mut Vec<DiagramRow>) {
    for instruction in instructions {
        rows.push(DiagramRow {
            depth,
            kind: RowKind::Arrow,
        });
        match instruction {
            Instruction::If { condition, body } => {
                rows.push(node(depth, "if", format!("if {}", condition)));
                rows.push(label(depth + 1, "yes"));
                layout_body(body, depth + 1, rows);
                rows.push(label(depth, "end if"));
            }
            Instruction::While { condition, body } => {
                rows.push(node(depth, "while", format!("while {}", condition)));
                rows.push(label(depth + 1, "repeat"));
                layout_body(body, depth + 1, rows);
                rows.push(label(depth, "back to while"));
            }
            Instruction::VarDeclaration { .. } => rows.push(node(depth, "var", flat(instruction))),
            Instruction::Assignment { .. } => rows.push(node(depth, "assign", flat(instruction))),
            Instruction::Show { .. } => rows.push(node(depth, "show", flat(instruction))),
            Instruction::Read { .. } => rows.push(node(depth, "read", flat(instruction))),
        }
    }
}

fn node(depth: usize, target: &'static str, text: String) -> DiagramRow {
    DiagramRow {
        depth,
        kind: RowKind::Node { target, text },
    }
}

fn label(depth: usize, text: &str) -> DiagramRow {
    DiagramRow {
        depth,
        kind: RowKind::Label(text.to_string()),
    }
}

/// Single-line rendering of a simple instruction.
fn flat(instruction: &Instruction) -> String {
    instruction.to_string().trim_end().to_string()
}

fn render_row(row: &DiagramRow, styles: &StyleTable) -> Line<'static> {
    let rail = Style::default().fg(DEFAULT_THEME.connector);
    let mut spans = vec![Span::styled("  │ ".repeat(row.depth), rail)];

    match &row.kind {
        RowKind::Arrow => spans.push(Span::styled("  ↓", rail)),
        RowKind::Label(text) => spans.push(Span::styled(
            format!("  ╰ {}", text),
            Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::ITALIC),
        )),
        RowKind::Node { target, text } => {
            let style = styles.style_for(target);
            spans.push(Span::styled(
                style.figure.wrap(text),
                Style::default()
                    .fg(style.color.unwrap_or(DEFAULT_THEME.node))
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    Line::from(spans)
}

/// Render the diagram pane
pub fn render_diagram_pane(
    frame: &mut Frame,
    area: Rect,
    program: Option<&Program>,
    error_count: usize,
    scroll: &mut usize,
) {
    let block = Block::default().title(" Diagram ").borders(Borders::ALL);

    let program = match program {
        Some(program) if error_count == 0 => program,
        _ => {
            let message = if error_count > 0 {
                format!(
                    "No diagram: fix the {} error(s) reported in the Errors tab first.",
                    error_count
                )
            } else {
                "No program to draw.".to_string()
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(DEFAULT_THEME.error),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let styles = StyleTable::from_configurations(&program.configurations);
    let mut lines: Vec<Line> = layout(program)
        .iter()
        .map(|row| render_row(row, &styles))
        .collect();

    let legend = styles.font_legend();
    if !legend.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Fonts:",
            Style::default().fg(DEFAULT_THEME.directive),
        )));
        for (target, style) in legend {
            let font = style.font.as_deref().unwrap_or("default");
            let size = style.font_size.as_deref().unwrap_or("default");
            lines.push(Line::from(Span::styled(
                format!("  {:<7} {} (size {})", target, font, size),
                Style::default().fg(DEFAULT_THEME.comment),
            )));
        }
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll = (*scroll).min(max_scroll);

    let visible: Vec<Line> = lines.into_iter().skip(*scroll).collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::parser::ast::ColorValue;

    #[test]
    fn test_layout_nests_bodies() {
        let result = compile("var x = 1\nwhile x < 3 {\n  x = x + 1\n}\nshow \"done\"");
        let rows = layout(result.program.as_ref().unwrap());

        let nodes: Vec<(usize, &str)> = rows
            .iter()
            .filter_map(|row| match &row.kind {
                RowKind::Node { target, .. } => Some((row.depth, *target)),
                _ => None,
            })
            .collect();
        assert_eq!(
            nodes,
            vec![
                (0, "start"),
                (0, "var"),
                (0, "while"),
                (1, "assign"),
                (0, "show"),
                (0, "end")
            ]
        );
    }

    #[test]
    fn test_node_text() {
        let result = compile("if x >= 2 { read x }");
        let rows = layout(result.program.as_ref().unwrap());
        assert!(rows.contains(&DiagramRow {
            depth: 0,
            kind: RowKind::Node {
                target: "if",
                text: "if x >= 2".into()
            }
        }));
        assert!(rows.contains(&DiagramRow {
            depth: 1,
            kind: RowKind::Node {
                target: "read",
                text: "read x".into()
            }
        }));
    }

    #[test]
    fn test_styles_apply_in_index_order() {
        let configs = vec![
            ConfigInstruction::Color {
                target: "if".into(),
                value: ColorValue::Hex("#ff0000".into()),
                index: 0,
            },
            ConfigInstruction::Figure {
                target: "var".into(),
                figure: "Ovalo".into(),
                index: 1,
            },
            ConfigInstruction::Default { index: 2 },
            ConfigInstruction::Color {
                target: "show".into(),
                value: ColorValue::Rgb { r: 1, g: 2, b: 3 },
                index: 3,
            },
        ];
        let table = StyleTable::from_configurations(&configs);

        // everything before %default is gone
        assert_eq!(table.style_for("if"), NodeStyle::for_target("if"));
        assert_eq!(table.style_for("var").figure, Figure::Rectangle);
        assert_eq!(table.style_for("show").color, Some(Color::Rgb(1, 2, 3)));
        assert_eq!(table.style_for("show").figure, Figure::Parallelogram);
    }

    #[test]
    fn test_unknown_figure_keeps_default() {
        let configs = vec![ConfigInstruction::Figure {
            target: "while".into(),
            figure: "hexagon".into(),
            index: 0,
        }];
        let table = StyleTable::from_configurations(&configs);
        assert_eq!(table.style_for("while").figure, Figure::Diamond);
    }

    #[test]
    fn test_font_legend() {
        let result = compile("%fuente read = \"Mono\"\n%tamfuente read = 12\n%color if = #fff");
        let table = StyleTable::from_configurations(&result.program.unwrap().configurations);
        let legend = table.font_legend();
        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].0, "read");
        assert_eq!(legend[0].1.font.as_deref(), Some("Mono"));
        assert_eq!(legend[0].1.font_size.as_deref(), Some("12"));
    }

    #[test]
    fn test_figure_wrap() {
        assert_eq!(Figure::Diamond.wrap("if x"), "< if x >");
        assert_eq!(Figure::from_name("ROMBO"), Some(Figure::Diamond));
        assert_eq!(Figure::from_name("star"), None);
    }
}
