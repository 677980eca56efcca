//! Report pane: a tab bar over the compilation result
//!
//! - Errors: every diagnostic, the selected one highlighted
//! - Diagram: see [`super::diagram`]
//! - Operators: the operator report in source order
//! - Structures: the control-structure report

use super::diagram::render_diagram_pane;
use crate::compiler::CompilationResult;
use crate::diagnostics::ErrorKind;
use crate::ui::app::Tab;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

pub struct ReportRenderData<'a> {
    pub result: &'a CompilationResult,
    pub tab: Tab,
    pub selected_error: usize,
    pub is_focused: bool,
}

/// Render the tab bar and the active tab
pub fn render_report_pane(
    frame: &mut Frame,
    area: Rect,
    data: &ReportRenderData<'_>,
    scroll: &mut usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let border_style = if data.is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let result = data.result;
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let count = match tab {
                Tab::Errors => Some(result.errors.len()),
                Tab::Diagram => None,
                Tab::Operators => Some(result.operator_report.len()),
                Tab::Structures => Some(result.control_report.len()),
            };
            match count {
                Some(count) => Line::from(format!("{} ({})", tab.title(), count)),
                None => Line::from(tab.title()),
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(data.tab.index())
        .block(
            Block::default()
                .title(" Report ")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .style(Style::default().fg(DEFAULT_THEME.comment))
        .highlight_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    let body = chunks[1];
    match data.tab {
        Tab::Errors => render_errors(frame, body, result, data.selected_error),
        Tab::Diagram => render_diagram_pane(
            frame,
            body,
            result.program.as_ref(),
            result.errors.len(),
            scroll,
        ),
        Tab::Operators => {
            let rows: Vec<Row> = result
                .operator_report
                .iter()
                .map(|op| {
                    Row::new(vec![
                        Cell::from(op.operator.clone())
                            .style(Style::default().fg(DEFAULT_THEME.keyword)),
                        Cell::from(op.line.to_string()),
                        Cell::from(op.column.to_string()),
                        Cell::from(op.occurrence.clone()),
                    ])
                })
                .collect();
            render_table(
                frame,
                body,
                " Operators ",
                ["Operator", "Line", "Col", "Occurrence"],
                [
                    Constraint::Length(9),
                    Constraint::Length(6),
                    Constraint::Length(5),
                    Constraint::Min(10),
                ],
                rows,
                scroll,
            );
        }
        Tab::Structures => {
            let rows: Vec<Row> = result
                .control_report
                .iter()
                .map(|control| {
                    Row::new(vec![
                        Cell::from(control.kind.to_string())
                            .style(Style::default().fg(DEFAULT_THEME.keyword)),
                        Cell::from(control.line.to_string()),
                        Cell::from(control.condition.clone()),
                    ])
                })
                .collect();
            render_table(
                frame,
                body,
                " Control structures ",
                ["Type", "Line", "Condition"],
                [
                    Constraint::Length(7),
                    Constraint::Length(6),
                    Constraint::Min(10),
                ],
                rows,
                scroll,
            );
        }
    }
}

fn header_row<const N: usize>(titles: [&'static str; N]) -> Row<'static> {
    Row::new(titles.to_vec()).style(
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    )
}

/// Scrollable table; `scroll` is clamped to the last row.
fn render_table<const N: usize>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    headers: [&'static str; N],
    widths: [Constraint; N],
    rows: Vec<Row<'_>>,
    scroll: &mut usize,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);

    if rows.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            "Nothing to report.",
            Style::default().fg(DEFAULT_THEME.comment),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    *scroll = (*scroll).min(rows.len() - 1);
    let visible: Vec<Row> = rows.into_iter().skip(*scroll).collect();
    let table = Table::new(visible, widths)
        .header(header_row(headers))
        .block(block);
    frame.render_widget(table, area);
}

fn render_errors(frame: &mut Frame, area: Rect, result: &CompilationResult, selected: usize) {
    let block = Block::default().title(" Errors ").borders(Borders::ALL);

    if result.errors.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            "No errors. The program compiled cleanly.",
            Style::default()
                .fg(DEFAULT_THEME.success)
                .add_modifier(Modifier::BOLD),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let rows: Vec<Row> = result
        .errors
        .iter()
        .map(|error| {
            let kind_color = match error.kind {
                ErrorKind::Lexical => DEFAULT_THEME.secondary,
                ErrorKind::Syntactic => DEFAULT_THEME.error,
                ErrorKind::Fatal => Color::Red,
            };
            Row::new(vec![
                Cell::from(error.kind.label()).style(Style::default().fg(kind_color)),
                Cell::from(error.line.to_string()),
                Cell::from(error.column.to_string()),
                Cell::from(error.lexeme.clone()).style(Style::default().fg(DEFAULT_THEME.string)),
                Cell::from(error.description.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header_row(["Type", "Line", "Col", "Lexeme", "Description"]))
    .block(block)
    .highlight_style(Style::default().bg(DEFAULT_THEME.current_line_bg))
    .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(Some(selected.min(result.errors.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}
