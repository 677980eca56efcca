//! Source code pane rendering with syntax highlighting
//!
//! Displays the compiled pseudocode with line numbers. Lines that carry a
//! diagnostic get a marker in the gutter, and the line of the selected
//! diagnostic is highlighted and kept at a fixed row while scrolling.
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without running the full lexer.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for pseudocode
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Handle comments
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            flush_word(&mut spans, &mut current_word);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        // Handle strings
        if c == '"' {
            flush_word(&mut spans, &mut current_word);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != '"' {
                if chars[end] == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            end = (end + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            spans.push(Span::styled(literal, Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        // Directives and hex colors run to the end of the word
        if c == '%' || c == '#' {
            flush_word(&mut spans, &mut current_word);
            let mut end = i + 1;
            while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let word: String = chars[i..end].iter().collect();
            spans.push(Span::styled(word, Style::default().fg(DEFAULT_THEME.directive)));
            i = end;
            continue;
        }

        // Handle non-alphanumeric (delimiters)
        if !c.is_alphanumeric() && c != '_' && c != '.' {
            flush_word(&mut spans, &mut current_word);

            let style = match c {
                '{' | '}' | '(' | ')' => Style::default().fg(DEFAULT_THEME.primary), // Brackets
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String) {
    if !word.is_empty() {
        let style = get_keyword_style(word);
        spans.push(Span::styled(std::mem::take(word), style));
    }
}

fn get_keyword_style(word: &str) -> Style {
    match word.to_lowercase().as_str() {
        "var" | "if" | "si" | "while" | "mientras" | "show" | "mostrar" | "read" | "leer" => {
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD) // Keywords
        }
        "and" | "or" | "not" => Style::default().fg(DEFAULT_THEME.keyword),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ => Style::default().fg(DEFAULT_THEME.fg), // Identifiers
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the highlighted line is kept at (None = center on first render)
    pub target_line_row: Option<usize>,
}

pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    /// Line to highlight, 1-based; 0 or out of range for none
    pub highlight_line: usize,
    /// Lines carrying at least one diagnostic
    pub error_lines: &'a [usize],
    pub is_focused: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: &SourceRenderData<'_>,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if data.is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();

    // Account for borders (2), min 1
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Keep the highlighted line at the target visual row
    if data.highlight_line > 0 && data.highlight_line <= total_lines {
        scroll_state.offset = (data.highlight_line - 1).saturating_sub(target_row);
    }
    let max_scroll = total_lines.saturating_sub(visible_height);
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_highlighted = line_num == data.highlight_line;
            let has_error = data.error_lines.contains(&line_num);

            let marker = if has_error { "✗" } else { " " };
            let num_style = if is_highlighted {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if has_error {
                Style::default().fg(DEFAULT_THEME.error)
            } else {
                Style::default().fg(DEFAULT_THEME.comment) // Line numbers
            };

            let mut content_line = highlight_source_code(line);
            if is_highlighted {
                // White text on red for visibility
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content_line.spans {
                    span.style = error_style;
                }
            }

            let mut final_spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            final_spans.extend(content_line.spans);

            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_tokens() {
        let line = highlight_source_code("si x > 3 { mostrar \"a b\" } // fin");
        let words = words(&line);
        assert!(words.contains(&"si".to_string()));
        assert!(words.contains(&"\"a b\"".to_string()));
        assert_eq!(words.last().map(String::as_str), Some("// fin"));
    }

    #[test]
    fn test_keyword_style_is_case_insensitive() {
        assert_eq!(get_keyword_style("MIENTRAS"), get_keyword_style("while"));
        assert_ne!(get_keyword_style("x"), get_keyword_style("while"));
    }

    #[test]
    fn test_directive_is_one_span() {
        let line = highlight_source_code("%color if = #ff0000");
        let words = words(&line);
        assert_eq!(words[0], "%color");
        assert!(words.contains(&"#ff0000".to_string()));
    }
}
