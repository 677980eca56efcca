//! Main TUI application state and logic

use crate::compiler::CompilationResult;
use crate::ui::panes::{self, ReportRenderData, SourceRenderData, SourceScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::Duration;

/// Report tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Errors,
    Diagram,
    Operators,
    Structures,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Errors, Tab::Diagram, Tab::Operators, Tab::Structures];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Errors => "Errors",
            Tab::Diagram => "Diagram",
            Tab::Operators => "Operators",
            Tab::Structures => "Structures",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Errors => 0,
            Tab::Diagram => 1,
            Tab::Operators => 2,
            Tab::Structures => 3,
        }
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Report,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Report,
            FocusedPane::Report => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The compilation being inspected
    pub result: CompilationResult,

    /// The source code that was compiled
    pub source_code: String,

    /// Shown in the status bar
    pub file_name: String,

    pub tab: Tab,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub report_scroll: usize,

    /// Index into `result.errors`
    pub selected_error: usize,

    /// Lines carrying a diagnostic, for the source gutter
    error_lines: Vec<usize>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app. It opens on the Errors tab when there are errors,
    /// on the Diagram otherwise.
    pub fn new(result: CompilationResult, source_code: String, file_name: String) -> Self {
        let mut error_lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
        error_lines.dedup();

        let (tab, status_message) = if result.errors.is_empty() {
            (Tab::Diagram, "Compiled without errors".to_string())
        } else {
            (Tab::Errors, "Compilation reported errors".to_string())
        };

        App {
            result,
            source_code,
            file_name,
            tab,
            focused_pane: FocusedPane::Report,
            source_scroll: SourceScrollState::default(),
            report_scroll: 0,
            selected_error: 0,
            error_lines,
            should_quit: false,
            status_message,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Line of the selected error, if the Errors tab is showing one.
    pub fn highlighted_line(&self) -> usize {
        match self.tab {
            Tab::Errors => self
                .result
                .errors
                .get(self.selected_error)
                .map_or(0, |error| error.line),
            _ => 0,
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Source (left) | Report (right)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_chunks[0]);

        panes::render_source_pane(
            frame,
            columns[0],
            &SourceRenderData {
                source_code: &self.source_code,
                highlight_line: self.highlighted_line(),
                error_lines: &self.error_lines,
                is_focused: self.focused_pane == FocusedPane::Source,
            },
            &mut self.source_scroll,
        );

        panes::render_report_pane(
            frame,
            columns[1],
            &ReportRenderData {
                result: &self.result,
                tab: self.tab,
                selected_error: self.selected_error,
                is_focused: self.focused_pane == FocusedPane::Report,
            },
            &mut self.report_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.file_name,
            &self.status_message,
            self.result.errors.len(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Right => self.select_tab(self.tab.next()),
            KeyCode::Left => self.select_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.select_tab(Tab::ALL[index]);
            }
            KeyCode::Up => self.move_by(-1),
            KeyCode::Down => self.move_by(1),
            KeyCode::PageUp => self.move_by(-10),
            KeyCode::PageDown => self.move_by(10),
            KeyCode::Home => {
                self.selected_error = 0;
                self.report_scroll = 0;
                self.source_scroll.offset = 0;
            }
            _ => {}
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.report_scroll = 0;
        self.status_message = format!("{} tab", tab.title());
    }

    /// Scroll the focused pane, or move the error selection on the Errors tab.
    fn move_by(&mut self, delta: isize) {
        match self.focused_pane {
            FocusedPane::Source => {
                if self.highlighted_line() > 0 {
                    // Scrolling up makes the highlighted line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add_signed(-delta));
                    }
                } else {
                    self.source_scroll.offset = self.source_scroll.offset.saturating_add_signed(delta);
                }
            }
            FocusedPane::Report if self.tab == Tab::Errors => {
                let last = self.result.errors.len().saturating_sub(1);
                self.selected_error = self.selected_error.saturating_add_signed(delta).min(last);
                if let Some(error) = self.result.errors.get(self.selected_error) {
                    self.status_message =
                        format!("{} at {}: {}", error.kind, error.location(), error.description);
                }
            }
            FocusedPane::Report => {
                self.report_scroll = self.report_scroll.saturating_add_signed(delta);
            }
        }
    }
}
