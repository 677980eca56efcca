//! Color palette shared by every pane.

use ratatui::style::Color;

pub struct Theme {
    // Chrome
    pub fg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub comment: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,

    // Outcome badges and diagnostics
    pub success: Color,
    pub error: Color,

    // Source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub directive: Color,

    /// Diagram node color when no `%color` directive applies.
    pub node: Color,
    pub connector: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),
    secondary: Color::Rgb(250, 179, 135),
    comment: Color::Rgb(108, 112, 134),
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(50, 50, 70),

    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),

    keyword: Color::Rgb(137, 180, 250),
    string: Color::Rgb(166, 227, 161), // green, so numbers and strings differ
    number: Color::Rgb(250, 179, 135),
    directive: Color::Rgb(245, 194, 231),

    node: Color::Rgb(148, 226, 213),
    connector: Color::Rgb(88, 91, 112),
};
