use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub title: Color,
    pub label: Color,     // Register names, column headers
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub number: Color,    // Hex values
    pub pointer: Color,   // segment:offset addresses
    pub offset: Color,    // Memory row headers
    pub ascii: Color,
    pub border: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    title: Color::Rgb(137, 180, 250),   // Blue
    label: Color::Rgb(249, 226, 175),   // Yellow
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    number: Color::Rgb(250, 179, 135),  // Orange
    pointer: Color::Rgb(148, 226, 213), // Teal
    offset: Color::Rgb(108, 112, 134),
    ascii: Color::Rgb(245, 194, 231),   // Pink
    border: Color::Rgb(108, 112, 134),
};
