//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Passing checks (green)
    pub success: Style,
    /// Failing checks (red)
    pub error: Style,
    /// Dimmed/secondary text, e.g. failure details
    pub dim: Style,
    /// Headers/section titles
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.error = Style::new().red();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
