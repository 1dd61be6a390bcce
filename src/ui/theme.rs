use owo_colors::Style;
use std::sync::LazyLock;

static THEME: LazyLock<Theme> = LazyLock::new(|| Theme::for_terminal(console::Term::stdout().is_term()));

/// Styles for CLI output
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub dim: Style,
    /// Project-relative file paths
    pub path: Style,
}

impl Theme {
    /// Colored when writing to a terminal, unstyled when piped
    pub fn for_terminal(is_term: bool) -> Self {
        let pick = |style: Style| if is_term { style } else { Style::new() };
        Self {
            header: pick(Style::new().cyan().bold()),
            success: pick(Style::new().green().bold()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow().bold()),
            dim: pick(Style::new().bright_black()),
            path: pick(Style::new().blue()),
        }
    }
}

pub fn theme() -> &'static Theme {
    &THEME
}
