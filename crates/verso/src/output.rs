//! Colored terminal output on stderr.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.green, msg);
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.yellow, msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.red, msg);
    }

    /// Print a heading (cyan bold).
    pub(crate) fn heading(&self, msg: &str) {
        self.styled(&self.cyan_bold, msg);
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
