//! Status output for the texkit CLI.
//!
//! Lines look like Cargo's: a right-aligned coloured verb, then the message.
//! Everything goes to stderr; stdout only carries completions output.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::Severity;

const VERB_WIDTH: usize = 12;

/// Colour of a verb or fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Green,
    Cyan,
    Yellow,
    Red,
    Dim,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Green => "\x1b[1;32m",
            Tone::Cyan => "\x1b[1;36m",
            Tone::Yellow => "\x1b[1;33m",
            Tone::Red => "\x1b[1;31m",
            Tone::Dim => "\x1b[2m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Terminal-aware status printer. Colour is on when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Progress, e.g. `     Packing rock (3 maps)`.
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Cyan, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Yellow, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Red, verb, message);
    }

    /// Greyed-out text for help lines.
    pub fn dim(&self, text: &str) -> String {
        self.paint(Tone::Dim, text)
    }

    /// Highlight a subject (set name, path).
    pub fn subject(&self, text: &str) -> String {
        self.paint(Tone::Cyan, text)
    }

    /// The severity word of a diagnostic, coloured by severity.
    pub fn severity(&self, severity: Severity) -> String {
        let tone = match severity {
            Severity::Info => Tone::Dim,
            Severity::Warning => Tone::Yellow,
            Severity::Error => Tone::Red,
        };
        self.paint(tone, &severity.to_string())
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if self.color {
            format!("{}{}{}", tone.code(), text, RESET)
        } else {
            text.to_string()
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = self.paint(tone, &format!("{:>width$}", verb, width = VERB_WIDTH));
        // write errors on stderr are ignored
        let _ = writeln!(io::stderr().lock(), "{} {}", verb, message);
    }
}

/// `plural(1, "texture", "textures")` gives "1 texture".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { pluralized })
}

/// Path relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "texture", "textures"), "1 texture");
        assert_eq!(plural(0, "curve", "curves"), "0 curves");
        assert_eq!(plural(3, "set", "sets"), "3 sets");
    }

    #[test]
    fn test_plain_printer_has_no_escapes() {
        let printer = Printer::plain();
        assert_eq!(printer.subject("rock_ARM"), "rock_ARM");
        assert_eq!(printer.severity(Severity::Error), "error");
        assert_eq!(printer.severity(Severity::Info), "info");
    }

    #[test]
    fn test_coloured_severity() {
        let printer = Printer { color: true };
        assert_eq!(printer.severity(Severity::Warning), "\x1b[1;33mwarning\x1b[0m");
    }

    #[test]
    fn test_display_path_absolute() {
        let p = Path::new("/nonexistent/textures/rock_ao.png");
        assert_eq!(display_path(p), "/nonexistent/textures/rock_ao.png");
    }

    #[test]
    fn test_display_path_inside_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(display_path(&cwd.join("rock_ao.png")), "rock_ao.png");
        assert_eq!(display_path(&cwd), ".");
    }
}
