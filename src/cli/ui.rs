//! Terminal output helpers shared by the commands
//!
//! Results go to stdout; status lines go to stderr so `--json` output stays
//! pipeable.

use std::io::IsTerminal;

/// ANSI color codes for terminal styling
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
}

/// Check if colors should be enabled
pub fn colors_enabled() -> bool {
    // Respect NO_COLOR and TERM conventions
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
        return false;
    }
    std::io::stderr().is_terminal()
}

/// Get terminal width, defaulting to 80
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// First `max_chars` characters of `text`, and whether anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Horizontal rule no wider than the terminal
pub fn rule(ch: char, len: usize) -> String {
    ch.to_string().repeat(len.min(terminal_width()))
}

/// Status line printer with consistent formatting
/// Inspired by cargo's output style: `     Cleared 12 entries`
pub struct StatusPrinter {
    use_colors: bool,
}

impl StatusPrinter {
    pub fn new() -> Self {
        Self {
            use_colors: colors_enabled(),
        }
    }

    fn styled(&self, color: &str, bold: bool, text: &str) -> String {
        if self.use_colors {
            let bold_code = if bold { colors::BOLD } else { "" };
            format!("{}{}{}{}", bold_code, color, text, colors::RESET)
        } else {
            text.to_string()
        }
    }

    /// Print an info line: `      Info  some information`
    pub fn info(&self, keyword: &str, message: &str) {
        let keyword_styled = self.styled(colors::BRIGHT_CYAN, true, &format!("{:>12}", keyword));
        eprintln!("{} {}", keyword_styled, message);
    }

    /// Print a warning line
    pub fn warning(&self, keyword: &str, message: &str) {
        let keyword_styled = self.styled(colors::BRIGHT_YELLOW, true, &format!("{:>12}", keyword));
        eprintln!("{} {}", keyword_styled, message);
    }

    /// Print a success line
    pub fn success(&self, keyword: &str, message: &str) {
        let keyword_styled = self.styled(colors::GREEN, true, &format!("{:>12}", keyword));
        eprintln!("{} {}", keyword_styled, message);
    }
}

impl Default for StatusPrinter {
    fn default() -> Self {
        Self::new()
    }
}
