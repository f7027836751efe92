// dbrestore/src/utils/console.rs
use colored::{ColoredString, Colorize};

/// Semantic category of a status line; each maps to one terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Info,
    Data,
    Success,
    Failure,
}

/// Sink for the human-readable status lines of a command.
pub trait Console {
    fn line(&mut self, text: &str, style: Style);
}

/// Writes colored lines to stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn line(&mut self, text: &str, style: Style) {
        println!("{}", paint(text, style));
    }
}

pub fn paint(text: &str, style: Style) -> ColoredString {
    match style {
        Style::Info => text.white(),
        // "brown" on ANSI terminals is the dim yellow slot
        Style::Data => text.yellow(),
        Style::Success => text.green(),
        Style::Failure => text.red(),
    }
}

/// Keeps every line in memory, for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub lines: Vec<(Style, String)>,
}

#[cfg(test)]
impl RecordingConsole {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|(_, text)| text.as_str()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, text)| text.contains(needle))
    }
}

#[cfg(test)]
impl Console for RecordingConsole {
    fn line(&mut self, text: &str, style: Style) {
        self.lines.push((style, text.to_string()));
    }
}
