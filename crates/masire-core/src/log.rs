//! The monitor's log panel.
//!
//! An append-only list of severity-tagged messages shown to the operator.
//! Entries are bounded by a capacity (oldest dropped first) and every
//! entry is also emitted through `tracing`, so a headless monitor still
//! leaves a trail on stderr.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity tag of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Routine progress.
    Normal,
    /// A failed fetch or an entity that could not be drawn.
    Error,
    /// A failure the operator must act on.
    Critical,
}

impl Severity {
    /// The tag printed in front of the message.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Entry severity.
    pub severity: Severity,
    /// The message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} ] ## {}", self.severity.tag(), self.message)
    }
}

/// Bounded, toggleable list of log entries.
#[derive(Debug, Clone, Serialize)]
pub struct LogPanel {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    visible: bool,
}

impl LogPanel {
    /// An empty panel keeping at most `capacity` entries.
    pub fn new(capacity: usize, visible: bool) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
            visible,
        }
    }

    /// Append a routine message.
    pub fn normal(&mut self, message: impl Into<String>) {
        self.push(Severity::Normal, message);
    }

    /// Append an error message.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Append a message, dropping the oldest entry when full.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Normal => tracing::info!(target: "masire::log", "{message}"),
            Severity::Error => tracing::warn!(target: "masire::log", "{message}"),
            Severity::Critical => tracing::error!(target: "masire::log", "{message}"),
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Utc::now(),
            severity,
            message,
        });
    }

    /// Flip visibility and record the change.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        if self.visible {
            self.normal("Showing Log.");
        } else {
            self.normal("Hiding Log.");
        }
        self.visible
    }

    /// Whether the panel is shown.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Entries, oldest first.
    pub const fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retained entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// The panel text, one formatted entry per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_format() {
        let mut log = LogPanel::new(10, true);
        log.error("Match not found.");
        assert_eq!(
            log.last().map(ToString::to_string).as_deref(),
            Some("[ ERROR ] ## Match not found.")
        );
    }

    #[test]
    fn oldest_entries_are_dropped() {
        let mut log = LogPanel::new(2, true);
        log.normal("one");
        log.normal("two");
        log.push(Severity::Critical, "three");
        assert_eq!(log.len(), 2);
        assert_eq!(log.render(), "[ NORMAL ] ## two\n[ CRITICAL ] ## three");
    }

    #[test]
    fn toggle_flips_and_logs() {
        let mut log = LogPanel::new(10, true);
        assert!(!log.toggle());
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("Hiding Log."));
        assert!(log.toggle());
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("Showing Log."));
        assert!(log.is_visible());
    }

    #[test]
    fn count_by_severity() {
        let mut log = LogPanel::new(10, false);
        log.normal("a");
        log.error("b");
        log.error("c");
        assert_eq!(log.count(Severity::Error), 2);
        assert_eq!(log.count(Severity::Critical), 0);
        assert!(!log.is_empty());
    }
}
