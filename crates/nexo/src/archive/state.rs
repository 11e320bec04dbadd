//! Run progress, log entries and the final run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DocumentKind;

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Whether this level closes out a document.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the operator-facing run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Display number of the document this entry is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            document_number: None,
        }
    }

    pub fn for_document(mut self, number: impl Into<String>) -> Self {
        self.document_number = Some(number.into());
        self
    }
}

/// Aggregate progress counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub processed_count: usize,
    pub total_count: usize,
    pub invoices_ok: usize,
    pub quotes_ok: usize,
    pub error_count: usize,
}

impl RunState {
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            ..Default::default()
        }
    }

    pub(crate) fn record_success(&mut self, kind: DocumentKind) {
        match kind {
            DocumentKind::Invoice => self.invoices_ok += 1,
            DocumentKind::Quote => self.quotes_ok += 1,
        }
        self.processed_count += 1;
    }

    pub(crate) fn record_error(&mut self) {
        self.error_count += 1;
        self.processed_count += 1;
    }

    pub fn succeeded(&self) -> usize {
        self.invoices_ok + self.quotes_ok
    }

    /// Completion percentage, 0-100. An empty run is complete.
    pub fn percent(&self) -> u8 {
        if self.total_count == 0 {
            return 100;
        }
        let pct = self.processed_count.min(self.total_count) * 100 / self.total_count;
        pct as u8
    }

    pub fn is_complete(&self) -> bool {
        self.processed_count >= self.total_count
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Discovering,
    /// Discovery found nothing to archive.
    Empty,
    /// Working on the item at `index` (0-based) out of `total`.
    Processing { index: usize, total: usize },
    Summarizing,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub log: Vec<LogEntry>,
}

impl RunReport {
    /// Log entries about a given document, in order.
    pub fn entries_for<'a>(&'a self, number: &'a str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.log
            .iter()
            .filter(move |e| e.document_number.as_deref() == Some(number))
    }

    pub fn count_level(&self, level: LogLevel) -> usize {
        self.log.iter().filter(|e| e.level == level).count()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_tracks_processed() {
        let mut state = RunState::new(3);
        assert_eq!(state.percent(), 0);
        state.record_success(DocumentKind::Invoice);
        assert_eq!(state.percent(), 33);
        state.record_error();
        state.record_success(DocumentKind::Quote);
        assert_eq!(state.percent(), 100);
        assert!(state.is_complete());
        assert_eq!(state.succeeded(), 2);
        assert_eq!(state.error_count, 1);
    }

    #[test]
    fn empty_run_is_complete() {
        let state = RunState::new(0);
        assert_eq!(state.percent(), 100);
        assert!(state.is_complete());
    }

    #[test]
    fn log_entry_serializes_level_lowercase() {
        let entry = LogEntry::new(LogLevel::Warn, "small").for_document("F-1");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warn");
        assert_eq!(json["document_number"], "F-1");

        let plain = serde_json::to_value(LogEntry::new(LogLevel::Info, "x")).unwrap();
        assert!(plain.get("document_number").is_none());
    }

    #[test]
    fn phase_is_tagged() {
        let json = serde_json::to_value(RunPhase::Processing { index: 1, total: 4 }).unwrap();
        assert_eq!(json["phase"], "processing");
        assert_eq!(json["total"], 4);
    }
}
