//! Live progress display for archive runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use nexo::archive::{ArchiveEvent, LogEntry, LogLevel, RunPhase};

use super::icons;

/// Turns archive events into a progress bar plus log lines.
pub struct ArchiveProgress {
    bar: Option<ProgressBar>,
    enabled: bool,
}

impl ArchiveProgress {
    /// A disabled display swallows every event.
    pub fn new(enabled: bool) -> Self {
        Self { bar: None, enabled }
    }

    pub fn handle(&mut self, event: ArchiveEvent) {
        if !self.enabled {
            return;
        }
        match event {
            ArchiveEvent::Phase(RunPhase::Discovering) => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap(),
                );
                spinner.set_message("Discovering pending documents...");
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.bar = Some(spinner);
            }
            ArchiveEvent::Progress(state) if state.total_count > 0 => {
                let bar = self.bar.get_or_insert_with(ProgressBar::hidden);
                if bar.length() != Some(state.total_count as u64) {
                    bar.set_style(
                        ProgressStyle::default_bar()
                            .template(
                                "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} ({percent}%) {wide_msg}",
                            )
                            .unwrap()
                            .progress_chars("█▓░"),
                    );
                    bar.set_length(state.total_count as u64);
                }
                bar.set_position(state.processed_count as u64);
            }
            ArchiveEvent::Progress(_) => {}
            ArchiveEvent::Log(entry) => {
                // per-document "processing" lines only update the bar message
                if entry.level == LogLevel::Info && entry.document_number.is_some() {
                    if let Some(ref bar) = self.bar {
                        bar.set_message(entry.message);
                        return;
                    }
                }
                self.println(&format_entry(&entry));
            }
            ArchiveEvent::Phase(RunPhase::Empty)
            | ArchiveEvent::Phase(RunPhase::Summarizing)
            | ArchiveEvent::Phase(RunPhase::Idle) => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
            ArchiveEvent::Phase(RunPhase::Processing { .. }) => {}
        }
    }

    fn println(&self, line: &str) {
        match self.bar {
            Some(ref bar) if !bar.is_hidden() => bar.println(line),
            _ => eprintln!("{}", line),
        }
    }

    pub fn finish(mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// One log line as printed to the terminal.
pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{} {} {}",
        console::style(entry.timestamp.format("%H:%M:%S")).dim(),
        icons::for_level(entry.level),
        entry.message
    )
}
