//! Progress events and the run-owned log/state recorder.

use tokio::sync::mpsc;

use super::state::{LogEntry, LogLevel, RunPhase, RunState};

/// Events emitted while a run progresses.
///
/// Consumers receive every log entry and a state snapshot after each
/// document. Dropping the receiver does not affect the run.
#[derive(Debug, Clone)]
pub enum ArchiveEvent {
    Phase(RunPhase),
    Log(LogEntry),
    Progress(RunState),
}

/// Owns the run's log and counters and mirrors every change to the event channel.
pub(crate) struct Recorder {
    tx: mpsc::Sender<ArchiveEvent>,
    pub(crate) state: RunState,
    pub(crate) log: Vec<LogEntry>,
}

impl Recorder {
    pub(crate) fn new(tx: mpsc::Sender<ArchiveEvent>) -> Self {
        Self {
            tx,
            state: RunState::default(),
            log: Vec::new(),
        }
    }

    pub(crate) async fn phase(&self, phase: RunPhase) {
        let _ = self.tx.send(ArchiveEvent::Phase(phase)).await;
    }

    pub(crate) async fn progress(&self) {
        let _ = self.tx.send(ArchiveEvent::Progress(self.state.clone())).await;
    }

    pub(crate) async fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(LogEntry::new(level, message)).await;
    }

    pub(crate) async fn log_for(
        &mut self,
        level: LogLevel,
        number: &str,
        message: impl Into<String>,
    ) {
        self.push(LogEntry::new(level, message).for_document(number))
            .await;
    }

    async fn push(&mut self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", entry.message),
            LogLevel::Warn => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }
        self.log.push(entry.clone());
        let _ = self.tx.send(ArchiveEvent::Log(entry)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mirrors_log_to_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut recorder = Recorder::new(tx);

        recorder.log(LogLevel::Info, "starting").await;
        recorder.log_for(LogLevel::Error, "F-9", "F-9: boom").await;
        recorder.progress().await;

        assert_eq!(recorder.log.len(), 2);
        assert!(matches!(rx.recv().await, Some(ArchiveEvent::Log(e)) if e.message == "starting"));
        match rx.recv().await {
            Some(ArchiveEvent::Log(e)) => {
                assert_eq!(e.level, LogLevel::Error);
                assert_eq!(e.document_number.as_deref(), Some("F-9"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.recv().await, Some(ArchiveEvent::Progress(_))));
    }

    #[tokio::test]
    async fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut recorder = Recorder::new(tx);
        recorder.log(LogLevel::Success, "done").await;
        assert_eq!(recorder.log.len(), 1);
    }
}
