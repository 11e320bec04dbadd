//! Batch archiver: discovers pending documents and drives each one through
//! fetch, render and upload, one at a time.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use super::assemble::assemble_render_model;
use super::event::{ArchiveEvent, Recorder};
use super::state::{LogLevel, RunPhase, RunReport};
use super::{ArchiveError, ItemFailure};
use crate::config::Settings;
use crate::models::{ArchivableDocument, DocumentKind};
use crate::render::DocumentRenderer;
use crate::rpc::{ArchiveStore, DocumentSource};
use crate::utils::format_size;

/// Tunables for a run.
#[derive(Debug, Clone)]
pub struct ArchiverOptions {
    /// Pause between documents. Zero disables throttling.
    pub item_delay: Duration,
    /// Rendered PDFs smaller than this are flagged with a warning.
    pub min_pdf_bytes: u64,
}

impl Default for ArchiverOptions {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_millis(500),
            min_pdf_bytes: 1000,
        }
    }
}

impl ArchiverOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            item_delay: settings.item_delay(),
            min_pdf_bytes: settings.min_pdf_bytes,
        }
    }
}

/// Result of a successfully archived document.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub key: String,
    /// Size reported by storage, or the rendered size if storage reported none.
    pub size_bytes: u64,
    /// Hex SHA-256 of the uploaded PDF.
    pub sha256: String,
}

/// The two discovered work queues.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub invoices: Vec<ArchivableDocument>,
    pub quotes: Vec<ArchivableDocument>,
}

impl Discovered {
    pub fn total(&self) -> usize {
        self.invoices.len() + self.quotes.len()
    }

    /// Drop repeated `(kind, id)` pairs, keeping the first occurrence.
    ///
    /// Returns the dropped entries in listed order.
    pub fn remove_duplicates(&mut self) -> Vec<ArchivableDocument> {
        let mut seen: HashSet<(DocumentKind, String)> = HashSet::new();
        let mut dropped = Vec::new();
        for queue in [&mut self.invoices, &mut self.quotes] {
            queue.retain(|doc| {
                if seen.insert((doc.kind, doc.id.clone())) {
                    true
                } else {
                    dropped.push(doc.clone());
                    false
                }
            });
        }
        dropped
    }

    /// Invoices first, then quotes, each in listed order.
    pub fn into_queue(self) -> Vec<ArchivableDocument> {
        let mut queue = self.invoices;
        queue.extend(self.quotes);
        queue
    }
}

/// Clears the running flag when a run ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ArchiveError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ArchiveError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Regenerates and uploads PDFs for documents that lack an archived copy.
pub struct BatchArchiver {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn ArchiveStore>,
    renderer: Arc<dyn DocumentRenderer>,
    options: ArchiverOptions,
    running: AtomicBool,
}

impl BatchArchiver {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn ArchiveStore>,
        renderer: Arc<dyn DocumentRenderer>,
        options: ArchiverOptions,
    ) -> Self {
        Self {
            source,
            store,
            renderer,
            options,
            running: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ArchiverOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// List pending invoices, then pending quotes.
    ///
    /// Stops at the first failing call: quotes are not listed when listing
    /// invoices fails.
    pub async fn discover(&self) -> Result<Discovered, ArchiveError> {
        let invoices = self
            .source
            .list_pending_invoices()
            .await
            .map_err(|source| ArchiveError::Discovery {
                queue: "invoices",
                source,
            })?;
        let quotes = self
            .source
            .list_pending_quotes()
            .await
            .map_err(|source| ArchiveError::Discovery {
                queue: "quotes",
                source,
            })?;
        Ok(Discovered { invoices, quotes })
    }

    /// Run one backfill.
    ///
    /// Per-document failures are logged and counted; only discovery failures
    /// (and a concurrent run) return an error.
    pub async fn run(
        &self,
        event_tx: mpsc::Sender<ArchiveEvent>,
    ) -> Result<RunReport, ArchiveError> {
        let _guard = RunningGuard::acquire(&self.running)?;
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("archive_run", run_id = %run_id);
        self.run_inner(run_id, event_tx).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: String,
        event_tx: mpsc::Sender<ArchiveEvent>,
    ) -> Result<RunReport, ArchiveError> {
        let started_at = Utc::now();
        let mut rec = Recorder::new(event_tx);

        rec.phase(RunPhase::Discovering).await;
        rec.log(LogLevel::Info, "Looking for documents without an archived PDF")
            .await;

        let mut discovered = match self.discover().await {
            Ok(d) => d,
            Err(e) => {
                rec.log(LogLevel::Error, e.to_string()).await;
                rec.phase(RunPhase::Idle).await;
                return Err(e);
            }
        };

        for dup in discovered.remove_duplicates() {
            rec.log_for(
                LogLevel::Warn,
                &dup.display_number,
                format!(
                    "{} {} listed more than once; processing it once",
                    dup.kind, dup.display_number
                ),
            )
            .await;
        }

        let total = discovered.total();
        rec.state.total_count = total;

        if total == 0 {
            rec.phase(RunPhase::Empty).await;
            rec.log(
                LogLevel::Success,
                "Nothing to archive: every invoice and quote already has a PDF",
            )
            .await;
            rec.progress().await;
            rec.phase(RunPhase::Idle).await;
            return Ok(Self::report(run_id, started_at, rec));
        }

        rec.log(
            LogLevel::Info,
            format!(
                "Found {} invoices and {} quotes to archive",
                discovered.invoices.len(),
                discovered.quotes.len()
            ),
        )
        .await;
        rec.progress().await;

        let queue = discovered.into_queue();
        for (index, doc) in queue.iter().enumerate() {
            rec.phase(RunPhase::Processing { index, total }).await;
            rec.log_for(
                LogLevel::Info,
                &doc.display_number,
                format!(
                    "[{}/{}] Processing {} {}",
                    index + 1,
                    total,
                    doc.kind,
                    doc.display_number
                ),
            )
            .await;

            match self.attempt(doc, &mut rec).await {
                Ok(outcome) => {
                    rec.log_for(
                        LogLevel::Success,
                        &doc.display_number,
                        format!(
                            "{} archived as {} ({}, sha256 {})",
                            doc.display_number,
                            outcome.key,
                            format_size(outcome.size_bytes),
                            outcome.sha256
                        ),
                    )
                    .await;
                    rec.state.record_success(doc.kind);
                }
                Err(failure) => {
                    rec.log_for(
                        LogLevel::Error,
                        &doc.display_number,
                        format!("{}: {}", doc.display_number, failure),
                    )
                    .await;
                    rec.state.record_error();
                }
            }
            rec.progress().await;

            if index + 1 < total && !self.options.item_delay.is_zero() {
                tokio::time::sleep(self.options.item_delay).await;
            }
        }

        rec.phase(RunPhase::Summarizing).await;
        let state = rec.state.clone();
        rec.log(
            LogLevel::Info,
            format!(
                "Backfill finished: {} invoices and {} quotes archived, {} errors",
                state.invoices_ok, state.quotes_ok, state.error_count
            ),
        )
        .await;
        rec.phase(RunPhase::Idle).await;

        Ok(Self::report(run_id, started_at, rec))
    }

    /// Fetch, render and upload one document.
    async fn attempt(
        &self,
        doc: &ArchivableDocument,
        rec: &mut Recorder,
    ) -> Result<ItemOutcome, ItemFailure> {
        let model = assemble_render_model(self.source.as_ref(), doc).await?;
        debug!(
            document = %doc.display_number,
            kind = %doc.kind,
            lines = model.lines.len(),
            "Render model assembled"
        );

        let renderer = Arc::clone(&self.renderer);
        let pdf = tokio::task::spawn_blocking(move || renderer.render(&model))
            .await
            .map_err(|e| ItemFailure::Task(e.to_string()))??;

        let rendered_bytes = pdf.len();
        if (rendered_bytes as u64) < self.options.min_pdf_bytes {
            rec.log_for(
                LogLevel::Warn,
                &doc.display_number,
                format!(
                    "{}: rendered PDF is only {} bytes",
                    doc.display_number, rendered_bytes
                ),
            )
            .await;
        }

        let sha256 = hex::encode(Sha256::digest(&pdf));
        let payload = base64::engine::general_purpose::STANDARD.encode(&pdf);
        debug!(
            document = %doc.display_number,
            bytes = rendered_bytes,
            sha256 = %sha256,
            "Uploading rendered PDF"
        );

        let archived = self
            .store
            .archive_document(doc.kind, &doc.id, &payload)
            .await
            .map_err(ItemFailure::Upload)?;

        Ok(ItemOutcome {
            key: archived.key,
            size_bytes: if archived.size_bytes > 0 {
                archived.size_bytes
            } else {
                rendered_bytes as u64
            },
            sha256,
        })
    }

    fn report(run_id: String, started_at: chrono::DateTime<Utc>, rec: Recorder) -> RunReport {
        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            state: rec.state,
            log: rec.log,
        }
    }
}

