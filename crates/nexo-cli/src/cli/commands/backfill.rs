//! Backfill command: archive every pending invoice and quote.

use console::style;
use tokio::sync::mpsc;

use nexo::archive::{ArchiveEvent, RunReport};
use nexo::config::Settings;

use super::helpers::build_archiver;
use crate::cli::icons::{dim_arrow, error, success, warn};
use crate::cli::progress::ArchiveProgress;

pub async fn cmd_backfill(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let archiver = build_archiver(settings)?;

    if !json {
        println!(
            "{} Archiving pending documents from {}",
            style("→").cyan(),
            settings.api_url
        );
    }

    let (event_tx, mut event_rx) = mpsc::channel::<ArchiveEvent>(100);
    let event_handler = tokio::spawn(async move {
        let mut progress = ArchiveProgress::new(!json);
        while let Some(event) = event_rx.recv().await {
            progress.handle(event);
        }
        progress.finish();
    });

    let result = archiver.run(event_tx).await;
    let _ = event_handler.await;
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let state = &report.state;

    if state.total_count == 0 {
        println!("{} Nothing to archive", success());
        return;
    }

    println!(
        "{} Backfill complete: {} invoices and {} quotes archived",
        if state.error_count == 0 {
            success()
        } else {
            warn()
        },
        state.invoices_ok,
        state.quotes_ok
    );
    if state.error_count > 0 {
        println!(
            "  {} {} documents failed; fix the data and run backfill again",
            error(),
            state.error_count
        );
    }
    println!(
        "  {} Run {} processed {}/{} in {:.1}s",
        dim_arrow(),
        &report.run_id[..8.min(report.run_id.len())],
        state.processed_count,
        state.total_count,
        report.duration().num_milliseconds() as f64 / 1000.0
    );
}
