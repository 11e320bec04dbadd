//! List documents waiting for archival.

use console::style;

use nexo::config::Settings;
use nexo::models::ArchivableDocument;

use super::helpers::build_archiver;
use crate::cli::icons::{info, success, warn};

pub async fn cmd_pending(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let archiver = build_archiver(settings)?;
    let mut discovered = archiver.discover().await?;
    let duplicates = discovered.remove_duplicates();

    if json {
        let value = serde_json::json!({
            "invoices": discovered.invoices,
            "quotes": discovered.quotes,
            "total": discovered.total(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if discovered.total() == 0 {
        println!("{} Every invoice and quote is archived", success());
        return Ok(());
    }

    print_queue("Invoices", &discovered.invoices);
    print_queue("Quotes", &discovered.quotes);
    if !duplicates.is_empty() {
        println!(
            "{} {} duplicate listings ignored",
            warn(),
            style(duplicates.len()).yellow()
        );
    }
    println!(
        "{} {} documents pending",
        info(),
        style(discovered.total()).bold()
    );
    Ok(())
}

fn print_queue(title: &str, docs: &[ArchivableDocument]) {
    if docs.is_empty() {
        return;
    }
    println!("{} ({})", style(title).bold(), docs.len());
    for doc in docs {
        println!("  {:<20} {}", doc.display_number, style(&doc.id).dim());
    }
}
