//! Units of archival work and their discovery shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of business document that can be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Sales invoice.
    Invoice,
    /// Quote (presupuesto).
    Quote,
}

impl DocumentKind {
    /// Storage `source_type` tag understood by the archive service.
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::Invoice => "ventas",
            Self::Quote => "presupuestos",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Quote => "quote",
        }
    }

    /// Title printed at the top of the rendered document.
    pub fn document_title(&self) -> &'static str {
        match self {
            Self::Invoice => "FACTURA",
            Self::Quote => "PRESUPUESTO",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "invoice" | "invoices" | "factura" | "ventas" => Ok(Self::Invoice),
            "quote" | "quotes" | "presupuesto" | "presupuestos" => Ok(Self::Quote),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

/// One unit of work for the archiver.
///
/// Produced by discovery and immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivableDocument {
    pub id: String,
    pub kind: DocumentKind,
    /// Number shown to the operator (final number, or the preliminary one for drafts).
    pub display_number: String,
}

impl ArchivableDocument {
    pub fn new(id: impl Into<String>, kind: DocumentKind, display_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            display_number: display_number.into(),
        }
    }
}

/// Row returned by the "invoices pending archival" procedure.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingInvoiceRow {
    pub id: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub preliminary_number: Option<String>,
}

impl From<PendingInvoiceRow> for ArchivableDocument {
    fn from(row: PendingInvoiceRow) -> Self {
        let display_number = non_empty(row.invoice_number)
            .or_else(|| non_empty(row.preliminary_number))
            .unwrap_or_else(|| row.id.clone());
        Self::new(row.id, DocumentKind::Invoice, display_number)
    }
}

/// Row returned by the "quotes pending archival" procedure.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuoteRow {
    pub id: String,
    #[serde(default)]
    pub quote_number: Option<String>,
}

impl From<PendingQuoteRow> for ArchivableDocument {
    fn from(row: PendingQuoteRow) -> Self {
        let display_number = non_empty(row.quote_number).unwrap_or_else(|| row.id.clone());
        Self::new(row.id, DocumentKind::Quote, display_number)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_prefers_final_number() {
        let row = PendingInvoiceRow {
            id: "a1".into(),
            invoice_number: Some("F-2024-0012".into()),
            preliminary_number: Some("BORR-7".into()),
        };
        let doc = ArchivableDocument::from(row);
        assert_eq!(doc.display_number, "F-2024-0012");
        assert_eq!(doc.kind, DocumentKind::Invoice);
    }

    #[test]
    fn invoice_falls_back_to_preliminary_then_id() {
        let row = PendingInvoiceRow {
            id: "a1".into(),
            invoice_number: Some("  ".into()),
            preliminary_number: Some("BORR-7".into()),
        };
        assert_eq!(ArchivableDocument::from(row).display_number, "BORR-7");

        let row = PendingInvoiceRow {
            id: "a2".into(),
            invoice_number: None,
            preliminary_number: None,
        };
        assert_eq!(ArchivableDocument::from(row).display_number, "a2");
    }

    #[test]
    fn kind_source_types() {
        assert_eq!(DocumentKind::Invoice.source_type(), "ventas");
        assert_eq!(DocumentKind::Quote.source_type(), "presupuestos");
        assert_eq!("presupuesto".parse::<DocumentKind>(), Ok(DocumentKind::Quote));
        assert!("albaran".parse::<DocumentKind>().is_err());
    }
}
