//! Document header and line records as returned by the data-fetch service.
//!
//! Invoices and quotes share one header shape; the kind-specific number
//! columns are folded into `number` at decode time.

use serde::{Deserialize, Serialize};

use crate::utils::de::f64_or_zero;

/// Header record of an invoice or quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub id: String,
    /// Final document number.
    #[serde(default, alias = "invoice_number", alias = "quote_number")]
    pub number: Option<String>,
    /// Draft number assigned before the document is issued.
    #[serde(default)]
    pub preliminary_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    /// Payment due date (invoices).
    #[serde(default)]
    pub due_date: Option<String>,
    /// Offer validity date (quotes).
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub tax_amount: f64,
    /// IRPF or other withholding deducted from the total.
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub retention_amount: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub total: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DocumentHeader {
    /// Number to print: the final number if issued, else the draft number.
    pub fn display_number(&self) -> Option<&str> {
        self.number
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.preliminary_number
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
    }
}

/// A single line of an invoice or quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub concept: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub discount_percent: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub tax_rate: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub tax_amount: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub total: f64,
    /// Position on screen. Lines without one sort after ordered lines.
    #[serde(default)]
    pub line_order: Option<i32>,
}

/// Sort lines by `line_order` ascending, keeping return order for ties.
pub fn sort_lines(lines: &mut [LineItem]) {
    // sort_by_key is stable
    lines.sort_by_key(|line| line.line_order.unwrap_or(i32::MAX));
}
