//! Everything needed to reproduce the on-screen preview of a document.

use serde::{Deserialize, Serialize};

use super::{
    ClientRecord, CompanyPreferences, CompanySettings, DocumentHeader, DocumentKind, LineItem,
    ProjectRecord,
};

/// Tax totals for one rate, as printed under the line table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxBreakdown {
    pub rate: f64,
    pub base: f64,
    pub amount: f64,
}

/// Render input assembled fresh for every document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRenderModel {
    pub kind: DocumentKind,
    pub header: DocumentHeader,
    /// Lines already sorted by `line_order`.
    pub lines: Vec<LineItem>,
    pub client: Option<ClientRecord>,
    pub project: Option<ProjectRecord>,
    pub company: Option<CompanySettings>,
    pub preferences: CompanyPreferences,
}

impl DocumentRenderModel {
    /// Group line bases and tax amounts by tax rate, in first-seen order.
    pub fn tax_breakdown(&self) -> Vec<TaxBreakdown> {
        let mut groups: Vec<TaxBreakdown> = Vec::new();
        for line in &self.lines {
            match groups
                .iter_mut()
                .find(|g| (g.rate - line.tax_rate).abs() < 1e-9)
            {
                Some(group) => {
                    group.base += line.subtotal;
                    group.amount += line.tax_amount;
                }
                None => groups.push(TaxBreakdown {
                    rate: line.tax_rate,
                    base: line.subtotal,
                    amount: line.tax_amount,
                }),
            }
        }
        groups
    }

    /// Footer text configured for this kind of document.
    pub fn footer(&self) -> Option<&str> {
        match self.kind {
            DocumentKind::Invoice => self.preferences.invoice_footer.as_deref(),
            DocumentKind::Quote => self.preferences.quote_conditions.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(rate: f64, subtotal: f64, tax: f64) -> LineItem {
        LineItem {
            tax_rate: rate,
            subtotal,
            tax_amount: tax,
            ..Default::default()
        }
    }

    #[test]
    fn breakdown_groups_by_rate() {
        let model = DocumentRenderModel {
            kind: DocumentKind::Invoice,
            header: DocumentHeader::default(),
            lines: vec![line(21.0, 100.0, 21.0), line(10.0, 50.0, 5.0), line(21.0, 200.0, 42.0)],
            client: None,
            project: None,
            company: None,
            preferences: CompanyPreferences::default(),
        };
        let groups = model.tax_breakdown();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rate, 21.0);
        assert_eq!(groups[0].base, 300.0);
        assert_eq!(groups[0].amount, 63.0);
        assert_eq!(groups[1].rate, 10.0);
    }
}
