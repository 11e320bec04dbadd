//! Domain models for the archiver.

mod document;
mod party;
mod record;
mod render_model;

pub use document::{ArchivableDocument, DocumentKind, PendingInvoiceRow, PendingQuoteRow};
pub use party::{BankAccount, ClientRecord, CompanyPreferences, CompanySettings, ProjectRecord};
pub use record::{sort_lines, DocumentHeader, LineItem};
pub use render_model::{DocumentRenderModel, TaxBreakdown};
