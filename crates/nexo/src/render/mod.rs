//! Document rendering.
//!
//! `layout` turns a render model into positioned text and rules per page;
//! `pdf` serializes that layout with lopdf. Keeping layout separate lets the
//! page composition be tested without parsing PDF output.

pub mod layout;
mod pdf;

pub use pdf::LopdfRenderer;

use thiserror::Error;

use crate::models::DocumentRenderModel;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Produces the PDF bytes for a document.
///
/// Rendering is CPU-bound; the archiver runs it on the blocking pool.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, model: &DocumentRenderModel) -> Result<Vec<u8>, RenderError>;
}
