//! PDF serialization of laid-out pages using lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::layout::{layout_document, Align, FontStyle, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::{DocumentRenderer, RenderError};
use crate::models::DocumentRenderModel;

/// Renders documents with the standard Helvetica fonts.
#[derive(Debug, Clone, Default)]
pub struct LopdfRenderer {
    /// Skip stream compression. Useful when inspecting output by hand.
    pub uncompressed: bool,
}

impl LopdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render and also return the number of pages written.
    pub fn render_counting_pages(
        &self,
        model: &DocumentRenderModel,
    ) -> Result<(Vec<u8>, usize), RenderError> {
        let pages = layout_document(model);
        let title = format!(
            "{} {}",
            model.kind.document_title(),
            model.header.display_number().unwrap_or(&model.header.id)
        );
        let bytes = write_pdf(&pages, &title, !self.uncompressed)?;
        Ok((bytes, pages.len()))
    }
}

impl DocumentRenderer for LopdfRenderer {
    fn render(&self, model: &DocumentRenderModel) -> Result<Vec<u8>, RenderError> {
        self.render_counting_pages(model).map(|(bytes, _)| bytes)
    }
}

fn write_pdf(pages: &[Page], title: &str, compress: bool) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font_dict("Helvetica"));
    let bold = doc.add_object(font_dict("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page);
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id: ObjectId = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("nexo ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if compress {
        doc.compress();
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(buf)
}

fn font_dict(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_content(page: &Page) -> Content {
    let mut operations = Vec::new();

    if !page.rules.is_empty() {
        operations.push(Operation::new("w", vec![Object::Real(0.5)]));
        for rule in &page.rules {
            operations.push(Operation::new("m", vec![rule.x1.into(), rule.y1.into()]));
            operations.push(Operation::new("l", vec![rule.x2.into(), rule.y2.into()]));
        }
        operations.push(Operation::new("S", vec![]));
    }

    for item in &page.texts {
        let font = match item.style {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        };
        let x = match item.align {
            Align::Left => item.x,
            Align::Right => item.x - approx_text_width(&item.text, item.size, item.style),
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(item.size)],
        ));
        operations.push(Operation::new("Td", vec![x.into(), item.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&item.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

/// Rough Helvetica advance width in points.
fn approx_text_width(text: &str, size: i64, style: FontStyle) -> i64 {
    // average glyph width in thousandths of an em
    let per_mille: i64 = match style {
        FontStyle::Regular => 520,
        FontStyle::Bold => 560,
    };
    text.chars().count() as i64 * size * per_mille / 1000
}

/// Encode text for a WinAnsiEncoding font. Unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
