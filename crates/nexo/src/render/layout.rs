//! Page composition for invoices and quotes.
//!
//! Coordinates are PDF points with the origin at the bottom-left of an A4 page.

use crate::models::{DocumentKind, DocumentRenderModel, LineItem};
use crate::utils::{format_date, format_money, format_percent};

pub const PAGE_WIDTH: i64 = 595;
pub const PAGE_HEIGHT: i64 = 842;

const LEFT: i64 = 50;
const RIGHT: i64 = PAGE_WIDTH - 50;
const TOP: i64 = 790;
/// First baseline on continuation pages.
const CONTINUATION_TOP: i64 = 800;
/// Content never goes below this; the page footer lives underneath.
const BOTTOM: i64 = 70;
const FOOTER_Y: i64 = 40;

const COL_QTY: i64 = 360;
const COL_PRICE: i64 = 420;
const COL_DISCOUNT: i64 = 460;
const COL_TAX: i64 = 495;
const COL_AMOUNT: i64 = RIGHT;

const CONCEPT_WRAP: usize = 55;
const DESCRIPTION_WRAP: usize = 75;
const NOTES_WRAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the right edge of the text.
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: i64,
    pub y: i64,
    pub size: i64,
    pub style: FontStyle,
    pub align: Align,
    pub text: String,
}

/// A horizontal or vertical stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub texts: Vec<TextItem>,
    pub rules: Vec<Rule>,
}

impl Page {
    /// Text of every item on the page, in drawing order.
    pub fn text_content(&self) -> Vec<&str> {
        self.texts.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Accumulates pages while tracking the current baseline.
struct PageWriter {
    pages: Vec<Page>,
    current: Page,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: TOP,
        }
    }

    fn text(&mut self, x: i64, size: i64, style: FontStyle, align: Align, text: impl Into<String>) {
        self.text_at(x, self.y, size, style, align, text);
    }

    fn text_at(
        &mut self,
        x: i64,
        y: i64,
        size: i64,
        style: FontStyle,
        align: Align,
        text: impl Into<String>,
    ) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.current.texts.push(TextItem {
            x,
            y,
            size,
            style,
            align,
            text,
        });
    }

    fn rule(&mut self, y: i64) {
        self.current.rules.push(Rule {
            x1: LEFT,
            y1: y,
            x2: RIGHT,
            y2: y,
        });
    }

    /// Start a new page if `height` does not fit. Returns whether a break happened.
    fn ensure_space(&mut self, height: i64) -> bool {
        if self.y - height >= BOTTOM {
            return false;
        }
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = CONTINUATION_TOP;
        true
    }

    fn finish(mut self, footer_label: &str) -> Vec<Page> {
        self.pages.push(self.current);
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.texts.push(TextItem {
                x: RIGHT,
                y: FOOTER_Y,
                size: 7,
                style: FontStyle::Regular,
                align: Align::Right,
                text: format!("{} · Página {} de {}", footer_label, i + 1, total),
            });
        }
        self.pages
    }
}

/// Compose all pages for a document.
pub fn layout_document(model: &DocumentRenderModel) -> Vec<Page> {
    let mut w = PageWriter::new();

    header_block(&mut w, model);
    parties_block(&mut w, model);
    line_table(&mut w, &model.lines);
    totals_block(&mut w, model);
    payment_block(&mut w, model);
    notes_block(&mut w, model);

    let label = format!(
        "{} {}",
        model.kind.document_title(),
        model.header.display_number().unwrap_or("")
    );
    w.finish(label.trim_end())
}

fn header_block(w: &mut PageWriter, model: &DocumentRenderModel) {
    use FontStyle::{Bold, Regular};

    let mut left_y = TOP;
    if let Some(ref company) = model.company {
        w.text_at(LEFT, left_y, 13, Bold, Align::Left, company.display_name());
        left_y -= 15;

        let mut lines: Vec<String> = Vec::new();
        if let (Some(legal), Some(_)) = (&company.legal_name, &company.commercial_name) {
            lines.push(legal.clone());
        }
        if let Some(ref tax_id) = company.tax_id {
            lines.push(format!("CIF {}", tax_id));
        }
        lines.extend(company.address.clone());
        lines.push(join_present(
            &[company.postal_code.as_deref(), company.city.as_deref()],
            " ",
        ));
        lines.extend(company.province.clone());
        lines.push(join_present(
            &[company.email.as_deref(), company.phone.as_deref()],
            " · ",
        ));
        lines.extend(company.website.clone());

        for line in lines.into_iter().filter(|l| !l.trim().is_empty()) {
            w.text_at(LEFT, left_y, 8, Regular, Align::Left, line);
            left_y -= 11;
        }
    }

    let header = &model.header;
    let mut right_y = TOP;
    w.text_at(RIGHT, right_y, 18, Bold, Align::Right, model.kind.document_title());
    right_y -= 20;

    let number = header.display_number().unwrap_or("-");
    let number_label = if header.number.as_deref().is_some_and(|n| !n.trim().is_empty()) {
        format!("Nº {}", number)
    } else {
        format!("Nº {} (borrador)", number)
    };
    w.text_at(RIGHT, right_y, 10, Bold, Align::Right, number_label);
    right_y -= 13;

    if let Some(ref date) = header.issue_date {
        w.text_at(RIGHT, right_y, 9, Regular, Align::Right, format!("Fecha: {}", format_date(date)));
        right_y -= 12;
    }
    let secondary = match model.kind {
        DocumentKind::Invoice => header
            .due_date
            .as_ref()
            .map(|d| format!("Vencimiento: {}", format_date(d))),
        DocumentKind::Quote => header
            .valid_until
            .as_ref()
            .map(|d| format!("Válido hasta: {}", format_date(d))),
    };
    if let Some(text) = secondary {
        w.text_at(RIGHT, right_y, 9, Regular, Align::Right, text);
        right_y -= 12;
    }

    w.y = left_y.min(right_y) - 18;
}

fn parties_block(w: &mut PageWriter, model: &DocumentRenderModel) {
    const PROJECT_X: i64 = 310;

    let mut client_lines: Vec<String> = Vec::new();
    if let Some(ref client) = model.client {
        client_lines.push(client.display_name().to_string());
        if let Some(ref tax_id) = client.tax_id {
            client_lines.push(format!("NIF/CIF: {}", tax_id));
        }
        client_lines.extend(client.address.clone());
        client_lines.push(join_present(
            &[client.postal_code.as_deref(), client.city.as_deref()],
            " ",
        ));
        client_lines.push(join_present(
            &[client.province.as_deref(), client.country.as_deref()],
            ", ",
        ));
        client_lines.extend(client.email.clone());
    }

    let mut project_lines: Vec<String> = Vec::new();
    if let Some(project) = model.project.as_ref().filter(|p| p.has_display_fields()) {
        project_lines.push(join_present(
            &[project.number.as_deref(), project.project_name.as_deref()],
            " · ",
        ));
        if let Some(ref local) = project.local_name {
            project_lines.push(format!("Local: {}", local));
        }
        if let Some(ref site) = project.site_name {
            project_lines.push(format!("Espacio: {}", site));
        }
        project_lines.push(join_present(
            &[project.address.as_deref(), project.city.as_deref()],
            ", ",
        ));
        if let Some(ref order) = project.client_order_number {
            project_lines.push(format!("Pedido cliente: {}", order));
        }
    } else if let Some(ref name) = model.header.project_name {
        project_lines.push(name.clone());
    }

    client_lines.retain(|l| !l.trim().is_empty());
    project_lines.retain(|l| !l.trim().is_empty());
    if client_lines.is_empty() && project_lines.is_empty() {
        return;
    }

    let top = w.y;
    let mut client_y = top;
    if !client_lines.is_empty() {
        w.text_at(LEFT, client_y, 9, FontStyle::Bold, Align::Left, "CLIENTE");
        client_y -= 13;
        for line in client_lines {
            w.text_at(LEFT, client_y, 9, FontStyle::Regular, Align::Left, line);
            client_y -= 12;
        }
    }

    let mut project_y = top;
    if !project_lines.is_empty() {
        w.text_at(PROJECT_X, project_y, 9, FontStyle::Bold, Align::Left, "PROYECTO");
        project_y -= 13;
        for line in project_lines {
            w.text_at(PROJECT_X, project_y, 9, FontStyle::Regular, Align::Left, line);
            project_y -= 12;
        }
    }

    w.y = client_y.min(project_y) - 14;
}

fn table_header(w: &mut PageWriter) {
    use FontStyle::Bold;
    w.text(LEFT, 8, Bold, Align::Left, "Concepto");
    w.text(COL_QTY, 8, Bold, Align::Right, "Cant.");
    w.text(COL_PRICE, 8, Bold, Align::Right, "Precio");
    w.text(COL_DISCOUNT, 8, Bold, Align::Right, "Dto.");
    w.text(COL_TAX, 8, Bold, Align::Right, "IVA");
    w.text(COL_AMOUNT, 8, Bold, Align::Right, "Importe");
    let rule_y = w.y - 4;
    w.rule(rule_y);
    w.y -= 16;
}

fn line_table(w: &mut PageWriter, lines: &[LineItem]) {
    table_header(w);

    for line in lines {
        let concept = wrap_text(&line.concept, CONCEPT_WRAP);
        let description = line
            .description
            .as_deref()
            .map(|d| wrap_text(d, DESCRIPTION_WRAP))
            .unwrap_or_default();
        let height = 12 * concept.len().max(1) as i64 + 10 * description.len() as i64 + 2;

        if w.ensure_space(height) {
            table_header(w);
        }

        w.text(COL_QTY, 8, FontStyle::Regular, Align::Right, format_quantity(line.quantity));
        w.text(COL_PRICE, 8, FontStyle::Regular, Align::Right, format_money(line.unit_price));
        if line.discount_percent.abs() > f64::EPSILON {
            w.text(
                COL_DISCOUNT,
                8,
                FontStyle::Regular,
                Align::Right,
                format_percent(line.discount_percent),
            );
        }
        w.text(COL_TAX, 8, FontStyle::Regular, Align::Right, format_percent(line.tax_rate));
        w.text(COL_AMOUNT, 8, FontStyle::Regular, Align::Right, format_money(line.subtotal));

        for part in &concept {
            w.text(LEFT, 9, FontStyle::Regular, Align::Left, part.clone());
            w.y -= 12;
        }
        if concept.is_empty() {
            w.y -= 12;
        }
        for part in &description {
            w.text(LEFT + 8, 7, FontStyle::Regular, Align::Left, part.clone());
            w.y -= 10;
        }
        w.y -= 2;
    }

    let rule_y = w.y + 6;
    w.rule(rule_y);
    w.y -= 10;
}

fn totals_block(w: &mut PageWriter, model: &DocumentRenderModel) {
    const LABEL_X: i64 = 460;

    let header = &model.header;
    let breakdown = model.tax_breakdown();
    let has_retention = header.retention_amount.abs() > f64::EPSILON;
    let rows = 1 + breakdown.len() as i64 + i64::from(has_retention);
    w.ensure_space(rows * 13 + 24);

    w.text(LABEL_X, 9, FontStyle::Regular, Align::Right, "Base imponible");
    w.text(RIGHT, 9, FontStyle::Regular, Align::Right, format_money(header.subtotal));
    w.y -= 13;

    for group in &breakdown {
        w.text(
            LABEL_X,
            9,
            FontStyle::Regular,
            Align::Right,
            format!("IVA {}", format_percent(group.rate)),
        );
        w.text(RIGHT, 9, FontStyle::Regular, Align::Right, format_money(group.amount));
        w.y -= 13;
    }

    if has_retention {
        w.text(LABEL_X, 9, FontStyle::Regular, Align::Right, "Retención");
        w.text(
            RIGHT,
            9,
            FontStyle::Regular,
            Align::Right,
            format_money(-header.retention_amount.abs()),
        );
        w.y -= 13;
    }

    let rule_y = w.y + 8;
    w.current.rules.push(Rule {
        x1: LABEL_X - 80,
        y1: rule_y,
        x2: RIGHT,
        y2: rule_y,
    });
    w.y -= 4;
    w.text(LABEL_X, 11, FontStyle::Bold, Align::Right, "TOTAL");
    w.text(RIGHT, 11, FontStyle::Bold, Align::Right, format_money(header.total));
    w.y -= 24;
}

fn payment_block(w: &mut PageWriter, model: &DocumentRenderModel) {
    let accounts = model.preferences.printable_accounts();
    let method = model
        .header
        .payment_method
        .as_deref()
        .filter(|m| !m.trim().is_empty());
    if method.is_none() && accounts.is_empty() {
        return;
    }

    w.ensure_space(14 + 11 * (accounts.len() as i64 + 1));
    w.text(LEFT, 9, FontStyle::Bold, Align::Left, "Forma de pago");
    w.y -= 13;
    if let Some(method) = method {
        w.text(LEFT, 8, FontStyle::Regular, Align::Left, method);
        w.y -= 11;
    }
    for account in accounts {
        let line = join_present(
            &[
                Some(format!("IBAN {}", account.iban)).as_deref(),
                account.bic.as_deref().map(|b| format!("BIC {}", b)).as_deref(),
                account.bank_name.as_deref(),
            ],
            "  ",
        );
        w.text(LEFT, 8, FontStyle::Regular, Align::Left, line);
        w.y -= 11;
    }
    w.y -= 8;
}

fn notes_block(w: &mut PageWriter, model: &DocumentRenderModel) {
    if let Some(notes) = model.header.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let lines = wrap_text(notes, NOTES_WRAP);
        w.ensure_space(13 + 11 * lines.len().min(4) as i64);
        w.text(LEFT, 9, FontStyle::Bold, Align::Left, "Observaciones");
        w.y -= 13;
        for line in lines {
            w.ensure_space(11);
            w.text(LEFT, 8, FontStyle::Regular, Align::Left, line);
            w.y -= 11;
        }
        w.y -= 8;
    }

    if let Some(footer) = model.footer() {
        for line in wrap_text(footer, NOTES_WRAP + 15) {
            w.ensure_space(9);
            w.text(LEFT, 7, FontStyle::Regular, Align::Left, line);
            w.y -= 9;
        }
    }
}

/// Join the present, non-blank parts with `sep`.
fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Quantities print without decimals when whole.
fn format_quantity(quantity: f64) -> String {
    if (quantity - quantity.round()).abs() < 1e-9 {
        format!("{}", quantity.round() as i64)
    } else {
        format!("{:.2}", quantity).replace('.', ",")
    }
}

/// Greedy word wrap on character count. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }
            let word_len = word.len();
            if word_len == 0 {
                continue;
            }
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word);
            current_len += word_len;
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClientRecord, CompanyPreferences, CompanySettings, DocumentHeader, ProjectRecord,
    };

    fn model(lines: usize) -> DocumentRenderModel {
        DocumentRenderModel {
            kind: DocumentKind::Invoice,
            header: DocumentHeader {
                id: "inv-1".into(),
                number: Some("F-2025-0042".into()),
                issue_date: Some("2025-02-14".into()),
                due_date: Some("2025-03-16".into()),
                subtotal: 100.0 * lines as f64,
                tax_amount: 21.0 * lines as f64,
                total: 121.0 * lines as f64,
                ..Default::default()
            },
            lines: (0..lines)
                .map(|i| LineItem {
                    concept: format!("Concepto {}", i + 1),
                    quantity: 1.0,
                    unit_price: 100.0,
                    tax_rate: 21.0,
                    subtotal: 100.0,
                    tax_amount: 21.0,
                    total: 121.0,
                    line_order: Some(i as i32),
                    ..Default::default()
                })
                .collect(),
            client: Some(ClientRecord {
                id: "c1".into(),
                legal_name: Some("Eventos Norte SL".into()),
                tax_id: Some("B12345678".into()),
                ..Default::default()
            }),
            project: Some(ProjectRecord {
                id: "p1".into(),
                project_name: Some("Gala anual".into()),
                local_name: Some("Palacio Euskalduna".into()),
                client_order_number: Some("PO-889".into()),
                ..Default::default()
            }),
            company: Some(CompanySettings {
                legal_name: Some("Nexo Audiovisual SL".into()),
                commercial_name: Some("NEXO AV".into()),
                tax_id: Some("B87654321".into()),
                ..Default::default()
            }),
            preferences: CompanyPreferences::default(),
        }
    }

    fn all_text(pages: &[Page]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.texts.iter().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn single_page_contains_blocks() {
        let pages = layout_document(&model(3));
        assert_eq!(pages.len(), 1);

        let text = all_text(&pages);
        for expected in [
            "FACTURA",
            "Nº F-2025-0042",
            "Fecha: 14/02/2025",
            "Vencimiento: 16/03/2025",
            "NEXO AV",
            "Eventos Norte SL",
            "Local: Palacio Euskalduna",
            "Pedido cliente: PO-889",
            "IVA 21%",
            "363,00 €",
            "FACTURA F-2025-0042 · Página 1 de 1",
        ] {
            assert!(text.iter().any(|t| t == expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn lines_keep_model_order() {
        let pages = layout_document(&model(5));
        let concepts: Vec<String> = all_text(&pages)
            .into_iter()
            .filter(|t| t.starts_with("Concepto "))
            .collect();
        assert_eq!(
            concepts,
            vec!["Concepto 1", "Concepto 2", "Concepto 3", "Concepto 4", "Concepto 5"]
        );
    }

    #[test]
    fn long_tables_paginate_and_repeat_header() {
        let pages = layout_document(&model(120));
        assert!(pages.len() > 1);

        for page in &pages {
            for item in &page.texts {
                assert!(item.y >= FOOTER_Y, "text below footer: {:?}", item);
            }
        }
        for page in pages.iter().filter(|p| {
            p.text_content().iter().any(|t| t.starts_with("Concepto "))
        }) {
            assert!(page.text_content().contains(&"Concepto"));
        }

        let last = pages.len();
        let footer = format!("FACTURA F-2025-0042 · Página {} de {}", last, last);
        assert!(pages[last - 1].text_content().contains(&footer.as_str()));
    }

    #[test]
    fn draft_number_is_marked() {
        let mut m = model(1);
        m.header.number = None;
        m.header.preliminary_number = Some("BORR-12".into());
        let text = all_text(&layout_document(&m));
        assert!(text.iter().any(|t| t == "Nº BORR-12 (borrador)"));
    }

    #[test]
    fn quote_uses_validity_date() {
        let mut m = model(1);
        m.kind = DocumentKind::Quote;
        m.header.valid_until = Some("2025-04-01".into());
        let text = all_text(&layout_document(&m));
        assert!(text.iter().any(|t| t == "PRESUPUESTO"));
        assert!(text.iter().any(|t| t == "Válido hasta: 01/04/2025"));
        assert!(!text.iter().any(|t| t.starts_with("Vencimiento")));
    }

    #[test]
    fn missing_client_and_project_tolerated() {
        let mut m = model(1);
        m.client = None;
        m.project = None;
        let text = all_text(&layout_document(&m));
        assert!(!text.iter().any(|t| t == "CLIENTE"));
        assert!(!text.iter().any(|t| t == "PROYECTO"));
        assert!(text.iter().any(|t| t == "Concepto 1"));
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("montaje de pantalla led en escenario", 15),
            vec!["montaje de", "pantalla led en", "escenario"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn quantities() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2,50");
    }
}
