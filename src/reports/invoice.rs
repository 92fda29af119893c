//! Invoice, exported as PDF.
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Number;

use crate::builders::{
    RequisiteStyle, TableStyle, TextStyle, add_requisite, add_text, create_numbering, create_table, fill_table_body,
    fill_table_headers,
};
use crate::config::{NumberFormat, RunConfig};
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::docx::{Document, Justification, LevelSuffix, ListFormat, NumberingKind, Paragraph};
use crate::session::{DocumentKind, DocumentSession};

use super::Scalar;

pub const INPUT: &str = "invoice_response.json";

const ITEM_HEADERS: [&str; 4] = ["Description", "Quantity", "Unit Price", "Total"];

#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub invoice: InvoiceHeader,
    pub seller: Seller,
    pub buyer: Buyer,
    pub items: Vec<InvoiceItem>,
    pub totals: InvoiceTotals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceHeader {
    pub number: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seller {
    pub company_name: String,
    pub address: String,
    pub tin: String,
    pub bank_details: BankDetails,
    pub authorized_person: String,
    pub position: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub swift_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Buyer {
    pub company_name: String,
    pub address: String,
    pub tin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Scalar,
    pub unit_price: Scalar,
    pub total: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Number,
    pub tax: Number,
    pub total_due: Number,
}

impl Validate for Invoice {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.items.is_empty() {
            return Err("invoice has no items".to_string());
        }
        Ok(())
    }
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let invoice: Invoice = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Pdf);
    build(session.word_mut()?, &invoice, &config.number_format)?;
    super::finish(session, config)
}

fn fill_header(paragraph: &mut Paragraph, text: &str) {
    add_text(paragraph, text, &TextStyle::sized(28).bold());
    paragraph.set_spacing_after(50);
}

fn push_details_header(document: &mut Document, text: &str) {
    let paragraph = document.push_paragraph(Paragraph::new());
    add_text(paragraph, text, &TextStyle::new().bold().italic());
    paragraph.set_spacing_after(50);
}

fn push_requisite(document: &mut Document, title: &str, details: &str, style: RequisiteStyle) {
    add_requisite(document.push_paragraph(Paragraph::new()), title, details, style);
}

pub fn build(document: &mut Document, invoice: &Invoice, format: &NumberFormat) -> Result<()> {
    document
        .set_default_font_size(24)
        .set_default_font_family("Times New Roman");

    fill_header(document.paragraph_mut(0)?, "INVOICE");
    push_requisite(document, "Invoice No.", &invoice.invoice.number, RequisiteStyle::default());
    push_requisite(
        document,
        "Date",
        &invoice.invoice.date,
        RequisiteStyle::default().without_spacing(),
    );

    let bullets = create_numbering(document, NumberingKind::Bullet);
    // Bank details hang under their heading without a marker.
    document
        .numbering_mut(bullets)?
        .level_mut(1)?
        .set_custom_type(ListFormat::None, "", Justification::Left)
        .set_suffix(LevelSuffix::Space);
    let top = RequisiteStyle::listed(bullets, 0);
    let nested = RequisiteStyle::listed(bullets, 1).italic_title();

    push_details_header(document, "SELLER INFORMATION");
    let seller = &invoice.seller;
    push_requisite(document, "Company Name", &seller.company_name, top);
    push_requisite(document, "Address", &seller.address, top);
    push_requisite(document, "Tax ID (TIN)", &seller.tin, top);
    push_requisite(document, "Bank Details", "", top);
    push_requisite(document, "Bank Name", &seller.bank_details.bank_name, nested);
    push_requisite(document, "Account Number", &seller.bank_details.account_number, nested);
    push_requisite(
        document,
        "SWIFT Code",
        &seller.bank_details.swift_code,
        nested.without_spacing(),
    );

    push_details_header(document, "BUYER INFORMATION");
    let buyer = &invoice.buyer;
    push_requisite(document, "Company Name", &buyer.company_name, top);
    push_requisite(document, "Address", &buyer.address, top);
    push_requisite(document, "Tax ID (TIN)", &buyer.tin, top.without_spacing());

    fill_header(document.push_paragraph(Paragraph::new()), "TABLE OF ITEMS");
    // One spare row of ellipses signals the list may continue.
    let rows = invoice.items.len() + 2;
    let table = create_table(document, rows, ITEM_HEADERS.len(), &TableStyle::ledger())?;
    fill_table_headers(table, &ITEM_HEADERS, &TextStyle::new().bold())?;
    let body: Vec<Vec<String>> = invoice
        .items
        .iter()
        .map(|item| {
            vec![
                item.description.clone(),
                item.quantity.to_string(),
                item.unit_price.to_string(),
                item.total.to_string(),
            ]
        })
        .collect();
    fill_table_body(table, &body, 1, &TextStyle::new())?;
    fill_table_body(table, &[vec!["..."; ITEM_HEADERS.len()]], rows - 1, &TextStyle::new())?;

    push_details_header(document, "TOTALS");
    let totals = &invoice.totals;
    push_requisite(document, "Subtotal", &format.plain_money(&totals.subtotal), top);
    push_requisite(document, "Tax (20% VAT)", &format.plain_money(&totals.tax), top);
    push_requisite(
        document,
        "Total Amount Due",
        &format.plain_money(&totals.total_due),
        top.without_spacing(),
    );

    add_text(
        document.push_paragraph(Paragraph::new()),
        "Signature:",
        &TextStyle::new().bold(),
    );
    let signature = document.push_paragraph(Paragraph::new());
    signature.add_text(&format!("{}, {}", seller.authorized_person, seller.position));
    signature.add_line_break();
    signature.add_text(&seller.company_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::input::InputError;
    use crate::pdf::PdfExporter;
    use crate::reports::testing::{overwrite_data, sandbox};

    fn sample() -> Invoice {
        serde_json::from_str(
            r#"{
                "invoice": {"number": "INV-0042", "date": "2024-10-01"},
                "seller": {
                    "company_name": "Blue Harbor Ltd",
                    "address": "7 Dock Lane",
                    "tin": "987654321",
                    "bank_details": {"bank_name": "First Bank", "account_number": "0011223344", "swift_code": "FBNKUS33"},
                    "authorized_person": "Robin Hale",
                    "position": "CFO"
                },
                "buyer": {"company_name": "Acme Corp", "address": "1 Main St", "tin": "111222333"},
                "items": [
                    {"description": "Consulting", "quantity": 10, "unit_price": 150, "total": 1500},
                    {"description": "Support plan", "quantity": "1 year", "unit_price": "$500", "total": "$500"}
                ],
                "totals": {"subtotal": 2000, "tax": 400, "total_due": 2400}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_items_table_ends_with_spare_row() {
        let mut document = Document::new();
        build(&mut document, &sample(), &NumberFormat::default()).unwrap();
        let cells = document.tables().next().unwrap().cell_texts();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], ITEM_HEADERS.to_vec());
        assert_eq!(cells[1], vec!["Consulting", "10", "150", "1500"]);
        assert_eq!(cells[2][1], "1 year");
        assert_eq!(cells[3], vec!["..."; 4]);
    }

    #[test]
    fn test_totals_are_not_grouped() {
        let mut document = Document::new();
        build(&mut document, &sample(), &NumberFormat::default()).unwrap();
        let texts = document.paragraph_texts();
        assert!(texts.contains(&"Total Amount Due: $2400".to_string()));
        assert!(texts.contains(&"Robin Hale, CFO\nBlue Harbor Ltd".to_string()));

        let bank = document.numberings()[0].level(1).unwrap();
        assert_eq!(bank.format, ListFormat::None);
        assert_eq!(bank.suffix, LevelSuffix::Space);
    }

    #[test]
    fn test_cents_are_kept() {
        let mut invoice = sample();
        invoice.items[0].unit_price = serde_json::from_str("149.99").unwrap();
        invoice.totals = serde_json::from_str(r#"{"subtotal": 1999.9, "tax": 399.98, "total_due": 2399.88}"#).unwrap();
        let mut document = Document::new();
        build(&mut document, &invoice, &NumberFormat::default()).unwrap();
        let texts = document.paragraph_texts();
        assert!(texts.contains(&"Tax (20% VAT): $399.98".to_string()));
        assert!(texts.contains(&"Total Amount Due: $2399.88".to_string()));
        assert_eq!(document.tables().next().unwrap().cell_texts()[1][2], "149.99");
    }

    #[test]
    fn test_layout_fits_one_page() {
        let mut document = Document::new();
        build(&mut document, &sample(), &NumberFormat::default()).unwrap();
        let layout = PdfExporter::new(&document).layout().unwrap();
        assert_eq!(layout.pages.len(), 1);
        assert!(layout.pages[0].texts().any(|t| t.contains("INVOICE")));
    }

    #[test]
    fn test_generate_writes_pdf() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        assert_eq!(output.extension().unwrap(), "pdf");
        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(lopdf::Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn test_no_items_is_invalid() {
        let (_dir, config) = sandbox();
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(config.data_file(INPUT)).unwrap()).unwrap();
        value["items"] = serde_json::json!([]);
        overwrite_data(&config, INPUT, &value.to_string());
        assert!(matches!(generate(&config), Err(Error::Input(InputError::Invalid { .. }))));
        assert!(!config.output_file("pdf").exists());
    }
}
