//! Commercial offer (`.docx`).
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Number;

use crate::builders::{
    RequisiteStyle, TableStyle, TextStyle, add_requisite, add_text, create_numbering, create_table, fill_table_headers,
};
use crate::config::{NumberFormat, RunConfig};
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::docx::{Document, Justification, ListFormat, NumberingKind, Paragraph};
use crate::session::{DocumentKind, DocumentSession};

use super::Scalar;

pub const INPUT: &str = "commercial_offer_data.json";

#[derive(Debug, Clone, Deserialize)]
pub struct CommercialOffer {
    pub offer: OfferHeader,
    pub seller: Seller,
    pub buyer: Buyer,
    pub offer_details: Vec<OfferItem>,
    pub totals: OfferTotals,
    pub terms_and_conditions: Terms,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferHeader {
    pub number: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seller {
    pub company_name: String,
    pub address: String,
    pub tin: String,
    pub contact: Contact,
    pub authorized_person: AuthorizedPerson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedPerson {
    pub full_name: String,
    pub position: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Buyer {
    pub company_name: String,
    pub address: String,
    pub contact_person: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferItem {
    pub description: String,
    pub quantity: Scalar,
    pub unit_price: Number,
    pub total: Number,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferTotals {
    pub subtotal: Number,
    pub discount: Number,
    pub tax: Number,
    pub total: Number,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Terms {
    pub validity_period: String,
    pub payment_terms: String,
    pub delivery_terms: String,
    pub additional_notes: String,
}

impl Validate for CommercialOffer {}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let offer: CommercialOffer = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Word);
    build(session.word_mut()?, &offer, &config.number_format)?;
    super::finish(session, config)
}

fn fill_header(paragraph: &mut Paragraph, text: &str) {
    add_text(paragraph, text, &TextStyle::sized(28).bold());
    paragraph.set_spacing_after(50);
}

fn push_details_header(document: &mut Document, text: &str) {
    let paragraph = document.push_paragraph(Paragraph::new());
    add_text(paragraph, text, &TextStyle::new().bold().italic());
    paragraph.set_spacing_after(40);
}

fn push_requisite(document: &mut Document, title: &str, details: &str, style: RequisiteStyle) {
    add_requisite(document.push_paragraph(Paragraph::new()), title, details, style);
}

pub fn build(document: &mut Document, offer: &CommercialOffer, format: &NumberFormat) -> Result<()> {
    document
        .set_page_margins(1440, 1280, 1440, 1280)
        .set_default_spacing_after(100)
        .set_default_font_size(24)
        .set_default_font_family("Times New Roman");

    fill_header(document.paragraph_mut(0)?, "COMMERCIAL OFFER TEMPLATE");
    push_requisite(document, "Offer No.", &offer.offer.number, RequisiteStyle::default());
    push_requisite(
        document,
        "Date",
        &offer.offer.date,
        RequisiteStyle::default().without_spacing(),
    );

    let bullets = create_numbering(document, NumberingKind::Bullet);
    let bullet = RequisiteStyle::listed(bullets, 0);

    push_details_header(document, "SELLER INFORMATION");
    let seller = &offer.seller;
    push_requisite(document, "Company Name", &seller.company_name, bullet);
    push_requisite(document, "Address", &seller.address, bullet);
    push_requisite(document, "Tax ID (TIN)", &seller.tin, bullet);
    push_requisite(document, "Contact Information", "", bullet);
    push_requisite(document, "Phone", &seller.contact.phone, bullet.italic_title());
    push_requisite(
        document,
        "Email",
        &seller.contact.email,
        bullet.italic_title().without_spacing(),
    );

    push_details_header(document, "BUYER INFORMATION");
    let buyer = &offer.buyer;
    push_requisite(document, "Company Name", &buyer.company_name, bullet);
    push_requisite(document, "Address", &buyer.address, bullet);
    push_requisite(document, "Contact Person", &buyer.contact_person, bullet);
    push_requisite(document, "Email", &buyer.email, bullet.without_spacing());

    fill_header(document.push_paragraph(Paragraph::new()), "OFFER DETAILS");
    let table = create_table(document, offer.offer_details.len() + 1, 4, &TableStyle::ledger())?;
    fill_table_headers(
        table,
        &["Description", "Quantity", "Unit Price", "Total"],
        &TextStyle::new().bold().with_justification(Justification::Center),
    )?;
    for (idx, item) in offer.offer_details.iter().enumerate() {
        let cells = [
            item.description.clone(),
            item.quantity.to_string(),
            format.money(&item.unit_price),
            format.money(&item.total),
        ];
        for (col, text) in cells.iter().enumerate() {
            add_text(table.cell(idx + 1, col)?.first_paragraph(), text, &TextStyle::new());
        }
    }

    push_details_header(document, "TOTALS");
    let totals = &offer.totals;
    push_requisite(document, "Subtotal", &format.money(&totals.subtotal), bullet);
    push_requisite(document, "Discount", &format.money(&totals.discount), bullet);
    push_requisite(document, "Tax (e.g., 20% VAT)", &format.money(&totals.tax), bullet);
    push_requisite(
        document,
        "Total Amount",
        &format.money(&totals.total),
        bullet.without_spacing(),
    );

    push_details_header(document, "TERMS AND CONDITIONS");
    let numbered = create_numbering(document, NumberingKind::Numbered);
    document
        .numbering_mut(numbered)?
        .level_mut(0)?
        .set_custom_type(ListFormat::Decimal, "%1.", Justification::Left);
    let term = RequisiteStyle::listed(numbered, 0);
    let terms = &offer.terms_and_conditions;
    push_requisite(document, "Validity Period", &terms.validity_period, term);
    push_requisite(document, "Payment Terms", &terms.payment_terms, term);
    push_requisite(document, "Delivery Terms", &terms.delivery_terms, term);
    push_requisite(
        document,
        "Additional Notes",
        &terms.additional_notes,
        term.without_spacing(),
    );

    add_text(
        document.push_paragraph(Paragraph::new()),
        "Signature:",
        &TextStyle::new().bold(),
    );
    let signature = document.push_paragraph(Paragraph::new());
    signature.add_text(&format!(
        "{}, {}",
        seller.authorized_person.full_name, seller.authorized_person.position
    ));
    signature.add_line_break();
    signature.add_text(&seller.company_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::testing::sandbox;

    fn sample() -> CommercialOffer {
        serde_json::from_str(
            r#"{
                "offer": {"number": "CO-2024-17", "date": "2024-11-05"},
                "seller": {
                    "company_name": "Northwind Supply",
                    "address": "12 Harbor Road",
                    "tin": "123456789",
                    "contact": {"phone": "+1 555 0100", "email": "sales@northwind.test"},
                    "authorized_person": {"full_name": "Alex Morgan", "position": "Sales Director"}
                },
                "buyer": {
                    "company_name": "Contoso Retail",
                    "address": "4 Market Street",
                    "contact_person": "Sam Rivera",
                    "email": "sam@contoso.test"
                },
                "offer_details": [
                    {"description": "Office chair", "quantity": 20, "unit_price": 1500, "total": 30000},
                    {"description": "Installation", "quantity": "1 service", "unit_price": 800, "total": 800}
                ],
                "totals": {"subtotal": 30800, "discount": 800, "tax": 6000, "total": 36000},
                "terms_and_conditions": {
                    "validity_period": "30 days",
                    "payment_terms": "50% prepayment",
                    "delivery_terms": "Within 14 days",
                    "additional_notes": "Prices include packaging"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_offer_table_formats_money() {
        let mut document = Document::new();
        build(&mut document, &sample(), &NumberFormat::default()).unwrap();
        let table = document.tables().next().unwrap();
        let cells = table.cell_texts();
        assert_eq!(cells[0], vec!["Description", "Quantity", "Unit Price", "Total"]);
        assert_eq!(cells[1], vec!["Office chair", "20", "$1,500", "$30,000"]);
        assert_eq!(cells[2][1], "1 service");
        assert_eq!(document.defaults().run.font_size, Some(24));
    }

    #[test]
    fn test_requisites_and_terms() {
        let mut document = Document::new();
        build(&mut document, &sample(), &NumberFormat::default()).unwrap();
        let texts = document.paragraph_texts();
        assert_eq!(texts[0], "COMMERCIAL OFFER TEMPLATE");
        assert!(texts.contains(&"Total Amount: $36,000".to_string()));
        assert!(texts.contains(&"Alex Morgan, Sales Director\nNorthwind Supply".to_string()));

        let terms = document.numberings().last().unwrap();
        assert_eq!(terms.level(0).unwrap().text, "%1.");
        let listed = document
            .elements()
            .iter()
            .filter_map(|e| e.as_paragraph())
            .filter(|p| p.properties().numbering.map(|n| n.num_id) == Some(terms.num_id()))
            .count();
        assert_eq!(listed, 4);
    }

    #[test]
    fn test_generate() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        assert!(std::fs::metadata(output).unwrap().len() > 0);
    }
}
