//! Word processing documents.
//!
//! [`Document`] is the object model: a body of paragraphs and tables, a
//! section, document defaults, a style sheet and list definitions.
//! Paragraphs hold runs, content controls and inline drawings. The model is
//! serialized with [`Document::save`].
//!
//! Existing packages are inspected with [`DocxReader`] and their content
//! controls filled with [`FormFiller`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use docforge::ooxml::docx::{Document, Justification, Table};
//!
//! let mut doc = Document::new();
//! let title = doc.paragraph_mut(0)?;
//! title.set_justification(Justification::Center);
//! title.add_text("Annual Report").set_bold(true).set_font_size(44);
//!
//! let mut table = Table::new(2, 3);
//! table.cell(0, 0)?.first_paragraph().add_text("Total revenue");
//! doc.push_table(table);
//! doc.save("result.docx")?;
//! # Ok::<(), docforge::ooxml::OoxmlError>(())
//! ```

pub mod document;
pub mod drawing;
pub mod filler;
pub mod form;
pub mod numbering;
pub mod package;
pub mod paragraph;
pub mod reader;
pub mod run;
pub mod styles;
pub mod table;

pub use document::{BodyElement, Document, Section};
pub use drawing::{InlineChart, InlinePicture};
pub use filler::FormFiller;
pub use form::{ContentControl, PictureForm, ScaleFlag, TextForm};
pub use numbering::{LevelSuffix, ListFormat, Numbering, NumberingKind, NumberingLevel};
pub use paragraph::{Justification, NumberingRef, Paragraph, ParagraphItem, ParagraphProperties, TabAlignment, TabStop};
pub use reader::{BodyContent, DocxReader, FormField, FormKind};
pub use run::{Run, RunContent, RunProperties};
pub use styles::{DocDefaults, Style, StyleKind};
pub use table::{BorderStyle, Cell, CellMargins, Row, Table, TableBorder, VerticalAlign};
