/// Shared strings table (`xl/sharedStrings.xml`).
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use crate::ooxml::xmltext::TextBuffer;

/// Unique strings of a workbook, in first-use order.
#[derive(Debug, Default)]
pub(crate) struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    /// Number of cell references, duplicates included
    references: usize,
}

impl SharedStrings {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Index of `s`, adding it when new.
    pub(crate) fn add(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        i
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(64 + self.strings.len() * 32);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        )?;
        for s in &self.strings {
            // leading or trailing blanks are dropped unless preserved
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s))?;
            } else {
                write!(xml, "<si><t>{}</t></si>", escape_xml(s))?;
            }
        }
        xml.push_str("</sst>");
        Ok(xml)
    }
}

/// Read the strings of an existing `sharedStrings.xml`. Rich text items are
/// flattened to the concatenation of their runs; phonetic runs are skipped.
pub(crate) fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut strings = Vec::new();
    let mut text = TextBuffer::default();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => in_item = true,
                b"rPh" => in_phonetic = true,
                b"t" if in_item && !in_phonetic => in_text = true,
                _ => {},
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => text.push_text(&t),
            Event::GeneralRef(r) if in_text => text.push_ref(&r),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    in_item = false;
                    strings.push(text.take());
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_shared() {
        let mut sst = SharedStrings::new();
        assert_eq!(sst.add("Item"), 0);
        assert_eq!(sst.add("Status"), 1);
        assert_eq!(sst.add("Item"), 0);
        let xml = sst.to_xml().unwrap();
        assert!(xml.contains(r#"count="3" uniqueCount="2""#));
        assert!(xml.contains("<si><t>Status</t></si>"));
    }

    #[test]
    fn test_parse_rich_and_plain_items() {
        let xml = br#"<sst xmlns="x"><si><t>Plain &amp; simple</t></si><si><r><t>Ri</t></r><r><rPr><b/></rPr><t>ch</t></r><rPh><t>skip</t></rPh></si><si/></sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Plain & simple", "Rich", ""]);
    }

    #[test]
    fn test_round_trip_preserves_spaces() {
        let mut sst = SharedStrings::new();
        sst.add(" padded ");
        let xml = sst.to_xml().unwrap();
        assert_eq!(parse_shared_strings(xml.as_bytes()).unwrap(), vec![" padded "]);
    }
}
