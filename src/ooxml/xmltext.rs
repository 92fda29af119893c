//! Helpers for reading text content with quick-xml.
//!
//! quick-xml reports entity references such as `&amp;` as separate events,
//! so text nodes are collected raw and unescaped once the element closes.

use quick_xml::events::{BytesRef, BytesText};

use crate::common::xml::unescape_xml;

/// Accumulates the raw text of one element.
#[derive(Debug, Default)]
pub(crate) struct TextBuffer {
    raw: String,
}

impl TextBuffer {
    pub(crate) fn push_text(&mut self, text: &BytesText<'_>) {
        self.raw.push_str(&String::from_utf8_lossy(text.as_ref()));
    }

    pub(crate) fn push_ref(&mut self, reference: &BytesRef<'_>) {
        match reference.resolve_char_ref() {
            Ok(Some(ch)) => self.raw.push(ch),
            _ => {
                self.raw.push('&');
                self.raw.push_str(&String::from_utf8_lossy(reference.as_ref()));
                self.raw.push(';');
            },
        }
    }

    pub(crate) fn take(&mut self) -> String {
        unescape_xml(&std::mem::take(&mut self.raw))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
