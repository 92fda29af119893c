//! The standard Type1 fonts every PDF reader provides, with approximate
//! advance widths for line breaking.

use crate::ooxml::docx::RunProperties;

/// Advance widths of ASCII 32..=126 in Helvetica, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of ASCII 32..=126 in Times-Roman, in 1/1000 em.
#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFamily {
    Times,
    Helvetica,
    Courier,
}

impl FontFamily {
    /// Map a document font name onto the closest standard family.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("courier") || lower.contains("mono") || lower.contains("consolas") {
            FontFamily::Courier
        } else if lower.contains("times")
            || lower.contains("georgia")
            || lower.contains("serif") && !lower.contains("sans")
            || lower.contains("cambria")
            || lower.contains("garamond")
        {
            FontFamily::Times
        } else {
            FontFamily::Helvetica
        }
    }
}

/// One of the twelve standard fonts used by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardFont {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl StandardFont {
    pub fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self { family, bold, italic }
    }

    pub fn for_run(properties: &RunProperties, fallback_family: &str) -> Self {
        let name = properties.font_family.as_deref().unwrap_or(fallback_family);
        Self::new(
            FontFamily::from_name(name),
            properties.bold.unwrap_or(false),
            properties.italic.unwrap_or(false),
        )
    }

    pub fn base_font(self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Advance width of `ch` in 1/1000 em. Bold faces run about 5% wider
    /// than the regular metrics.
    pub fn char_width(self, ch: char) -> u32 {
        let base = match self.family {
            FontFamily::Courier => 600,
            FontFamily::Helvetica => ascii_width(&HELVETICA_WIDTHS, ch, 556),
            FontFamily::Times => ascii_width(&TIMES_WIDTHS, ch, 500),
        };
        if self.bold && self.family != FontFamily::Courier {
            base * 105 / 100
        } else {
            base
        }
    }

    /// Width of `text` in points at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.char_width(ch)).sum();
        units as f32 * size / 1000.0
    }
}

fn ascii_width(table: &[u16; 95], ch: char, fallback: u16) -> u32 {
    let code = ch as u32;
    if (32..=126).contains(&code) {
        u32::from(table[(code - 32) as usize])
    } else {
        u32::from(fallback)
    }
}

/// Encode `text` for a font using `WinAnsiEncoding`. Characters outside the
/// encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7E}' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' | '\u{25AA}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_family_mapping() {
        assert_eq!(FontFamily::from_name("Times New Roman"), FontFamily::Times);
        assert_eq!(FontFamily::from_name("Georgia"), FontFamily::Times);
        assert_eq!(FontFamily::from_name("Arial"), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("Microsoft Sans Serif"), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("Courier New"), FontFamily::Courier);
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(StandardFont::new(FontFamily::Times, true, true).base_font(), "Times-BoldItalic");
        assert_eq!(StandardFont::new(FontFamily::Helvetica, false, true).base_font(), "Helvetica-Oblique");
    }

    #[test]
    fn test_widths() {
        let times = StandardFont::new(FontFamily::Times, false, false);
        assert_eq!(times.char_width(' '), 250);
        assert_eq!(times.char_width('W'), 944);
        assert!((times.text_width("aaaa", 12.0) - 4.0 * 444.0 * 12.0 / 1000.0).abs() < 1e-3);
        let bold = StandardFont::new(FontFamily::Times, true, false);
        assert!(bold.char_width('W') > times.char_width('W'));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("A\u{2022}\u{e9}\u{4e2d}"), vec![b'A', 0x95, 0xE9, b'?']);
    }

    proptest! {
        #[test]
        fn prop_encoding_keeps_one_byte_per_char(text in "\\PC{0,40}") {
            prop_assert_eq!(encode_win_ansi(&text).len(), text.chars().count());
        }

        #[test]
        fn prop_width_is_additive(a in "[ -~]{0,20}", b in "[ -~]{0,20}") {
            let font = StandardFont::new(FontFamily::Helvetica, false, false);
            let joined = format!("{}{}", a, b);
            let sum = font.text_width(&a, 10.0) + font.text_width(&b, 10.0);
            prop_assert!((font.text_width(&joined, 10.0) - sum).abs() < 1e-2);
        }
    }
}
