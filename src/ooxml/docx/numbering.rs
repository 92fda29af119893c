/// List definitions (`word/numbering.xml`).
///
/// Each [`Numbering`] becomes one abstract definition plus one concrete
/// `w:num` that paragraphs point at with [`Paragraph::set_numbering`].
///
/// [`Paragraph::set_numbering`]: super::Paragraph::set_numbering
use std::fmt::Write as FmtWrite;

use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};

use super::paragraph::Justification;

/// Levels per list definition.
pub const LEVEL_COUNT: usize = 9;

const BULLETS: [&str; 3] = ["\u{2022}", "o", "\u{25AA}"];

/// Counter format of a list level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Bullet,
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    /// No counter; only the level text is shown
    None,
}

impl ListFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "bullet" => Ok(Self::Bullet),
            "decimal" => Ok(Self::Decimal),
            "lowerLetter" => Ok(Self::LowerLetter),
            "upperLetter" => Ok(Self::UpperLetter),
            "lowerRoman" => Ok(Self::LowerRoman),
            "upperRoman" => Ok(Self::UpperRoman),
            "none" => Ok(Self::None),
            other => Err(OoxmlError::InvalidFormat(format!("unknown list format '{}'", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Decimal => "decimal",
            Self::LowerLetter => "lowerLetter",
            Self::UpperLetter => "upperLetter",
            Self::LowerRoman => "lowerRoman",
            Self::UpperRoman => "upperRoman",
            Self::None => "none",
        }
    }

    /// Render a counter value in this format.
    pub fn format_counter(self, n: u32) -> String {
        match self {
            Self::Decimal => n.to_string(),
            Self::LowerLetter => letters(n),
            Self::UpperLetter => letters(n).to_uppercase(),
            Self::LowerRoman => roman(n).to_lowercase(),
            Self::UpperRoman => roman(n),
            Self::Bullet | Self::None => String::new(),
        }
    }
}

fn letters(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    // a..z, then aa..zz, as word processors count
    let letter = (b'a' + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat_n(letter, repeat).collect()
}

fn roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, symbol) in TABLE.iter() {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// What follows the list label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

impl LevelSuffix {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "tab" => Ok(Self::Tab),
            "space" => Ok(Self::Space),
            "none" | "nothing" => Ok(Self::Nothing),
            other => Err(OoxmlError::InvalidFormat(format!("unknown level suffix '{}'", other))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "tab",
            Self::Space => "space",
            Self::Nothing => "nothing",
        }
    }
}

/// One level of a list definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingLevel {
    pub format: ListFormat,
    /// Label template; `%1` is the level-1 counter and so on
    pub text: String,
    pub start: u32,
    pub suffix: LevelSuffix,
    pub justification: Justification,
    /// Left indent in twips
    pub indent_left: i32,
    /// Hanging indent of the label in twips
    pub hanging: i32,
}

impl NumberingLevel {
    /// Replace counter format, label template and alignment.
    pub fn set_custom_type(&mut self, format: ListFormat, text: &str, justification: Justification) -> &mut Self {
        self.format = format;
        self.text = text.to_string();
        self.justification = justification;
        self
    }

    pub fn set_suffix(&mut self, suffix: LevelSuffix) -> &mut Self {
        self.suffix = suffix;
        self
    }

    pub fn set_start(&mut self, start: u32) -> &mut Self {
        self.start = start;
        self
    }

    /// Label for the given counters, one per level from level 0 down.
    pub fn label(&self, counters: &[u32], formats: &[ListFormat]) -> String {
        if self.format == ListFormat::Bullet {
            return self.text.clone();
        }
        let mut label = self.text.clone();
        // replace from the highest placeholder so %1 does not eat %10
        for level in (0..counters.len()).rev() {
            let placeholder = format!("%{}", level + 1);
            if label.contains(&placeholder) {
                let format = formats.get(level).copied().unwrap_or(ListFormat::Decimal);
                label = label.replace(&placeholder, &format.format_counter(counters[level]));
            }
        }
        label
    }
}

/// Kind of list created by [`Numbering::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingKind {
    Bullet,
    Numbered,
}

/// A list definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbering {
    pub(crate) num_id: u32,
    pub(crate) levels: Vec<NumberingLevel>,
}

impl Numbering {
    pub fn new(kind: NumberingKind) -> Self {
        let levels = (0..LEVEL_COUNT)
            .map(|i| {
                let (format, text) = match kind {
                    NumberingKind::Bullet => (ListFormat::Bullet, BULLETS[i % BULLETS.len()].to_string()),
                    NumberingKind::Numbered => {
                        let format = match i % 3 {
                            0 => ListFormat::Decimal,
                            1 => ListFormat::LowerLetter,
                            _ => ListFormat::LowerRoman,
                        };
                        (format, format!("%{}.", i + 1))
                    },
                };
                NumberingLevel {
                    format,
                    text,
                    start: 1,
                    suffix: LevelSuffix::Tab,
                    justification: Justification::Left,
                    indent_left: 720 * (i as i32 + 1),
                    hanging: 360,
                }
            })
            .collect();
        Self { num_id: 0, levels }
    }

    pub fn bullet() -> Self {
        Self::new(NumberingKind::Bullet)
    }

    /// Decimal list with `%1.` labels on the first level.
    pub fn decimal() -> Self {
        Self::new(NumberingKind::Numbered)
    }

    /// Id paragraphs use to join this list. Zero until added to a document.
    pub fn num_id(&self) -> u32 {
        self.num_id
    }

    pub fn level(&self, index: usize) -> Result<&NumberingLevel> {
        let len = self.levels.len();
        self.levels
            .get(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "numbering level", index, len })
    }

    pub fn level_mut(&mut self, index: usize) -> Result<&mut NumberingLevel> {
        let len = self.levels.len();
        self.levels
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "numbering level", index, len })
    }

    pub fn formats(&self) -> Vec<ListFormat> {
        self.levels.iter().map(|level| level.format).collect()
    }

    fn write_abstract(&self, xml: &mut String, abstract_id: u32) -> Result<()> {
        write!(xml, r#"<w:abstractNum w:abstractNumId="{}">"#, abstract_id)?;
        xml.push_str(r#"<w:multiLevelType w:val="hybridMultilevel"/>"#);
        for (i, level) in self.levels.iter().enumerate() {
            write!(xml, r#"<w:lvl w:ilvl="{}">"#, i)?;
            write!(xml, r#"<w:start w:val="{}"/>"#, level.start)?;
            write!(xml, r#"<w:numFmt w:val="{}"/>"#, level.format.as_str())?;
            if level.suffix != LevelSuffix::Tab {
                write!(xml, r#"<w:suff w:val="{}"/>"#, level.suffix.as_str())?;
            }
            write!(xml, r#"<w:lvlText w:val="{}"/>"#, escape_xml(&level.text))?;
            write!(xml, r#"<w:lvlJc w:val="{}"/>"#, level.justification.as_str())?;
            write!(
                xml,
                r#"<w:pPr><w:ind w:left="{}" w:hanging="{}"/></w:pPr>"#,
                level.indent_left, level.hanging
            )?;
            xml.push_str("</w:lvl>");
        }
        xml.push_str("</w:abstractNum>");
        Ok(())
    }
}

/// Serialize all list definitions of a document.
pub(crate) fn numbering_xml(definitions: &[Numbering]) -> Result<String> {
    let mut xml = String::with_capacity(1024 * definitions.len().max(1));
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
    for (i, numbering) in definitions.iter().enumerate() {
        numbering.write_abstract(&mut xml, i as u32)?;
    }
    for (i, numbering) in definitions.iter().enumerate() {
        write!(
            xml,
            r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/></w:num>"#,
            numbering.num_id, i
        )?;
    }
    xml.push_str("</w:numbering>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_labels() {
        let numbering = Numbering::decimal();
        let formats = numbering.formats();
        assert_eq!(numbering.level(0).unwrap().label(&[3], &formats), "3.");
        assert_eq!(numbering.level(1).unwrap().label(&[3, 2], &formats), "b.");
    }

    #[test]
    fn test_custom_none_level() {
        let mut numbering = Numbering::bullet();
        numbering
            .level_mut(1)
            .unwrap()
            .set_custom_type(ListFormat::None, "", Justification::Left)
            .set_suffix(LevelSuffix::Space);
        let formats = numbering.formats();
        assert_eq!(numbering.level(1).unwrap().label(&[1, 1], &formats), "");
        assert_eq!(numbering.level(0).unwrap().label(&[1], &formats), "\u{2022}");

        let xml = numbering_xml(&[numbering]).unwrap();
        assert!(xml.contains(r#"<w:numFmt w:val="none"/><w:suff w:val="space"/><w:lvlText w:val=""/>"#));
    }

    #[test]
    fn test_counter_formats() {
        assert_eq!(ListFormat::LowerLetter.format_counter(27), "aa");
        assert_eq!(ListFormat::UpperRoman.format_counter(1994), "MCMXCIV");
        assert_eq!(ListFormat::LowerRoman.format_counter(4), "iv");
        assert!(ListFormat::from_name("decimal").is_ok());
        assert!(ListFormat::from_name("emoji").is_err());
    }

    #[test]
    fn test_numbering_xml_orders_abstracts_first() {
        let mut a = Numbering::bullet();
        a.num_id = 1;
        let mut b = Numbering::decimal();
        b.num_id = 2;
        let xml = numbering_xml(&[a, b]).unwrap();
        let last_abstract = xml.rfind("<w:abstractNum ").unwrap();
        let first_num = xml.find("<w:num ").unwrap();
        assert!(last_abstract < first_num);
        assert!(xml.contains(r#"<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>"#));
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(Numbering::bullet().level(LEVEL_COUNT).is_err());
    }
}
