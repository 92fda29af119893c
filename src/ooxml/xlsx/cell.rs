/// Cell values and A1-style references.
use std::fmt;

use crate::ooxml::charts::GridValue;
use crate::ooxml::charts::model::{column_letters, format_number};
use crate::ooxml::error::{OoxmlError, Result};

/// Value held by a worksheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Error literal such as `#DIV/0!`
    Error(String),
    /// Formula without the leading `=`, with the value computed for it when
    /// the writer knows it
    Formula {
        formula: String,
        cached: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Interpret user input the way a spreadsheet does: a leading `=` makes a
    /// formula, numeric text a number, anything else text.
    pub fn parse(input: &str) -> Self {
        if let Some(formula) = input.strip_prefix('=')
            && !formula.is_empty()
        {
            return Self::Formula {
                formula: formula.to_string(),
                cached: None,
            };
        }
        match parse_number(input) {
            Some(n) => Self::Number(n),
            None if input.is_empty() => Self::Empty,
            None => Self::Text(input.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn formula(formula: &str, cached: Option<f64>) -> Self {
        Self::Formula {
            formula: formula.strip_prefix('=').unwrap_or(formula).to_string(),
            cached: cached.map(|n| Box::new(Self::Number(n))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number behind the cell, looking through formula caches.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Formula { cached: Some(v), .. } => v.as_number(),
            _ => None,
        }
    }

    /// The value as a chart data point.
    pub fn to_grid_value(&self) -> GridValue {
        match self {
            Self::Empty => GridValue::Empty,
            Self::Number(n) => GridValue::Number(*n),
            Self::Text(s) | Self::Error(s) => GridValue::Text(s.clone()),
            Self::Bool(b) => GridValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Self::Formula { cached: Some(v), .. } => v.to_grid_value(),
            Self::Formula { cached: None, .. } => GridValue::Empty,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) | Self::Error(s) => f.write_str(s),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Formula { cached: Some(v), .. } => v.fmt(f),
            Self::Formula { formula, cached: None } => write!(f, "={}", formula),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Number in `input`, if the whole string is a plain decimal number.
/// `inf`, `NaN` and hex forms are text in a spreadsheet.
pub(crate) fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let first = trimmed.bytes().next()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `A1` name of a zero-based cell.
pub fn cell_name(row: u32, col: u32) -> String {
    let mut name = column_letters(col);
    let mut buf = itoa::Buffer::new();
    name.push_str(buf.format(row + 1));
    name
}

/// Parse `B3` or `$B$3` into a zero-based `(row, col)`.
pub fn parse_cell_ref(reference: &str) -> Result<(u32, u32)> {
    let invalid = || OoxmlError::InvalidReference(reference.to_string());
    let bytes = reference.trim().as_bytes();
    let mut i = 0;
    if bytes.get(i) == Some(&b'$') {
        i += 1;
    }
    let letters_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    let letters = &bytes[letters_start..i];
    if letters.is_empty() || letters.len() > 3 {
        return Err(invalid());
    }
    if bytes.get(i) == Some(&b'$') {
        i += 1;
    }
    let row: u32 = atoi_simd::parse::<u32, false, false>(&bytes[i..]).map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }

    let col = letters
        .iter()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1));
    Ok((row - 1, col - 1))
}

/// A rectangular block of cells, optionally on a named sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub sheet: Option<String>,
    pub first: (u32, u32),
    pub last: (u32, u32),
}

impl RangeRef {
    /// Parse `A1`, `A1:C3`, `Sheet1!$A$1:$B$12` or `'My sheet'!B2`.
    /// Corners are normalized so `first` is the top-left cell.
    pub fn parse(reference: &str) -> Result<Self> {
        let (sheet, cells) = match reference.rsplit_once('!') {
            Some((sheet, cells)) => {
                let sheet = sheet
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .map(|s| s.replace("''", "'"))
                    .unwrap_or_else(|| sheet.to_string());
                (Some(sheet), cells)
            },
            None => (None, reference),
        };
        let (a, b) = match cells.split_once(':') {
            Some((a, b)) => (parse_cell_ref(a)?, parse_cell_ref(b)?),
            None => {
                let cell = parse_cell_ref(cells)?;
                (cell, cell)
            },
        };
        Ok(Self {
            sheet,
            first: (a.0.min(b.0), a.1.min(b.1)),
            last: (a.0.max(b.0), a.1.max(b.1)),
        })
    }

    pub fn rows(&self) -> u32 {
        self.last.0 - self.first.0 + 1
    }

    pub fn cols(&self) -> u32 {
        self.last.1 - self.first.1 + 1
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first.0..=self.last.0).contains(&row) && (self.first.1..=self.last.1).contains(&col)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = cell_name(self.first.0, self.first.1);
        if self.first == self.last {
            f.write_str(&first)
        } else {
            write!(f, "{}:{}", first, cell_name(self.last.0, self.last.1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(CellValue::parse("1001"), CellValue::Number(1001.0));
        assert_eq!(CellValue::parse("12.2"), CellValue::Number(12.2));
        assert_eq!(CellValue::parse("Item A"), CellValue::text("Item A"));
        assert_eq!(CellValue::parse("true"), CellValue::text("true"));
        assert_eq!(CellValue::parse("inf"), CellValue::text("inf"));
        assert_eq!(CellValue::parse(""), CellValue::Empty);
        assert_eq!(
            CellValue::parse("=$B$2*POWER((1+0.12),A3)"),
            CellValue::Formula {
                formula: "$B$2*POWER((1+0.12),A3)".to_string(),
                cached: None
            }
        );
    }

    #[test]
    fn test_display_uses_cache() {
        let value = CellValue::formula("=SUM(A1:A2)", Some(3.0));
        assert_eq!(value.to_string(), "3");
        assert_eq!(value.as_number(), Some(3.0));
        assert_eq!(CellValue::formula("A1", None).to_string(), "=A1");
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(parse_cell_ref("A1").unwrap(), (0, 0));
        assert_eq!(parse_cell_ref("$AB$12").unwrap(), (11, 27));
        assert!(parse_cell_ref("A0").is_err());
        assert!(parse_cell_ref("1A").is_err());
        assert!(parse_cell_ref("A").is_err());

        let range = RangeRef::parse("'Price list'!$C$3:$A$1").unwrap();
        assert_eq!(range.sheet.as_deref(), Some("Price list"));
        assert_eq!(range.first, (0, 0));
        assert_eq!(range.last, (2, 2));
        assert_eq!(range.to_string(), "A1:C3");
        assert_eq!(RangeRef::parse("E1").unwrap().rows(), 1);
    }

    proptest! {
        #[test]
        fn prop_cell_name_round_trip(row in 0u32..1_048_576, col in 0u32..16_384) {
            prop_assert_eq!(parse_cell_ref(&cell_name(row, col)).unwrap(), (row, col));
        }
    }
}
