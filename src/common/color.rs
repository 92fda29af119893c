//! RGB colors.

use std::fmt;

/// An sRGB color as written into `w:color`, `a:srgbClr` and `fgColor` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A neutral grey with all three channels set to `level`.
    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Upper-case hex form without a leading `#`, e.g. `F5F5F5`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// ARGB form used by spreadsheet styles, e.g. `FFF5F5F5`.
    pub fn to_argb(self) -> String {
        format!("FF{}", self.to_hex())
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to `0.0..=1.0` for PDF color operators.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        let c = Rgb::new(245, 245, 245);
        assert_eq!(c.to_hex(), "F5F5F5");
        assert_eq!(c.to_argb(), "FFF5F5F5");
        assert_eq!(Rgb::from_hex("#F5F5F5"), Some(c));
        assert_eq!(Rgb::from_hex("ED7D31"), Some(Rgb::new(237, 125, 49)));
    }

    #[test]
    fn test_invalid_hex() {
        assert_eq!(Rgb::from_hex("12345"), None);
        assert_eq!(Rgb::from_hex("GGGGGG"), None);
        assert_eq!(Rgb::from_hex("ééé"), None);
    }
}
