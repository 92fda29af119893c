//! Unit conversion utilities.
//!
//! OOXML mixes several length units: drawing geometry is in EMU, Word
//! paragraph spacing and page margins are in twips (1/20 pt), and font
//! sizes are in half-points (Word) or hundredths of a point (DrawingML).

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_MM: i64 = 36_000;
pub const EMUS_PER_PT: i64 = 12_700;
pub const EMUS_PER_TWIP: i64 = 635;
pub const TWIPS_PER_INCH: i64 = 1_440;
pub const TWIPS_PER_PT: i64 = 20;

#[inline]
pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMUS_PER_MM as f64).round() as i64
}

#[inline]
pub fn inch_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

#[inline]
pub fn pt_to_emu_f64(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn px_to_emu(px: u32, dpi: u32) -> i64 {
    ((px as f64) * EMUS_PER_INCH as f64 / dpi as f64) as i64
}

#[inline]
pub fn px_to_emu_96(px: u32) -> i64 {
    px_to_emu(px, 96)
}

#[inline]
pub fn twip_to_emu_i64(twips: i64) -> i64 {
    twips.saturating_mul(EMUS_PER_TWIP)
}

#[inline]
pub fn emu_to_twip_i64(emu: i64) -> i64 {
    (emu as f64 / EMUS_PER_TWIP as f64).round() as i64
}

#[inline]
pub fn twip_to_pt_f64(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_PT as f64
}

/// Word font sizes are half-points; DrawingML `sz` is hundredths of a point.
#[inline]
pub fn half_points_to_centipoints(half_points: u32) -> u32 {
    half_points.saturating_mul(50)
}

/// Spreadsheet column widths are expressed in characters of the default font.
/// 7 pixels per character plus 5 pixels of padding at 96 DPI.
#[inline]
pub fn column_width_to_emu(width: f64) -> i64 {
    px_to_emu_96((width * 7.0 + 5.0).round().max(0.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_conversions() {
        assert_eq!(mm_to_emu(170.0), 6_120_000);
        assert_eq!(inch_to_emu(1.0), EMUS_PER_INCH);
        assert_eq!(twip_to_emu_i64(1440), EMUS_PER_INCH);
        assert_eq!(half_points_to_centipoints(24), 1200);
        assert_eq!(twip_to_pt_f64(200), 10.0);
    }

    #[test]
    fn test_default_column_width() {
        // 8.43 characters is the Excel default, 64 px
        assert_eq!(column_width_to_emu(8.43), px_to_emu_96(64));
    }

    proptest! {
        #[test]
        fn twip_round_trip(twips in 0i64..10_000_000) {
            prop_assert_eq!(emu_to_twip_i64(twip_to_emu_i64(twips)), twips);
        }

        #[test]
        fn mm_is_monotonic(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            prop_assume!(a <= b);
            prop_assert!(mm_to_emu(a) <= mm_to_emu(b));
        }
    }
}
