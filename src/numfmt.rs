//! Number formatting policy for amounts written into documents.

use serde::Deserialize;
use serde_json::Number;

/// How money, counts and averages are printed.
///
/// The default prints en_US style: `$1,500`, `1,500` and `3.7`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub currency_symbol: String,
    /// Thousands separator; empty disables grouping
    pub grouping_separator: String,
    pub decimal_separator: String,
    /// Fraction digits of averages
    pub average_decimals: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            grouping_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            average_decimals: 1,
        }
    }
}

impl NumberFormat {
    /// Integer with thousands grouping: `1234567` -> `1,234,567`.
    pub fn integer(&self, value: i64) -> String {
        let mut buf = itoa::Buffer::new();
        let digits = buf.format(value.unsigned_abs());
        let grouped = self.group(digits);
        if value < 0 { format!("-{}", grouped) } else { grouped }
    }

    fn group(&self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 * self.grouping_separator.len());
        let lead = digits.len() % 3;
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (idx + 3 - lead) % 3 == 0 {
                out.push_str(&self.grouping_separator);
            }
            out.push(ch);
        }
        out
    }

    /// Grouped amount with the currency symbol: `-1500` -> `-$1,500`,
    /// `1500.25` -> `$1,500.25`.
    pub fn money(&self, value: &Number) -> String {
        self.amount(value, true)
    }

    /// Amount with the currency symbol and no grouping: `$1500`.
    pub fn plain_money(&self, value: &Number) -> String {
        self.amount(value, false)
    }

    /// The number as sent, with every digit kept. Exponent notation is
    /// printed without grouping.
    fn amount(&self, value: &Number, grouped: bool) -> String {
        let text = value.to_string();
        let (sign, unsigned) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text.as_str()),
        };
        if unsigned.contains(['e', 'E']) {
            return format!("{}{}{}", sign, self.currency_symbol, unsigned);
        }
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };
        let mut out = format!("{}{}", sign, self.currency_symbol);
        if grouped {
            out.push_str(&self.group(whole));
        } else {
            out.push_str(whole);
        }
        if let Some(fraction) = fraction {
            out.push_str(&self.decimal_separator);
            out.push_str(fraction);
        }
        out
    }

    /// Fixed-point value with `decimals` fraction digits, without grouping.
    pub fn decimal(&self, value: f64, decimals: usize) -> String {
        let text = format!("{:.*}", decimals, value);
        if self.decimal_separator == "." {
            text
        } else {
            text.replacen('.', &self.decimal_separator, 1)
        }
    }

    pub fn average(&self, value: f64) -> String {
        self.decimal(value, self.average_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_en_us() {
        let format = NumberFormat::default();
        assert_eq!(format.money(&1500.into()), "$1,500");
        assert_eq!(format.money(&(-1_234_567).into()), "-$1,234,567");
        assert_eq!(format.money(&0.into()), "$0");
        assert_eq!(format.plain_money(&1500.into()), "$1500");
        assert_eq!(format.integer(999), "999");
        assert_eq!(format.integer(1000), "1,000");
        assert_eq!(format.average(3.666_666), "3.7");
        assert_eq!(format.money(&i64::MIN.into()), "-$9,223,372,036,854,775,808");
        assert_eq!(format.money(&u64::MAX.into()), "$18,446,744,073,709,551,615");
    }

    #[test]
    fn test_custom_separators() {
        let format = NumberFormat {
            currency_symbol: "\u{20ac}".to_string(),
            grouping_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            average_decimals: 1,
        };
        assert_eq!(format.money(&1_500_000.into()), "\u{20ac}1.500.000");
        assert_eq!(format.money(&decimal(1234.5)), "\u{20ac}1.234,5");
        assert_eq!(format.average(2.25), "2,2");
    }

    #[test]
    fn test_grouping_disabled() {
        let format = NumberFormat { grouping_separator: String::new(), ..Default::default() };
        assert_eq!(format.money(&1_500_000.into()), "$1500000");
    }

    fn decimal(value: f64) -> Number {
        Number::from_f64(value).unwrap()
    }

    #[test]
    fn test_fractional_amounts_keep_their_digits() {
        let format = NumberFormat::default();
        assert_eq!(format.money(&decimal(1499.99)), "$1,499.99");
        assert_eq!(format.plain_money(&decimal(-2400.5)), "-$2400.5");
        assert_eq!(format.plain_money(&decimal(0.125)), "$0.125");
    }

    proptest! {
        #[test]
        fn prop_grouping_round_trips(value in any::<i64>()) {
            let format = NumberFormat::default();
            let text = format.integer(value);
            prop_assert_eq!(text.replace(',', "").parse::<i64>().unwrap(), value);
            for group in text.trim_start_matches('-').split(',').skip(1) {
                prop_assert_eq!(group.len(), 3);
            }
        }

        #[test]
        fn prop_money_starts_with_symbol(value in 0i64..1_000_000_000) {
            let format = NumberFormat::default();
            prop_assert!(format.money(&value.into()).starts_with('$'));
            prop_assert_eq!(format.plain_money(&value.into()), format!("${}", value));
        }
    }
}
