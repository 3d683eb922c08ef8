//! Fixed-point price with two decimal places.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ProductError;

/// Largest number of integer digits accepted (10 digits total, 2 fractional).
const MAX_INTEGER_DIGITS: usize = 8;

/// A price in hundredths of the currency unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal literal such as `"1199.99"`, `"-3"` or `"0.125"`.
    ///
    /// Extra fractional digits are rounded half away from zero.
    pub fn parse(input: &str) -> Result<Self, ProductError> {
        let invalid = || ProductError::validation(format!("invalid price: '{input}'"));

        let s = input.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_part = int_part.trim_start_matches('0');
        if int_part.len() > MAX_INTEGER_DIGITS {
            return Err(ProductError::validation(format!(
                "invalid price: '{input}' (at most {MAX_INTEGER_DIGITS} digits before the decimal point)"
            )));
        }

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let frac = frac_part.as_bytes();
        let digit = |i: usize| frac.get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);
        let mut cents = units * 100 + digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl core::str::FromStr for Price {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rendered as a string (`"1199.99"`) so no precision is lost in JSON.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts either a JSON number or a decimal string.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Int(v) => v.to_string(),
            Raw::Float(v) => v.to_string(),
            Raw::Text(v) => v,
        };
        Price::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_common_literals() {
        assert_eq!(Price::parse("1199.99").unwrap(), Price::from_cents(119_999));
        assert_eq!(Price::parse("3").unwrap(), Price::from_cents(300));
        assert_eq!(Price::parse("0.5").unwrap(), Price::from_cents(50));
        assert_eq!(Price::parse(".25").unwrap(), Price::from_cents(25));
        assert_eq!(Price::parse("-2.10").unwrap(), Price::from_cents(-210));
    }

    #[test]
    fn rounds_extra_fraction_digits() {
        assert_eq!(Price::parse("0.125").unwrap(), Price::from_cents(13));
        assert_eq!(Price::parse("0.124").unwrap(), Price::from_cents(12));
    }

    #[test]
    fn rejects_garbage_and_oversized_values() {
        assert!(Price::parse("").is_err());
        assert!(Price::parse("abc").is_err());
        assert!(Price::parse("1.2.3").is_err());
        assert!(Price::parse("123456789").is_err());
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_float: Price = serde_json::from_str("52999.99").unwrap();
        let from_int: Price = serde_json::from_str("10").unwrap();
        let from_text: Price = serde_json::from_str("\"749.99\"").unwrap();

        assert_eq!(from_float.to_string(), "52999.99");
        assert_eq!(from_int.to_string(), "10.00");
        assert_eq!(from_text.to_string(), "749.99");
        assert!(serde_json::from_str::<Price>("true").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(-5)).unwrap();
        assert_eq!(json, "\"-0.05\"");
    }

    proptest! {
        #[test]
        fn rendering_always_has_two_decimals(cents in -9_999_999_999i64..=9_999_999_999i64) {
            let rendered = Price::from_cents(cents).to_string();
            let (_, frac) = rendered.split_once('.').unwrap();
            prop_assert_eq!(frac.len(), 2);
            prop_assert_eq!(Price::parse(&rendered).unwrap().cents(), cents);
        }
    }
}
