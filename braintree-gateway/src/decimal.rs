//! Fixed-point currency amounts.
//!
//! Amounts travel as decimal strings and are held as an `(unscaled, scale)` pair,
//! so `"1.00"` stays `1.00` instead of collapsing to `1` or drifting through a
//! binary float.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GatewayError, Result};

/// Exact decimal amount with an explicit scale.
///
/// # Examples
///
/// ```
/// use braintree_gateway::Decimal;
///
/// let price = Decimal::new(100, 2).unwrap();
/// assert_eq!(price.to_string(), "1.00");
///
/// let parsed: Decimal = "12.50".parse().unwrap();
/// assert_eq!((parsed.unscaled(), parsed.scale()), (1250, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal(rust_decimal::Decimal);

impl Decimal {
    /// Largest scale the backing representation can hold.
    pub const MAX_SCALE: u32 = 28;

    /// Creates `unscaled * 10^-scale`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if `scale` exceeds [`Self::MAX_SCALE`].
    pub fn new(unscaled: i64, scale: u32) -> Result<Self> {
        rust_decimal::Decimal::try_new(unscaled, scale)
            .map(Self)
            .map_err(|e| GatewayError::InvalidInput(format!("decimal scale {scale}: {e}")))
    }

    /// The unscaled integer value (`100` for `1.00`).
    #[must_use]
    pub fn unscaled(&self) -> i128 {
        self.0.mantissa()
    }

    /// Number of digits after the decimal point.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Returns the backing `rust_decimal` value.
    #[must_use]
    pub const fn as_inner(&self) -> rust_decimal::Decimal {
        self.0
    }
}

impl From<rust_decimal::Decimal> for Decimal {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Decimal {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        rust_decimal::Decimal::from_str_exact(s.trim())
            .map(Self)
            .map_err(|e| GatewayError::Decode(format!("invalid decimal {s:?}: {e}")))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::codec;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename = "subscription")]
    struct Priced {
        price: Decimal,
    }

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(Decimal::new(100, 2).unwrap().to_string(), "1.00");
        assert_eq!(Decimal::new(0, 0).unwrap().to_string(), "0");
        assert_eq!(Decimal::new(5, 4).unwrap().to_string(), "0.0005");
        assert_eq!(Decimal::new(-1999, 2).unwrap().to_string(), "-19.99");
    }

    #[test]
    fn test_parse_keeps_trailing_zeros() {
        let value: Decimal = "1.00".parse().unwrap();
        assert_eq!(value.unscaled(), 100);
        assert_eq!(value.scale(), 2);
        assert_eq!(value.to_string(), "1.00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ten".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_scale_out_of_range() {
        let result = Decimal::new(1, 29);
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_xml_element_is_fixed_point_text() {
        let xml = codec::encode(&Priced { price: Decimal::new(123_456, 4).unwrap() }).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<price>12.3456</price>"));
    }

    #[test]
    fn test_json_is_string() {
        let json = serde_json::to_string(&Decimal::new(1000, 2).unwrap()).unwrap();
        assert_eq!(json, "\"10.00\"");
    }

    proptest! {
        #[test]
        fn test_wire_round_trip_is_exact(
            scale in prop::sample::select(vec![0u32, 1, 2, 4]),
            unscaled in prop::sample::select(vec![0i64, 1, 100, 123_456]),
        ) {
            let price = Decimal::new(unscaled, scale).unwrap();
            let decoded: Priced = codec::decode(&codec::encode(&Priced { price }).unwrap()).unwrap();
            prop_assert_eq!(decoded.price.unscaled(), i128::from(unscaled));
            prop_assert_eq!(decoded.price.scale(), scale);
        }

        #[test]
        fn test_string_round_trip_is_exact(unscaled in any::<i64>(), scale in 0u32..=8) {
            let price = Decimal::new(unscaled, scale).unwrap();
            let parsed: Decimal = price.to_string().parse().unwrap();
            prop_assert_eq!(parsed.unscaled(), price.unscaled());
            prop_assert_eq!(parsed.scale(), scale);
        }
    }
}
