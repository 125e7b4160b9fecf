//! Monetary amount of a transaction

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Maximum number of fractional digits the store keeps (DECIMAL(18,4))
pub const MAX_SCALE: u32 = 4;

/// Amounts must stay below 10^14 so they fit DECIMAL(18,4)
const MAX_INTEGER_DIGITS: u32 = 14;

/// A strictly positive, exact fixed-point amount
///
/// Constructed only through [`Amount::parse`] or [`Amount::new`], so every
/// value in the ledger has already been validated. Deserialization goes
/// through [`Amount::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// `digits` or `digits.digits`, with an optional leading minus
///
/// No `+`, no digit separators, no bare `.5` or `5.`, no exponent.
fn is_plain_decimal(input: &str) -> bool {
    let unsigned = input.strip_prefix('-').unwrap_or(input);
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    match unsigned.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(unsigned),
    }
}

impl Amount {
    /// Parse a plain decimal string such as `"30000"` or `"12.50"`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input("amount is required"));
        }

        let invalid = || Error::invalid_input(format!("invalid amount: {}", input));
        if !is_plain_decimal(trimmed) {
            return Err(invalid());
        }
        let value = Decimal::from_str_exact(trimmed).map_err(|_| invalid())?;

        Self::new(value)
    }

    /// Validate an already-parsed decimal
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(Error::invalid_input("amount must be greater than zero"));
        }

        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(Error::invalid_input(format!(
                "amount has more than {} decimal places",
                MAX_SCALE
            )));
        }
        if value >= Decimal::from(10i64.pow(MAX_INTEGER_DIGITS)) {
            return Err(Error::invalid_input("amount is too large"));
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_integer_amount() {
        let amount = Amount::parse("30000").unwrap();
        assert_eq!(amount.value(), Decimal::new(30000, 0));
        assert_eq!(amount.to_string(), "30000");
    }

    #[test]
    fn test_parse_normalizes_trailing_zeros() {
        let amount = Amount::parse("12.50").unwrap();
        assert_eq!(amount.value(), Decimal::new(125, 1));
        assert_eq!(amount.to_string(), "12.5");
    }

    #[test]
    fn test_parse_accepts_surrounding_whitespace() {
        assert_eq!(Amount::parse(" 7.25 ").unwrap().value(), Decimal::new(725, 2));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        for input in ["0", "0.00", "-5", "-0.01"] {
            let err = Amount::parse(input).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "input {input:?}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "", "   ", "abc", "1,000", "$5", "12.3.4", "1_000", "1__0", "+5", ".5", "5.", "1e5",
            "- 5", "--5",
        ] {
            let err = Amount::parse(input).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "input {input:?}");
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(Amount::parse("1.0001").is_ok());
        assert!(Amount::parse("1.00010").is_ok());
        assert!(Amount::parse("1.00001").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Amount::parse("99999999999999.9999").is_ok());
        assert!(Amount::parse("100000000000000").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let amount: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(amount.value(), Decimal::new(125, 1));

        for payload in ["\"-5\"", "\"0\"", "\"1.00001\"", "\"100000000000000\""] {
            assert!(
                serde_json::from_str::<Amount>(payload).is_err(),
                "payload {payload}"
            );
        }
    }

    #[test]
    fn test_transaction_payload_with_negative_amount_is_rejected() {
        let payload = r#"{"detail":"x","amount":"-30000","credit_account":1,"debit_account":2}"#;
        assert!(serde_json::from_str::<crate::domain::NewTransaction>(payload).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn prop_parse_is_exact(units in 1i64..1_000_000_000, scale in 0u32..=4) {
            let expected = Decimal::new(units, scale);
            let parsed = Amount::parse(&expected.to_string()).unwrap();
            prop_assert_eq!(parsed.value(), expected);
        }
    }
}
