//! Price normalization into whole rupees.

use laptopscope_model::PriceInput;
use thiserror::Error;

pub const LAKH: u64 = 100_000;
pub const CRORE: u64 = 10_000_000;

const CURRENCY_GLYPH: char = '₹';
const GROUPING_SEPARATOR: char = ',';

// Fraction digits past this point cannot change a truncated result for any
// supported multiplier.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Malformed price: '{0}'")]
    Malformed(String),
    #[error("Price out of range: '{0}'")]
    Overflow(String),
}

/// Normalize a catalog or caller price into whole rupees.
///
/// Integer amounts pass through unchanged.
pub fn normalize_price(input: &PriceInput) -> Result<u64, PriceError> {
    match input {
        PriceInput::Amount(amount) => Ok(*amount),
        PriceInput::Text(text) => parse_price_text(text),
    }
}

/// Parse text such as `"₹65,990"`, `"₹1.25 Lakh"`, `"₹2 L"` or `"₹1 Crore"`.
///
/// Fractional rupees are truncated, not rounded. This holds for plain
/// amounts too: `"65990.75"` parses as 65990 rather than being rejected.
pub fn parse_price_text(text: &str) -> Result<u64, PriceError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != CURRENCY_GLYPH && *c != GROUPING_SEPARATOR)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.contains("Crore") {
        scale_decimal(cleaned.replace("Crore", "").trim(), CRORE, text)
    } else if cleaned.contains("Lakh") {
        scale_decimal(cleaned.replace("Lakh", "").trim(), LAKH, text)
    } else if let Some(number) = cleaned.strip_suffix(" L") {
        scale_decimal(number.trim(), LAKH, text)
    } else {
        let compact: String = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
        scale_decimal(&compact, 1, text)
    }
}

/// Multiply a non-negative decimal literal by `multiplier`, truncating.
fn scale_decimal(number: &str, multiplier: u64, original: &str) -> Result<u64, PriceError> {
    let malformed = || PriceError::Malformed(original.to_string());
    let overflow = || PriceError::Overflow(original.to_string());

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let multiplier = u128::from(multiplier);
    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut scaled = whole_value.checked_mul(multiplier).ok_or_else(overflow)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let fraction_value: u128 = fraction.parse().map_err(|_| malformed())?;
        let denominator = 10u128.pow(fraction.len() as u32);
        scaled += fraction_value * multiplier / denominator;
    }

    u64::try_from(scaled).map_err(|_| overflow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_amounts() {
        assert_eq!(parse_price_text("₹65,990"), Ok(65_990));
        assert_eq!(parse_price_text("₹20,000"), Ok(20_000));
        assert_eq!(parse_price_text("1 29 990"), Ok(129_990));
        assert_eq!(parse_price_text("65990.75"), Ok(65_990));
    }

    #[test]
    fn test_lakh_amounts() {
        assert_eq!(parse_price_text("₹1 Lakh"), Ok(100_000));
        assert_eq!(parse_price_text("₹1.25 Lakh"), Ok(125_000));
        assert_eq!(parse_price_text("₹1.75 Lakh"), Ok(175_000));
        assert_eq!(parse_price_text("₹2 L"), Ok(200_000));
    }

    #[test]
    fn test_crore_amounts() {
        assert_eq!(parse_price_text("₹1 Crore"), Ok(10_000_000));
        assert_eq!(parse_price_text("₹1.5 Crore"), Ok(15_000_000));
    }

    #[test]
    fn test_fraction_truncates_exactly() {
        // Binary floating point would land just under 29000 here.
        assert_eq!(parse_price_text("₹0.29 Lakh"), Ok(29_000));
        assert_eq!(parse_price_text("₹1.234567 Lakh"), Ok(123_456));
    }

    #[test]
    fn test_integer_passes_through() {
        assert_eq!(normalize_price(&PriceInput::Amount(84_990)), Ok(84_990));
        assert_eq!(normalize_price(&PriceInput::Text("₹1 Lakh".into())), Ok(100_000));
    }

    #[test]
    fn test_malformed_text() {
        for bad in ["", "₹", "Lakh", "-500", "₹abc", "1.2.3 Lakh", "₹2L", "Max"] {
            assert!(
                matches!(parse_price_text(bad), Err(PriceError::Malformed(_))),
                "expected malformed for {bad:?}"
            );
        }
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_price_text("99999999999999999999 Crore"),
            Err(PriceError::Overflow(_))
        ));
    }
}
