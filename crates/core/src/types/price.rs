//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display with grouped thousands, e.g. `1,500,000 IRR` or `19.99 USD`.
    ///
    /// Rial amounts are shown without fractional digits; other currencies use two.
    #[must_use]
    pub fn display(&self) -> String {
        let places = self.currency_code.minor_units();
        let rounded = self
            .amount
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.*}", places as usize, rounded.abs());
        let (whole, fraction) = text
            .split_once('.')
            .map_or((text.as_str(), None), |(w, f)| (w, Some(f)));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        match fraction {
            Some(f) => format!("{sign}{grouped}.{f} {}", self.currency_code.code()),
            None => format!("{sign}{grouped} {}", self.currency_code.code()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    IRR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::IRR => "IRR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }

    /// Look up a currency by its ISO code, ignoring case.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        [Self::IRR, Self::USD, Self::EUR, Self::GBP]
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Number of decimal places shown for this currency.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::IRR => 0,
            Self::USD | Self::EUR | Self::GBP => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        let price = Price::new(Decimal::new(1_500_000, 0), CurrencyCode::IRR);
        assert_eq!(price.display(), "1,500,000 IRR");
    }

    #[test]
    fn test_display_small_amount() {
        let price = Price::new(Decimal::new(150, 0), CurrencyCode::IRR);
        assert_eq!(price.display(), "150 IRR");
    }

    #[test]
    fn test_display_two_decimal_currency() {
        let price = Price::new(Decimal::new(1_234_567, 1), CurrencyCode::USD);
        assert_eq!(price.display(), "123,456.70 USD");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::new(Decimal::new(-2500, 0), CurrencyCode::IRR);
        assert_eq!(price.to_string(), "-2,500 IRR");
    }

    #[test]
    fn test_default_currency_is_rial() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::IRR);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(CurrencyCode::from_code("usd"), Some(CurrencyCode::USD));
        assert_eq!(CurrencyCode::from_code(" IRR "), Some(CurrencyCode::IRR));
        assert_eq!(CurrencyCode::from_code("JPY"), None);
    }
}
