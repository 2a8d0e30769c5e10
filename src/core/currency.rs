use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies whose smallest unit is the whole unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "VND", "CLP", "ISK", "UGX"];

/// ISO 4217-style currency code a group is denominated in.
///
/// All amounts inside a group share this one currency. There is no
/// conversion between codes.
///
/// # Examples
///
/// ```
/// use expense_settler::core::currency::CurrencyCode;
/// use rust_decimal_macros::dec;
///
/// let eur = CurrencyCode::new("EUR");
/// assert_eq!(eur.minor_unit(), dec!(0.01));
/// assert_eq!(CurrencyCode::new("JPY").minor_unit(), dec!(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places used when rounding split shares.
    pub fn decimal_places(&self) -> u32 {
        if ZERO_DECIMAL_CURRENCIES.contains(&self.0.as_str()) {
            0
        } else {
            2
        }
    }

    /// The smallest amount that can change hands in this currency.
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
