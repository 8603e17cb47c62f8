use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency code carried by an account and all of its money values.
///
/// The set is closed: these are the four currencies the bookkeeping surface
/// accepts. There is no conversion between them; an account keeps the
/// currency it was opened with.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// `Money`). All four supported currencies use 2 fraction digits, so
/// `10.50` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ron,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Ron => "RON",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Ron | Currency::Usd | Currency::Eur | Currency::Gbp => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RON" => Ok(Currency::Ron),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(EngineError::ConstraintViolation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_codes() {
        assert_eq!(Currency::try_from("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" ron ").unwrap(), Currency::Ron);
        assert_eq!(Currency::try_from("gbp").unwrap(), Currency::Gbp);
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert!(Currency::try_from("CHF").is_err());
        assert!(Currency::try_from("").is_err());
    }
}
