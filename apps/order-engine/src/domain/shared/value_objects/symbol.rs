//! Symbol value object for instrument tickers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

const MAX_SYMBOL_LEN: usize = 10;

/// An equity ticker such as `AAPL` or `BRK.B`.
///
/// Always trimmed and upper-cased. Use [`Symbol::parse`] for untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalise without validating.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_uppercase())
    }

    /// Normalise and validate a ticker.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] when the ticker is empty, longer
    /// than ten characters, or contains anything other than ASCII letters,
    /// digits, `.` and `-`.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let symbol = Self::new(value);
        symbol.validate()?;
        Ok(symbol)
    }

    /// Check the ticker shape.
    ///
    /// # Errors
    ///
    /// See [`Symbol::parse`].
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::invalid("symbol", "symbol cannot be empty"));
        }
        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::invalid(
                "symbol",
                format!("symbol longer than {MAX_SYMBOL_LEN} characters"),
            ));
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(DomainError::invalid(
                "symbol",
                format!("symbol '{}' contains invalid characters", self.0),
            ));
        }
        Ok(())
    }

    /// Borrow the ticker text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
