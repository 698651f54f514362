//! Trigger kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// How a conditional order decides to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// Fires when price crosses the stop price.
    Stop,
    /// Fires when price is between the stop and limit prices.
    StopLimit,
    /// A stop whose price follows favourable moves.
    TrailingStop,
}

impl TriggerKind {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::StopLimit => "stop-limit",
            Self::TrailingStop => "trailing-stop",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "stop" => Ok(Self::Stop),
            "stop-limit" => Ok(Self::StopLimit),
            "trailing-stop" => Ok(Self::TrailingStop),
            other => Err(DomainError::invalid(
                "orderKind",
                format!("unknown order kind '{other}', expected stop, stop-limit or trailing-stop"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("stop", TriggerKind::Stop)]
    #[test_case("stop-limit", TriggerKind::StopLimit)]
    #[test_case("stop_limit", TriggerKind::StopLimit)]
    #[test_case("Trailing-Stop", TriggerKind::TrailingStop)]
    fn parses_wire_names(raw: &str, expected: TriggerKind) {
        assert_eq!(raw.parse::<TriggerKind>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("take-profit".parse::<TriggerKind>().is_err());
    }

    #[test]
    fn serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TriggerKind::TrailingStop).unwrap(),
            "\"trailing-stop\""
        );
    }
}
