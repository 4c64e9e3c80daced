// PieLog - core/level.rs
//
// Severity levels. Pure data definitions with no I/O.

use crate::util::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ordered severity levels, least severe first.
///
/// The numeric rank is used both for minimum-level filtering and for
/// selecting the level's default colour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug = 10,
    #[default]
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Level {
    /// All levels in ascending severity.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Stable name printed in every record.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Numeric rank (10, 20, 30, 40, 50).
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Level with exactly this rank, if any.
    pub fn from_rank(rank: u8) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.rank() == rank)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    /// Accepts a level name in any case (`"warn"` is an alias of WARNING)
    /// or a numeric rank.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.to_ascii_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warning" | "warn" => Some(Level::Warning),
            "error" => Some(Level::Error),
            "critical" => Some(Level::Critical),
            other => other.parse::<u8>().ok().and_then(Level::from_rank),
        };
        parsed.ok_or_else(|| ConfigError::UnknownLevel {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_totally_ordered() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn test_parse_names_and_ranks() {
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!(" Critical ".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!("10".parse::<Level>().unwrap(), Level::Debug);
        assert!("15".parse::<Level>().is_err());
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(Level::default(), Level::Info);
        assert_eq!(Level::Info.to_string(), "INFO");
    }
}
