use crate::error::PaintError;
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered by rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Numeric rank (10, 20, ... 50)
    pub fn rank(self) -> u32 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Canonical upper-case name, as rendered by `%(levelname)s`
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Only the five exact ranks are recognized
    pub fn from_rank(rank: u32) -> Result<Self, PaintError> {
        Level::ALL
            .into_iter()
            .find(|level| level.rank() == rank)
            .ok_or_else(|| PaintError::InvalidLevel(rank.to_string()))
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = PaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(rank) = trimmed.parse::<u32>() {
            return Level::from_rank(rank);
        }

        match trimmed.to_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(PaintError::InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<u32> for Level {
    type Error = PaintError;

    fn try_from(rank: u32) -> Result<Self, PaintError> {
        Level::from_rank(rank)
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            // The facade has no CRITICAL; TRACE folds into DEBUG
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}
