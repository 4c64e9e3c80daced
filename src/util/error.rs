// PieLog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Construction-time problems surface as `ConfigError`; emission-time
// problems surface as `SinkError`. Both keep their causal chain so the
// caller can log or display the root cause.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all PieLog operations.
#[derive(Debug)]
pub enum PieLogError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// A sink could not be created, written, or rotated.
    Sink(SinkError),
}

impl fmt::Display for PieLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Sink(e) => write!(f, "Sink error: {e}"),
        }
    }
}

impl std::error::Error for PieLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sink(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to logger configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The logger name is empty or contains a path separator.
    InvalidName { name: String },

    /// The timezone is not a known IANA timezone name.
    InvalidTimezone { name: String, reason: String },

    /// A level name could not be parsed.
    UnknownLevel { value: String },

    /// A colour name could not be parsed.
    UnknownColor { value: String },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A required field is missing from the config file.
    MissingField { path: PathBuf, field: &'static str },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { name } => write!(
                f,
                "Logger name '{name}' is invalid: it must be non-empty and \
                 must not contain path separators"
            ),
            Self::InvalidTimezone { name, reason } => {
                write!(f, "Unknown timezone '{name}': {reason}")
            }
            Self::UnknownLevel { value } => write!(
                f,
                "Unknown level '{value}'. Expected one of: debug, info, warning, error, critical"
            ),
            Self::UnknownColor { value } => write!(f, "Unknown colour '{value}'"),
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::MissingField { path, field } => write!(
                f,
                "Config '{}' is missing required field '{field}'",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for PieLogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors related to the console and file sinks.
#[derive(Debug)]
pub enum SinkError {
    /// The per-run log directory could not be created.
    CreateDirectory { path: PathBuf, source: io::Error },

    /// The log file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Writing a rendered record failed.
    Write {
        sink: &'static str,
        source: io::Error,
    },

    /// Archiving the current file or opening its replacement failed.
    Rotate { path: PathBuf, source: io::Error },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDirectory { path, source } => write!(
                f,
                "Cannot create log directory '{}': {source}",
                path.display()
            ),
            Self::Open { path, source } => {
                write!(f, "Cannot open log file '{}': {source}", path.display())
            }
            Self::Write { sink, source } => write!(f, "Write to {sink} sink failed: {source}"),
            Self::Rotate { path, source } => {
                write!(f, "Rotation of '{}' failed: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Open { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::Rotate { source, .. } => Some(source),
        }
    }
}

impl From<SinkError> for PieLogError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

/// Convenience type alias for PieLog results.
pub type Result<T> = std::result::Result<T, PieLogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sink_error_keeps_io_source() {
        let err: PieLogError = SinkError::Write {
            sink: "console",
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        }
        .into();

        assert!(err.to_string().contains("console"));
        let sink = err.source().unwrap();
        assert!(sink.source().unwrap().to_string().contains("pipe closed"));
    }

    #[test]
    fn test_config_error_display_names_value() {
        let err = ConfigError::UnknownLevel {
            value: "loud".to_string(),
        };
        assert!(err.to_string().contains("'loud'"));
        assert!(err.source().is_none());
    }
}
