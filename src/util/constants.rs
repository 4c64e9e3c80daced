// PieLog - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Configuration validation (platform/config.rs) checks against the bounds
// defined here.

// =============================================================================
// Library metadata
// =============================================================================

/// Library display name.
pub const APP_NAME: &str = "PieLog";

/// Current library version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Field layout
// =============================================================================

/// Default minimum width of the timestamp field.
pub const DEFAULT_TIMESTAMP_PADDING: usize = 30;

/// Default minimum width of the level-name field.
pub const DEFAULT_LEVEL_PADDING: usize = 10;

/// Default minimum width of the call-site field.
pub const DEFAULT_CALL_SITE_PADDING: usize = 30;

/// Upper bound on any configurable field padding.
pub const MAX_FIELD_PADDING: usize = 200;

/// Default number of spaces per indentation level in the details block.
pub const DEFAULT_DETAILS_INDENT: usize = 2;

/// Upper bound on the details indentation width.
pub const MAX_DETAILS_INDENT: usize = 16;

/// Timestamp format for every rendered record (millisecond precision).
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Call-site text used when the caller's location cannot be determined.
pub const UNKNOWN_CALL_SITE: &str = "<unknown>:0";

// =============================================================================
// Colours
// =============================================================================

/// Default colour names, parsed through `colored::Color`.
pub const DEFAULT_DEBUG_COLOR: &str = "cyan";
pub const DEFAULT_INFO_COLOR: &str = "green";
pub const DEFAULT_WARNING_COLOR: &str = "yellow";
pub const DEFAULT_ERROR_COLOR: &str = "red";
pub const DEFAULT_CRITICAL_COLOR: &str = "magenta";
pub const DEFAULT_TIMESTAMP_COLOR: &str = "white";
pub const DEFAULT_CALL_SITE_COLOR: &str = "white";
pub const DEFAULT_DETAILS_COLOR: &str = "bright white";

/// Colour used for every field when colourful output is switched off.
pub const DEFAULT_FALLBACK_COLOR: &str = "white";

// =============================================================================
// File sink
// =============================================================================

/// Default log directory, relative to the project root.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default byte size at which the current log file is rotated (32 MiB).
pub const DEFAULT_LOG_FILE_SIZE_LIMIT: u64 = 32 * 1024 * 1024;

/// Smallest non-zero size limit accepted from a config file.
/// Zero is also accepted and disables rotation.
pub const MIN_LOG_FILE_SIZE_LIMIT: u64 = 1024;

/// Default number of rotated backups kept next to the current file.
pub const DEFAULT_MAX_BACKUP_FILES: usize = 2;

/// Upper bound on retained backups.
pub const MAX_BACKUP_FILES: usize = 100;

/// Format of the per-run start timestamp used in directory and file names.
pub const START_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// File extension of every log file, current or rotated.
pub const LOG_FILE_EXTENSION: &str = "log";

// =============================================================================
// Project root discovery
// =============================================================================

/// Marker file whose presence identifies the project root when no explicit
/// root is configured.
pub const PROJECT_ROOT_SENTINEL: &str = "Cargo.toml";

// =============================================================================
// Self-diagnostics
// =============================================================================

/// Default level for the library's own `tracing` diagnostics.
pub const DEFAULT_DIAGNOSTICS_LEVEL: &str = "warn";
