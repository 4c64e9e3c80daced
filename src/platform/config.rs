// PieLog - platform/config.rs
//
// Logger configuration: the in-memory `LoggerConfig` with its defaults, and
// loading from a TOML file with startup validation.
//
// Hard errors (unreadable file, invalid TOML, missing name) abort loading.
// Out-of-range or unrecognised values produce actionable warnings and keep
// the default, so a slightly wrong config never silently changes behaviour
// without telling the user.

use crate::core::color::{self, Palette};
use crate::core::level::Level;
use crate::core::record::Layout;
use crate::util::constants;
use crate::util::error::ConfigError;
use chrono_tz::Tz;
use colored::Color;
use std::path::{Path, PathBuf};

// =============================================================================
// LoggerConfig
// =============================================================================

/// Everything a `Logger` needs, fixed at construction.
///
/// Build with `LoggerConfig::new(name)` and adjust fields with struct
/// update syntax:
///
/// ```
/// use pielog::{Level, LoggerConfig};
///
/// let config = LoggerConfig {
///     min_level: Level::Debug,
///     log_to_file: false,
///     ..LoggerConfig::new("worker")
/// };
/// assert_eq!(config.name, "worker");
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Logger identity; also the log file name stem.
    pub name: String,

    /// IANA timezone for record timestamps (`None` = UTC).
    pub timezone: Option<String>,

    /// Root used for call-site paths and a relative `log_directory`.
    /// `None` = discover by walking up from the current directory.
    ///
    /// Source files outside the root are reported by absolute path.
    /// Relative source paths recorded by the compiler are taken to be
    /// relative to the working directory.
    pub project_root: Option<PathBuf>,

    /// Records below this level are dropped before any formatting.
    pub min_level: Level,

    /// Field widths and details indentation.
    pub layout: Layout,

    /// Level and field colours.
    pub palette: Palette,

    /// Global colour switch; each call may override it.
    pub colorful: bool,

    /// Enable the rotating file sink.
    pub log_to_file: bool,

    /// Parent of the per-run log directories.
    pub log_directory: PathBuf,

    /// Rotate the current file before it reaches this many bytes (0 = never).
    pub log_file_size_limit: u64,

    /// Rotated files kept next to the current one.
    pub max_backup_files: usize,
}

impl LoggerConfig {
    /// Default configuration for a logger called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timezone: None,
            project_root: None,
            min_level: Level::Info,
            layout: Layout::default(),
            palette: Palette::default(),
            colorful: true,
            log_to_file: true,
            log_directory: PathBuf::from(constants::DEFAULT_LOG_DIRECTORY),
            log_file_size_limit: constants::DEFAULT_LOG_FILE_SIZE_LIMIT,
            max_backup_files: constants::DEFAULT_MAX_BACKUP_FILES,
        }
    }

    /// Check the fields that can make construction fail and resolve the
    /// timezone.
    pub fn validate(&self) -> Result<Option<Tz>, ConfigError> {
        if self.name.trim().is_empty() || self.name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidName {
                name: self.name.clone(),
            });
        }

        match &self.timezone {
            None => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidTimezone {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of a logger config file.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Logger name (required).
    pub name: Option<String>,
    /// IANA timezone name.
    pub timezone: Option<String>,
    /// Project root, relative to the config file's directory.
    pub project_root: Option<PathBuf>,
    /// `[levels]` section.
    pub levels: LevelsSection,
    /// `[format]` section.
    pub format: FormatSection,
    /// `[colors]` section.
    pub colors: ColorsSection,
    /// `[file]` section.
    pub file: FileSection,
}

/// `[levels]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LevelsSection {
    /// Minimum level name or rank.
    pub minimum: Option<String>,
}

/// `[format]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FormatSection {
    pub timestamp_padding: Option<usize>,
    pub level_padding: Option<usize>,
    pub call_site_padding: Option<usize>,
    pub details_indent: Option<usize>,
}

/// `[colors]` config section. Colours are names such as "bright white".
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ColorsSection {
    pub colorful: Option<bool>,
    pub debug: Option<String>,
    pub info: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub critical: Option<String>,
    pub timestamp: Option<String>,
    pub call_site: Option<String>,
    pub details: Option<String>,
    /// Fallback colour used when colourful output is off.
    pub default: Option<String>,
}

/// `[file]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FileSection {
    pub enabled: Option<bool>,
    pub directory: Option<PathBuf>,
    pub size_limit_bytes: Option<u64>,
    pub max_backup_files: Option<usize>,
}

/// Load and validate a logger config file.
///
/// Returns the validated config and a list of non-fatal warnings. Every
/// warning is also reported through `tracing`.
pub fn load_config(path: &Path) -> Result<(LoggerConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = raw.name.clone().ok_or_else(|| ConfigError::MissingField {
        path: path.to_path_buf(),
        field: "name",
    })?;

    tracing::debug!(path = %path.display(), logger = %name, "Loaded logger config");

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let (config, warnings) = apply_raw(raw, LoggerConfig::new(name), base_dir);

    if !warnings.is_empty() {
        for warning in &warnings {
            tracing::warn!(path = %path.display(), "{}", warning);
        }
    }

    Ok((config, warnings))
}

/// Fold a parsed file onto `config`, accumulating every validation warning.
fn apply_raw(raw: RawConfig, mut config: LoggerConfig, base_dir: &Path) -> (LoggerConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    config.timezone = raw.timezone;
    config.project_root = raw.project_root.map(|root| base_dir.join(root));

    // -- Levels --
    if let Some(ref minimum) = raw.levels.minimum {
        match minimum.parse::<Level>() {
            Ok(level) => config.min_level = level,
            Err(e) => warnings.push(format!("[levels] minimum: {e}. Using default (INFO).")),
        }
    }

    // -- Format --
    let paddings = [
        ("timestamp_padding", raw.format.timestamp_padding, &mut config.layout.timestamp_padding),
        ("level_padding", raw.format.level_padding, &mut config.layout.level_padding),
        ("call_site_padding", raw.format.call_site_padding, &mut config.layout.call_site_padding),
    ];
    for (field, value, slot) in paddings {
        if let Some(value) = value {
            if value <= constants::MAX_FIELD_PADDING {
                *slot = value;
            } else {
                warnings.push(format!(
                    "[format] {field} = {value} is out of range (0-{}). Using default ({}).",
                    constants::MAX_FIELD_PADDING,
                    *slot,
                ));
            }
        }
    }

    if let Some(indent) = raw.format.details_indent {
        if indent <= constants::MAX_DETAILS_INDENT {
            config.layout.details_indent = indent;
        } else {
            warnings.push(format!(
                "[format] details_indent = {indent} is out of range (0-{}). Using default ({}).",
                constants::MAX_DETAILS_INDENT,
                constants::DEFAULT_DETAILS_INDENT,
            ));
        }
    }

    // -- Colours --
    if let Some(colorful) = raw.colors.colorful {
        config.colorful = colorful;
    }
    let palette = &mut config.palette;
    let colours: [(&str, Option<String>, &mut Color, &str); 9] = [
        ("debug", raw.colors.debug, &mut palette.debug, constants::DEFAULT_DEBUG_COLOR),
        ("info", raw.colors.info, &mut palette.info, constants::DEFAULT_INFO_COLOR),
        ("warning", raw.colors.warning, &mut palette.warning, constants::DEFAULT_WARNING_COLOR),
        ("error", raw.colors.error, &mut palette.error, constants::DEFAULT_ERROR_COLOR),
        ("critical", raw.colors.critical, &mut palette.critical, constants::DEFAULT_CRITICAL_COLOR),
        ("timestamp", raw.colors.timestamp, &mut palette.timestamp, constants::DEFAULT_TIMESTAMP_COLOR),
        ("call_site", raw.colors.call_site, &mut palette.call_site, constants::DEFAULT_CALL_SITE_COLOR),
        ("details", raw.colors.details, &mut palette.details, constants::DEFAULT_DETAILS_COLOR),
        ("default", raw.colors.default, &mut palette.fallback, constants::DEFAULT_FALLBACK_COLOR),
    ];
    for (field, value, slot, default) in colours {
        if let Some(name) = value {
            match color::parse_color(&name) {
                Ok(c) => *slot = c,
                Err(e) => warnings.push(format!("[colors] {field}: {e}. Using default ({default}).")),
            }
        }
    }

    // -- File sink --
    if let Some(enabled) = raw.file.enabled {
        config.log_to_file = enabled;
    }
    if let Some(directory) = raw.file.directory {
        if directory.as_os_str().is_empty() {
            warnings.push(format!(
                "[file] directory is empty. Using default (\"{}\").",
                constants::DEFAULT_LOG_DIRECTORY
            ));
        } else {
            config.log_directory = directory;
        }
    }
    if let Some(limit) = raw.file.size_limit_bytes {
        if limit == 0 || limit >= constants::MIN_LOG_FILE_SIZE_LIMIT {
            config.log_file_size_limit = limit;
        } else {
            warnings.push(format!(
                "[file] size_limit_bytes = {limit} is too small (0 or at least {}). Using default ({}).",
                constants::MIN_LOG_FILE_SIZE_LIMIT,
                constants::DEFAULT_LOG_FILE_SIZE_LIMIT,
            ));
        }
    }
    if let Some(backups) = raw.file.max_backup_files {
        if backups <= constants::MAX_BACKUP_FILES {
            config.max_backup_files = backups;
        } else {
            warnings.push(format!(
                "[file] max_backup_files = {backups} is out of range (0-{}). Using default ({}).",
                constants::MAX_BACKUP_FILES,
                constants::DEFAULT_MAX_BACKUP_FILES,
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("pielog.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let c = LoggerConfig::new("svc");
        assert_eq!(c.min_level, Level::Info);
        assert_eq!(c.layout.timestamp_padding, 30);
        assert_eq!(c.layout.level_padding, 10);
        assert_eq!(c.layout.call_site_padding, 30);
        assert_eq!(c.layout.details_indent, 2);
        assert!(c.colorful);
        assert!(c.log_to_file);
        assert_eq!(c.log_directory, PathBuf::from("logs"));
        assert_eq!(c.log_file_size_limit, 32 * 1024 * 1024);
        assert_eq!(c.max_backup_files, 2);
        assert!(c.validate().unwrap().is_none());
    }

    #[test]
    fn test_validate_rejects_bad_timezone_and_name() {
        let c = LoggerConfig {
            timezone: Some("Mars/Olympus".to_string()),
            ..LoggerConfig::new("svc")
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidTimezone { .. })));

        assert!(matches!(
            LoggerConfig::new("a/b").validate(),
            Err(ConfigError::InvalidName { .. })
        ));
        assert!(matches!(
            LoggerConfig::new("  ").validate(),
            Err(ConfigError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_validate_resolves_timezone() {
        let c = LoggerConfig {
            timezone: Some("Asia/Kolkata".to_string()),
            ..LoggerConfig::new("svc")
        };
        assert_eq!(c.validate().unwrap(), Some(chrono_tz::Asia::Kolkata));
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
name = "billing"
timezone = "Europe/Berlin"
project_root = "app"

[levels]
minimum = "warning"

[format]
level_padding = 12
details_indent = 4

[colors]
colorful = false
error = "bright red"
default = "blue"

[file]
enabled = false
directory = "var/log"
size_limit_bytes = 4096
max_backup_files = 5
"#,
        );

        let (c, warnings) = load_config(&path).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(c.name, "billing");
        assert_eq!(c.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(c.project_root, Some(dir.path().join("app")));
        assert_eq!(c.min_level, Level::Warning);
        assert_eq!(c.layout.level_padding, 12);
        assert_eq!(c.layout.timestamp_padding, 30);
        assert_eq!(c.layout.details_indent, 4);
        assert!(!c.colorful);
        assert_eq!(c.palette.error, Color::BrightRed);
        assert_eq!(c.palette.fallback, Color::Blue);
        assert!(!c.log_to_file);
        assert_eq!(c.log_directory, PathBuf::from("var/log"));
        assert_eq!(c.log_file_size_limit, 4096);
        assert_eq!(c.max_backup_files, 5);
    }

    #[test]
    fn test_invalid_values_warn_and_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
name = "svc"
[levels]
minimum = "loud"
[format]
timestamp_padding = 5000
[colors]
info = "sparkly"
[file]
size_limit_bytes = 10
max_backup_files = 1000
"#,
        );

        let (c, warnings) = load_config(&path).unwrap();
        assert_eq!(warnings.len(), 5, "warnings: {warnings:?}");
        assert_eq!(c.min_level, Level::Info);
        assert_eq!(c.layout.timestamp_padding, 30);
        assert_eq!(c.palette.info, Color::Green);
        assert_eq!(c.log_file_size_limit, constants::DEFAULT_LOG_FILE_SIZE_LIMIT);
        assert_eq!(c.max_backup_files, 2);
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "timezone = \"UTC\"\n");
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::MissingField { field: "name", .. })
        ));
    }

    #[test]
    fn test_unparseable_and_missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "name = [unclosed");
        assert!(matches!(load_config(&path), Err(ConfigError::TomlParse { .. })));
        assert!(matches!(
            load_config(&dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
