// PieLog - app/logger.rs
//
// The dispatcher: owns the configuration, the minimum-level filter, and
// both sinks, and exposes the leveled logging API.
//
// Emission model:
//   - Synchronous. Every call formats and writes on the caller's thread.
//   - The level check happens before any formatting work.
//   - One mutex guards the whole build/render/write sequence, so records
//     from concurrent callers never interleave and file rotation state is
//     never shared between two writers. The guard is released on every
//     exit path; a lock poisoned by a panicking writer is recovered.
//   - Each sink receives the record and its newline in a single write. A
//     failing console does not stop the file write, and vice versa.
//
// Call-site attribution: every public method is `#[track_caller]` and
// passes `Location::caller()` down explicitly. Adding an internal layer
// does not change the reported location; adding a public entry point
// requires the attribute.

use crate::core::callsite::CallSite;
use crate::core::level::Level;
use crate::core::record::{LogOptions, RecordFormatter};
use crate::platform::config::LoggerConfig;
use crate::platform::fs::{self, RotatingFile};
use crate::util::constants::START_TIMESTAMP_FORMAT;
use crate::util::error::{Result, SinkError};
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Leveled logger writing to the console and, optionally, a rotating file.
///
/// Cloning is cheap and every clone shares the same sinks and lock.
///
/// ```no_run
/// use pielog::{LogOptions, Logger, LoggerConfig};
/// use serde_json::json;
///
/// let logger = Logger::new(LoggerConfig::new("service"))?;
/// logger.info("started")?;
/// logger.critical_with(
///     "System failure",
///     LogOptions::new().details(json!({"code": 42})),
/// )?;
/// # Ok::<(), pielog::PieLogError>(())
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    config: LoggerConfig,
    formatter: RecordFormatter,
    project_root: PathBuf,
    log_file_path: Option<PathBuf>,
    sinks: Mutex<Sinks>,
}

struct Sinks {
    console: Box<dyn Write + Send>,
    file: Option<RotatingFile>,
}

impl Sinks {
    /// One `write_all` of the record and its newline, then flush.
    fn write_console(&mut self, record: &str) -> Result<()> {
        let line = fs::terminated(record);
        self.console
            .write_all(line.as_bytes())
            .and_then(|()| self.console.flush())
            .map_err(|e| SinkError::Write {
                sink: "console",
                source: e,
            })?;
        Ok(())
    }

    fn write_file(&mut self, record: &str) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_record(record)?),
            None => Ok(()),
        }
    }
}

impl Logger {
    /// Build a logger that writes its console records to stdout.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_console(config, io::stdout())
    }

    /// Build a logger with a custom console writer.
    ///
    /// Validates the configuration, resolves the project root, and when
    /// file logging is enabled creates `<log_directory>/<start>/` and opens
    /// `<name>-<start>.log` inside it. Any failure aborts construction.
    pub fn with_console<W>(config: LoggerConfig, console: W) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let timezone = config.validate()?;
        let project_root = fs::resolve_project_root(config.project_root.as_deref());
        let formatter = RecordFormatter::new(config.layout, config.palette, config.colorful, timezone);

        let file = if config.log_to_file {
            let start = chrono::Local::now().format(START_TIMESTAMP_FORMAT).to_string();
            let run_dir = fs::create_run_directory(&project_root.join(&config.log_directory), &start)?;
            Some(RotatingFile::open(
                &run_dir,
                &format!("{}-{start}", config.name),
                config.log_file_size_limit,
                config.max_backup_files,
            )?)
        } else {
            None
        };
        let log_file_path = file.as_ref().map(RotatingFile::path);

        tracing::debug!(
            logger = %config.name,
            min_level = %config.min_level,
            root = %project_root.display(),
            file = ?log_file_path,
            "Logger constructed"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                formatter,
                project_root,
                log_file_path,
                sinks: Mutex::new(Sinks {
                    console: Box::new(console),
                    file,
                }),
            }),
        })
    }

    /// Logger identity.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Root that call-site paths are relative to.
    pub fn project_root(&self) -> &Path {
        &self.inner.project_root
    }

    /// Current log file, if file logging is enabled. Rotated backups live
    /// next to it.
    pub fn log_file_path(&self) -> Option<&Path> {
        self.inner.log_file_path.as_deref()
    }

    /// Whether a record at `level` would be emitted. Use it to skip building
    /// expensive details payloads.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.config.min_level
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: &str) -> Result<()> {
        self.emit(Location::caller(), level, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn log_with(&self, level: Level, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), level, message, &options)
    }

    #[track_caller]
    pub fn debug(&self, message: &str) -> Result<()> {
        self.emit(Location::caller(), Level::Debug, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn debug_with(&self, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), Level::Debug, message, &options)
    }

    #[track_caller]
    pub fn info(&self, message: &str) -> Result<()> {
        self.emit(Location::caller(), Level::Info, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn info_with(&self, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), Level::Info, message, &options)
    }

    #[track_caller]
    pub fn warning(&self, message: &str) -> Result<()> {
        self.emit(Location::caller(), Level::Warning, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn warning_with(&self, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), Level::Warning, message, &options)
    }

    #[track_caller]
    pub fn error(&self, message: &str) -> Result<()> {
        self.emit(Location::caller(), Level::Error, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn error_with(&self, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), Level::Error, message, &options)
    }

    #[track_caller]
    pub fn critical(&self, message: &str) -> Result<()> {
        self.emit(Location::caller(), Level::Critical, message, &LogOptions::default())
    }

    #[track_caller]
    pub fn critical_with(&self, message: &str, options: LogOptions<'_>) -> Result<()> {
        self.emit(Location::caller(), Level::Critical, message, &options)
    }

    /// Flush both sinks.
    pub fn flush(&self) -> Result<()> {
        let mut sinks = self.lock_sinks();
        sinks.console.flush().map_err(|e| SinkError::Write {
            sink: "console",
            source: e,
        })?;
        if let Some(file) = sinks.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    /// Filter, render and write one event attributed to `location`.
    pub(crate) fn emit(
        &self,
        location: &'static Location<'static>,
        level: Level,
        message: &str,
        options: &LogOptions<'_>,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let inner = &*self.inner;
        let mut sinks = self.lock_sinks();

        let call_site = CallSite::resolve(location, &inner.project_root);
        let record = inner.formatter.build(level, message, call_site, options);

        // Both sinks are attempted; the first failure is reported.
        let console = sinks.write_console(&inner.formatter.render_console(&record, options.colorful));
        let file = sinks.write_file(&inner.formatter.render_file(&record));
        console.and(file)
    }

    fn lock_sinks(&self) -> std::sync::MutexGuard<'_, Sinks> {
        self.inner
            .sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.config.name)
            .field("min_level", &self.inner.config.min_level)
            .field("log_file_path", &self.inner.log_file_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Console writer whose bytes can be inspected after the fact.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console_only(min_level: Level) -> (Logger, Capture) {
        let capture = Capture::default();
        let config = LoggerConfig {
            min_level,
            colorful: false,
            log_to_file: false,
            project_root: Some(PathBuf::from(".")),
            ..LoggerConfig::new("unit")
        };
        (Logger::with_console(config, capture.clone()).unwrap(), capture)
    }

    #[test]
    fn test_below_minimum_writes_nothing() {
        let (logger, capture) = console_only(Level::Warning);
        logger.debug("x").unwrap();
        logger.info("x").unwrap();
        assert!(capture.text().is_empty());
        assert!(!logger.enabled(Level::Info));
        assert!(logger.enabled(Level::Warning));
    }

    #[test]
    fn test_call_site_is_the_caller() {
        let (logger, capture) = console_only(Level::Debug);
        let line = line!() + 1;
        logger.info("here").unwrap();
        assert!(
            capture.text().contains(&format!("./src/app/logger.rs:{line}")),
            "got {}",
            capture.text()
        );
    }

    #[test]
    fn test_details_block_follows_message() {
        let (logger, capture) = console_only(Level::Debug);
        logger
            .critical_with("System failure", LogOptions::new().details(json!({"code": 42})))
            .unwrap();
        let text = capture.text();
        assert!(text.contains("CRITICAL"));
        assert!(text.contains(": \x1b[37mSystem failure\n"));
        assert!(text.contains("\n  \"code\": 42\n"));
    }

    #[test]
    fn test_console_failure_propagates_and_releases_lock() {
        let config = LoggerConfig {
            log_to_file: false,
            ..LoggerConfig::new("broken")
        };
        let logger = Logger::with_console(config, Broken).unwrap();
        let first = logger.error("a");
        assert!(matches!(
            first,
            Err(crate::PieLogError::Sink(SinkError::Write { sink: "console", .. }))
        ));
        // The lock was released: a second call fails the same way instead of
        // deadlocking.
        assert!(logger.error("b").is_err());
    }

    /// Counts `write` calls on the console.
    #[derive(Clone, Default)]
    struct Calls(Arc<Mutex<Vec<usize>>>);

    impl Write for Calls {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().push(buf.len());
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_console_write_per_record() {
        let calls = Calls::default();
        let config = LoggerConfig {
            log_to_file: false,
            ..LoggerConfig::new("single")
        };
        let logger = Logger::with_console(config, calls.clone()).unwrap();
        logger
            .info_with("hello", LogOptions::new().details(json!({"k": 1})))
            .unwrap();

        let sizes = calls.0.lock().unwrap().clone();
        assert_eq!(sizes.len(), 1, "write sizes: {sizes:?}");
    }

    #[test]
    fn test_file_still_written_when_console_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfig {
            log_directory: dir.path().to_path_buf(),
            ..LoggerConfig::new("split")
        };
        let logger = Logger::with_console(config, Broken).unwrap();

        let result = logger.error("must reach file");
        assert!(matches!(
            result,
            Err(crate::PieLogError::Sink(SinkError::Write { sink: "console", .. }))
        ));

        let file = std::fs::read_to_string(logger.log_file_path().unwrap()).unwrap();
        assert_eq!(file.lines().count(), 1);
        assert!(file.trim_end().ends_with(": must reach file"), "file: {file:?}");
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = LoggerConfig {
            timezone: Some("Nowhere/Special".to_string()),
            log_to_file: false,
            ..LoggerConfig::new("tz")
        };
        assert!(Logger::with_console(config, Capture::default()).is_err());
    }
}
