// PieLog - main.rs
//
// Demo binary. Handles:
// 1. CLI argument parsing
// 2. Diagnostics initialisation (debug mode support)
// 3. Logger construction from a config file and/or CLI overrides
// 4. A tour of every logging feature: levels, details, failures,
//    execution tracing, and per-call colour overrides

use clap::Parser;
use pielog::util;
use pielog::{ExecutionOptions, Level, LogOptions, Logger, LoggerConfig};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// PieLog demo - prints one record per feature to the console and the
/// rotating log file.
#[derive(Parser, Debug)]
#[command(name = "pielog-demo", version, about)]
struct Cli {
    /// Logger config file (TOML). CLI flags override its values.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Minimum level: debug, info, warning, error, critical (default debug).
    #[arg(short = 'l', long = "min-level")]
    min_level: Option<Level>,

    /// Disable colours (individual records still force them back on).
    #[arg(long = "no-color")]
    no_color: bool,

    /// Console only; do not create a log file.
    #[arg(long = "no-file")]
    no_file: bool,

    /// Parent directory for per-run log directories.
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// IANA timezone for timestamps (default UTC).
    #[arg(short = 't', long = "timezone")]
    timezone: Option<String>,

    /// Enable PieLog's own diagnostics (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Sample payload type with a custom textual form.
#[derive(Debug, Serialize)]
struct Sample {
    name: String,
    value: usize,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample(name={}, value={})", self.name, self.value)
    }
}

#[derive(Debug)]
struct DivisionError {
    dividend: i64,
}

impl fmt::Display for DivisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot divide {} by zero", self.dividend)
    }
}

impl std::error::Error for DivisionError {}

fn divide(dividend: i64, divisor: i64) -> Result<i64, DivisionError> {
    if divisor == 0 {
        return Err(DivisionError { dividend });
    }
    Ok(dividend / divisor)
}

fn build_config(cli: &Cli) -> pielog::Result<LoggerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let (config, warnings) = pielog::load_config(path)?;
            for warning in &warnings {
                eprintln!("Config warning: {warning}");
            }
            config
        }
        None => LoggerConfig {
            min_level: Level::Debug,
            ..LoggerConfig::new("DemoLogger")
        },
    };

    if let Some(level) = cli.min_level {
        config.min_level = level;
    }
    if cli.no_color {
        config.colorful = false;
    }
    if cli.no_file {
        config.log_to_file = false;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_directory = dir.clone();
    }
    if cli.timezone.is_some() {
        config.timezone = cli.timezone.clone();
    }
    Ok(config)
}

fn run(logger: &Logger) -> pielog::Result<()> {
    logger.debug_with(
        "This is a debug message",
        LogOptions::new().details(json!({"key": "debug_value"})),
    )?;
    logger.info_with(
        "This is an info message",
        LogOptions::new().details(json!({"user_id": 12345})),
    )?;
    logger.warning_with(
        "This is a warning message",
        LogOptions::new().details(json!({"warning_code": "W001"})),
    )?;

    if let Err(e) = divide(1, 0) {
        logger.error_with(
            "An error occurred during division",
            LogOptions::new()
                .details(json!({"operation": "1/0", "error_type": "DivisionError"}))
                .failure(&e),
        )?;
    }

    logger.critical_with(
        "This is a critical message",
        LogOptions::new().details(json!({"critical_event": "System failure simulation"})),
    )?;

    let sample = Sample {
        name: "test".to_string(),
        value: 42,
    };
    let set: HashSet<u8> = [4, 5, 6].into_iter().collect();
    logger.info_with(
        "Logging complex nested details",
        LogOptions::new().details(json!({
            "nested_dict": {
                "list": [1, 2, 3],
                "dict_in_dict": {"a": 1, "b": 2},
                "set": set,
            },
            "object": sample.to_string(),
            "serialised_object": sample,
        })),
    )?;

    let process = logger
        .log_execution(ExecutionOptions {
            start_message: Some("Starting complex data processing".to_string()),
            end_message: Some("Data processing completed".to_string()),
            print_args_at_start: true,
            print_result_at_end: true,
            ..Default::default()
        })
        .wrap("process_complex_data", |data: Vec<i64>| {
            let mut summary = BTreeMap::new();
            summary.insert("original_length", data.len() as i64);
            summary.insert("sum", data.iter().sum());
            summary.insert("max", data.iter().copied().max().unwrap_or_default());
            summary.insert("min", data.iter().copied().min().unwrap_or_default());
            summary
        });
    let _summary = process.call(vec![17, 4, 93, 58, 21, 66, 2, 80, 35, 49]);

    logger.debug_with("Colored debug message", LogOptions::new().colorful(true))?;
    logger.info_with("Black and white info message", LogOptions::new().colorful(false))?;
    logger.warning_with(
        "Colorful warning even if global color is off",
        LogOptions::new().colorful(true),
    )?;

    logger.flush()
}

fn main() {
    let cli = Cli::parse();

    util::logging::init(cli.debug, None);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "PieLog demo starting"
    );

    let logger = match build_config(&cli).and_then(Logger::new) {
        Ok(logger) => logger,
        Err(e) => {
            tracing::error!(error = %e, "Failed to construct logger");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = logger.log_file_path() {
        tracing::info!(path = %path.display(), "Writing log file");
    }

    if let Err(e) = run(&logger) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
