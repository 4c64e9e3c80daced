// PieLog - core/record.rs
//
// Log event model and record rendering.
//
// A record is built once per accepted event: the timestamp, call-site,
// details text and failure text are computed a single time and shared by
// the console and file renderings, which differ only in colour codes.
//
// Layout (fields left-justified to their configured widths):
//   <timestamp> <LEVEL> <call-site> : <message>
//   <details as indented JSON>          (optional)
//   <failure trace>                     (optional)

use crate::core::callsite::CallSite;
use crate::core::color::{self, Palette, RESET};
use crate::core::level::Level;
use crate::util::constants::{
    DEFAULT_CALL_SITE_PADDING, DEFAULT_DETAILS_INDENT, DEFAULT_LEVEL_PADDING,
    DEFAULT_TIMESTAMP_PADDING, RECORD_TIMESTAMP_FORMAT,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::{self, Write as _};

// =============================================================================
// Log event options
// =============================================================================

/// Optional parts of a log event: structured details, failure context, and
/// the per-call colour override.
///
/// ```
/// use pielog::LogOptions;
/// use serde_json::json;
///
/// let opts = LogOptions::new().details(json!({"code": 42})).colorful(false);
/// assert_eq!(opts.colorful, Some(false));
/// ```
#[derive(Debug, Default)]
pub struct LogOptions<'a> {
    /// Structured payload rendered as indented JSON below the message.
    pub details: Option<Value>,

    /// Failure whose message and `source()` chain are appended as a trace.
    pub failure: Option<&'a dyn std::error::Error>,

    /// Capture the stack of the logging call and append it to the trace.
    pub backtrace: bool,

    /// `Some(true)` / `Some(false)` force colour on or off for this call;
    /// `None` inherits the logger's setting.
    pub colorful: Option<bool>,
}

impl<'a> LogOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a JSON details payload.
    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach any serialisable value as details.
    ///
    /// If serialisation fails the value's `Debug` text is used instead, so
    /// the record is never dropped.
    pub fn details_of<T>(mut self, value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        let details = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Details not serialisable; using Debug text");
            Value::String(format!("{value:?}"))
        });
        self.details = Some(details);
        self
    }

    /// Attach a failure. Its display text and source chain are rendered.
    pub fn failure(mut self, error: &'a dyn std::error::Error) -> Self {
        self.failure = Some(error);
        self
    }

    /// Append a backtrace of the logging call to the record.
    pub fn backtrace(mut self) -> Self {
        self.backtrace = true;
        self
    }

    /// Override the logger's colour setting for this call only.
    pub fn colorful(mut self, colorful: bool) -> Self {
        self.colorful = Some(colorful);
        self
    }
}

// =============================================================================
// Record
// =============================================================================

/// A fully resolved log event, ready to render.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub timestamp: String,
    pub call_site: CallSite,
    /// Pretty-printed details payload.
    pub details: Option<String>,
    /// Failure chain and/or captured backtrace.
    pub trace: Option<String>,
}

// =============================================================================
// Formatter
// =============================================================================

/// Field widths and indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub timestamp_padding: usize,
    pub level_padding: usize,
    pub call_site_padding: usize,
    pub details_indent: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            timestamp_padding: DEFAULT_TIMESTAMP_PADDING,
            level_padding: DEFAULT_LEVEL_PADDING,
            call_site_padding: DEFAULT_CALL_SITE_PADDING,
            details_indent: DEFAULT_DETAILS_INDENT,
        }
    }
}

/// Renders records for the console and file sinks.
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    layout: Layout,
    palette: Palette,
    colorful: bool,
    timezone: Option<Tz>,
}

impl RecordFormatter {
    pub fn new(layout: Layout, palette: Palette, colorful: bool, timezone: Option<Tz>) -> Self {
        Self {
            layout,
            palette,
            colorful,
            timezone,
        }
    }

    /// Resolve everything that both renderings share.
    pub fn build<'m>(
        &self,
        level: Level,
        message: &'m str,
        call_site: CallSite,
        options: &LogOptions<'_>,
    ) -> Record<'m> {
        let backtrace = options.backtrace.then(Backtrace::force_capture);
        Record {
            level,
            message,
            timestamp: self.format_timestamp(Utc::now()),
            call_site,
            details: options.details.as_ref().and_then(|d| self.render_details(d)),
            trace: render_trace(options.failure, backtrace.as_ref()),
        }
    }

    /// Render for the console sink: every field wrapped in its resolved
    /// colour, one reset code at the very end.
    pub fn render_console(&self, record: &Record<'_>, colorful: Option<bool>) -> String {
        let p = &self.palette;
        let paint = |c| color::ansi_prefix(color::resolve(c, self.colorful, colorful, p.fallback));
        let timestamp_color = paint(p.timestamp);
        let level_color = paint(p.for_level(record.level));
        let call_site_color = paint(p.call_site);

        let mut line = self.header(
            record,
            [
                timestamp_color.as_str(),
                level_color.as_str(),
                call_site_color.as_str(),
                level_color.as_str(),
            ],
        );
        if let Some(details) = &record.details {
            let _ = write!(line, "\n{}{details}", paint(p.details));
        }
        if let Some(trace) = &record.trace {
            let _ = write!(line, "\n{level_color}{trace}");
        }
        line.push_str(RESET);
        line
    }

    /// Render for the file sink: same layout, no colour codes.
    pub fn render_file(&self, record: &Record<'_>) -> String {
        let mut line = self.header(record, [""; 4]);
        if let Some(details) = &record.details {
            let _ = write!(line, "\n{details}");
        }
        if let Some(trace) = &record.trace {
            let _ = write!(line, "\n{trace}");
        }
        line
    }

    /// `<timestamp> <LEVEL> <call-site> : <message>` with an optional
    /// prefix before each of the four fields.
    fn header(&self, record: &Record<'_>, prefixes: [&str; 4]) -> String {
        let Layout {
            timestamp_padding: tw,
            level_padding: lw,
            call_site_padding: cw,
            ..
        } = self.layout;
        format!(
            "{}{:<tw$} {}{:<lw$} {}{:<cw$} : {}{}",
            prefixes[0],
            record.timestamp,
            prefixes[1],
            record.level.name(),
            prefixes[2],
            record.call_site.to_string(),
            prefixes[3],
            record.message,
        )
    }

    /// Format `now` in the configured timezone with millisecond precision.
    pub fn format_timestamp(&self, now: DateTime<Utc>) -> String {
        match self.timezone {
            Some(tz) => now.with_timezone(&tz).format(RECORD_TIMESTAMP_FORMAT).to_string(),
            None => now.format(RECORD_TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Pretty-print details with the configured indent.
    ///
    /// `null` and empty containers count as "no details".
    pub fn render_details(&self, details: &Value) -> Option<String> {
        let empty = match details {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if empty {
            return None;
        }

        let indent = " ".repeat(self.layout.details_indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        match details.serialize(&mut serializer) {
            Ok(()) => Some(String::from_utf8_lossy(&buf).into_owned()),
            // A `Value` always serialises; keep the record regardless.
            Err(_) => Some(details.to_string()),
        }
    }
}

/// Failure chain followed by the captured backtrace, if any.
fn render_trace(
    failure: Option<&dyn std::error::Error>,
    backtrace: Option<&Backtrace>,
) -> Option<String> {
    let mut trace = String::new();

    if let Some(error) = failure {
        let _ = write!(trace, "Error: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = write!(trace, "\nCaused by: {cause}");
            source = cause.source();
        }
    }

    if let Some(bt) = backtrace.filter(|bt| bt.status() == BacktraceStatus::Captured) {
        if !trace.is_empty() {
            trace.push('\n');
        }
        let _ = write!(trace, "Stack backtrace:\n{bt}");
    }

    (!trace.is_empty()).then_some(trace)
}
