// PieLog - core/color.rs
//
// Colour resolution policy and ANSI escape rendering.
//
// The per-call override always wins over the global flag. When the
// resolved colourfulness is off every field uses the fallback colour, so a
// monochrome line still carries (uniform) escape codes and a trailing reset.

use crate::core::level::Level;
use crate::util::error::ConfigError;
use colored::Color;

/// Terminal reset code appended to every console record.
pub const RESET: &str = "\x1b[0m";

/// Effective colour of one field.
///
/// `color` is the level colour or a field-specific colour (timestamp,
/// call-site, details). `per_call` is the caller's tri-state override.
pub fn resolve(color: Color, global_colorful: bool, per_call: Option<bool>, fallback: Color) -> Color {
    if per_call.unwrap_or(global_colorful) {
        color
    } else {
        fallback
    }
}

/// SGR escape sequence selecting `color` as the foreground.
pub fn ansi_prefix(color: Color) -> String {
    format!("\x1b[{}m", color.to_fg_str())
}

/// Remove SGR escape sequences, leaving the plain text a file sink would
/// receive.
pub fn strip_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a colour name such as `"red"`, `"bright white"` or `"bright_white"`.
pub fn parse_color(name: &str) -> Result<Color, ConfigError> {
    let normalised = name.trim().replace(['_', '-'], " ");
    normalised
        .parse::<Color>()
        .map_err(|_| ConfigError::UnknownColor {
            value: name.to_string(),
        })
}

/// Configured colour for each level plus the field colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub debug: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
    pub critical: Color,
    pub timestamp: Color,
    pub call_site: Color,
    pub details: Color,
    /// Used for every field when colourful output is off.
    pub fallback: Color,
}

impl Palette {
    /// Colour configured for `level`.
    pub fn for_level(&self, level: Level) -> Color {
        match level {
            Level::Debug => self.debug,
            Level::Info => self.info,
            Level::Warning => self.warning,
            Level::Error => self.error,
            Level::Critical => self.critical,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            debug: Color::Cyan,
            info: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            critical: Color::Magenta,
            timestamp: Color::White,
            call_site: Color::White,
            details: Color::BrightWhite,
            fallback: Color::White,
        }
    }
}
