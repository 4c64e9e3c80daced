// PieLog - lib.rs
//
// Library entry point. The common types are re-exported at the crate root
// so callers rarely need the module paths.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

pub use crate::app::logger::Logger;
pub use crate::app::tracer::{ExecutionOptions, ExecutionTracer, Traced, TracedFallible};
pub use crate::core::callsite::CallSite;
pub use crate::core::color::Palette;
pub use crate::core::level::Level;
pub use crate::core::record::{Layout, LogOptions};
pub use crate::platform::config::{load_config, LoggerConfig};
pub use crate::util::error::{ConfigError, PieLogError, Result, SinkError};

/// Colour token used by `Palette`.
pub use colored::Color;
