// PieLog - app/tracer.rs
//
// Execution tracing: wrap a function so each invocation logs a start
// record, runs the function, and logs an end record.
//
// Failure semantics are plain sequential wrapping: a panic in the target
// unwinds straight through the wrapper, and `TracedFallible::call` returns
// an `Err` unchanged. Either way no end record is written.
//
// Trace records are attributed to the code that invokes the traced
// function. Closures cannot carry `#[track_caller]`, so wrapped functions
// are values with a `#[track_caller] call` method rather than `impl Fn`.

use crate::app::logger::Logger;
use crate::core::level::Level;
use crate::core::record::LogOptions;
use serde_json::json;
use std::fmt::{self, Debug};
use std::panic::Location;

/// What the start and end records look like.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Start message (default: `Start of <name>`).
    pub start_message: Option<String>,
    /// End message (default: `End of <name>`).
    pub end_message: Option<String>,
    /// Attach `{"function", "args"}` details to the start record.
    pub print_args_at_start: bool,
    /// Attach `{"function", "result"}` details to the end record.
    pub print_result_at_end: bool,
    pub start_level: Level,
    pub end_level: Level,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            start_message: None,
            end_message: None,
            print_args_at_start: false,
            print_result_at_end: false,
            start_level: Level::Info,
            end_level: Level::Info,
        }
    }
}

/// Builder returned by `Logger::log_execution`.
#[derive(Debug, Clone)]
pub struct ExecutionTracer {
    logger: Logger,
    options: ExecutionOptions,
}

impl Logger {
    /// Start building an execution tracer.
    ///
    /// ```no_run
    /// use pielog::{ExecutionOptions, Logger, LoggerConfig};
    ///
    /// let logger = Logger::new(LoggerConfig::new("jobs"))?;
    /// let sum = logger
    ///     .log_execution(ExecutionOptions {
    ///         print_args_at_start: true,
    ///         print_result_at_end: true,
    ///         ..Default::default()
    ///     })
    ///     .wrap("sum", |values: Vec<u32>| values.iter().sum::<u32>());
    ///
    /// assert_eq!(sum.call(vec![1, 2, 3]), 6);
    /// # Ok::<(), pielog::PieLogError>(())
    /// ```
    pub fn log_execution(&self, options: ExecutionOptions) -> ExecutionTracer {
        ExecutionTracer {
            logger: self.clone(),
            options,
        }
    }
}

impl ExecutionTracer {
    /// Wrap `f`. Several arguments are passed as a tuple.
    pub fn wrap<A, R, F>(self, name: impl Into<String>, f: F) -> Traced<F>
    where
        F: Fn(A) -> R,
    {
        Traced {
            tracer: self,
            name: name.into(),
            f,
        }
    }

    /// Wrap a fallible `f`. An `Err` skips the end record and is returned
    /// unchanged.
    pub fn wrap_fallible<A, T, E, F>(self, name: impl Into<String>, f: F) -> TracedFallible<F>
    where
        F: Fn(A) -> Result<T, E>,
    {
        TracedFallible {
            tracer: self,
            name: name.into(),
            f,
        }
    }

    /// Trace a single invocation of `f` with `args`.
    #[track_caller]
    pub fn run<A, R, F>(&self, name: &str, args: A, f: F) -> R
    where
        A: Debug,
        R: Debug,
        F: FnOnce(A) -> R,
    {
        let location = Location::caller();
        self.start(location, name, &args);
        let result = f(args);
        self.end(location, name, &result);
        result
    }

    fn start(&self, location: &'static Location<'static>, name: &str, args: &dyn Debug) {
        let message = self
            .options
            .start_message
            .clone()
            .unwrap_or_else(|| format!("Start of {name}"));
        let mut options = LogOptions::new();
        if self.options.print_args_at_start {
            options = options.details(json!({
                "function": name,
                "args": format!("{args:?}"),
            }));
        }
        self.write(location, self.options.start_level, &message, options, name);
    }

    fn end(&self, location: &'static Location<'static>, name: &str, result: &dyn Debug) {
        let message = self
            .options
            .end_message
            .clone()
            .unwrap_or_else(|| format!("End of {name}"));
        let mut options = LogOptions::new();
        if self.options.print_result_at_end {
            options = options.details(json!({
                "function": name,
                "result": format!("{result:?}"),
            }));
        }
        self.write(location, self.options.end_level, &message, options, name);
    }

    /// Sink failures must not change what the traced function returns, so
    /// they are reported as diagnostics instead.
    fn write(
        &self,
        location: &'static Location<'static>,
        level: Level,
        message: &str,
        options: LogOptions<'_>,
        function: &str,
    ) {
        if let Err(e) = self.logger.emit(location, level, message, &options) {
            tracing::warn!(
                logger = %self.logger.name(),
                function,
                error = %e,
                "Execution trace record could not be written"
            );
        }
    }
}

/// A function wrapped by `ExecutionTracer::wrap`.
pub struct Traced<F> {
    tracer: ExecutionTracer,
    name: String,
    f: F,
}

impl<F> Traced<F> {
    /// Invoke the wrapped function, logging start and end records
    /// attributed to this call.
    #[track_caller]
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
        A: Debug,
        R: Debug,
    {
        let location = Location::caller();
        self.tracer.start(location, &self.name, &args);
        let result = (self.f)(args);
        self.tracer.end(location, &self.name, &result);
        result
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A fallible function wrapped by `ExecutionTracer::wrap_fallible`.
pub struct TracedFallible<F> {
    tracer: ExecutionTracer,
    name: String,
    f: F,
}

impl<F> TracedFallible<F> {
    /// Invoke the wrapped function. The end record is written only for `Ok`.
    #[track_caller]
    pub fn call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        A: Debug,
        T: Debug,
    {
        let location = Location::caller();
        self.tracer.start(location, &self.name, &args);
        let value = (self.f)(args)?;
        self.tracer.end(location, &self.name, &value);
        Ok(value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for Traced<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> fmt::Debug for TracedFallible<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedFallible")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::config::LoggerConfig;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

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

    fn logger() -> (Logger, Capture) {
        let capture = Capture::default();
        let config = LoggerConfig {
            min_level: Level::Debug,
            log_to_file: false,
            ..LoggerConfig::new("tracer")
        };
        (Logger::with_console(config, capture.clone()).unwrap(), capture)
    }

    #[test]
    fn test_default_messages_and_details() {
        let (logger, capture) = logger();
        let double = logger
            .log_execution(ExecutionOptions {
                print_args_at_start: true,
                print_result_at_end: true,
                end_level: Level::Debug,
                ..Default::default()
            })
            .wrap("double", |x: i32| x * 2);

        assert_eq!(double.call(21), 42);

        let text = capture.text();
        assert!(text.contains("Start of double"));
        assert!(text.contains("\"args\": \"21\""));
        assert!(text.contains("End of double"));
        assert!(text.contains("\"result\": \"42\""));
        assert!(text.contains("DEBUG"));
    }

    #[test]
    fn test_custom_messages_without_details() {
        let (logger, capture) = logger();
        let tracer = logger.log_execution(ExecutionOptions {
            start_message: Some("Loading".to_string()),
            end_message: Some("Loaded".to_string()),
            ..Default::default()
        });
        let len = tracer.run("load", "abc", |s: &str| s.len());

        assert_eq!(len, 3);
        let text = capture.text();
        assert!(text.contains(": \x1b[32mLoading"));
        assert!(text.contains(": \x1b[32mLoaded"));
        assert!(!text.contains("function"));
    }

    #[test]
    fn test_err_skips_end_record() {
        let (logger, capture) = logger();
        let parse = logger
            .log_execution(ExecutionOptions::default())
            .wrap_fallible("parse", |s: &str| s.parse::<u8>());

        assert!(parse.call("300").is_err());
        assert_eq!(parse.call("7"), Ok(7));

        let text = capture.text();
        assert_eq!(text.matches("Start of parse").count(), 2);
        assert_eq!(text.matches("End of parse").count(), 1);
    }

    #[test]
    fn test_wrapped_records_point_at_invocation() {
        let (logger, capture) = logger();
        let noop = logger.log_execution(ExecutionOptions::default()).wrap("noop", |_: ()| ());
        let line = line!() + 1;
        noop.call(());

        let text = capture.text();
        let site = format!("./src/app/tracer.rs:{line}");
        assert_eq!(text.matches(&site).count(), 2, "got {text}");
    }

    #[test]
    fn test_run_records_point_at_invocation() {
        let (logger, capture) = logger();
        let tracer = logger.log_execution(ExecutionOptions::default());
        let line = line!() + 1;
        let n = tracer.run("count", vec![1, 2], |v: Vec<i32>| v.len());

        assert_eq!(n, 2);
        let text = capture.text();
        assert_eq!(text.matches(&format!("./src/app/tracer.rs:{line}")).count(), 2, "got {text}");
    }

    #[test]
    fn test_each_invocation_has_its_own_site() {
        let (logger, capture) = logger();
        let parse = logger
            .log_execution(ExecutionOptions::default())
            .wrap_fallible("parse", |s: &str| s.parse::<u8>());
        let first = line!() + 1;
        parse.call("1").unwrap();
        let second = line!() + 1;
        parse.call("2").unwrap();

        let text = capture.text();
        assert_eq!(text.matches(&format!("tracer.rs:{first}")).count(), 2);
        assert_eq!(text.matches(&format!("tracer.rs:{second}")).count(), 2);
    }
}
