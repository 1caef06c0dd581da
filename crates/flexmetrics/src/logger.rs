//! The logging capability used for the server's lifecycle lines.
//!
//! The server only needs one thing from a logger: the ability to print a
//! formatted line. [`Logger`] captures exactly that, so hosts can plug in
//! whatever they already use. Closures taking [`fmt::Arguments`] are loggers,
//! and so is [`TracingLogger`], which forwards lines to `tracing`.
//!
//! When no logger is configured the server uses [`default_logger`], which
//! writes to standard error with the `flexmetrics: ` prefix.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// Prefix used by the default standard-error logger.
pub const DEFAULT_PREFIX: &str = "flexmetrics: ";

/// Anything able to print a formatted log line.
pub trait Logger: Send + Sync {
    /// Prints one log line built from `args`.
    fn log(&self, args: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log(&self, args: fmt::Arguments<'_>) {
        self(args);
    }
}

/// Writes prefixed lines to any [`Write`] implementation.
///
/// # Example
///
/// ```rust
/// use flexmetrics::logger::{Logger, WriterLogger};
///
/// let logger = WriterLogger::new(Vec::new(), "TEST: ");
/// logger.log(format_args!("hello {}", 42));
/// assert_eq!(logger.into_inner(), b"TEST: hello 42\n");
/// ```
#[derive(Debug)]
pub struct WriterLogger<W> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write> WriterLogger<W> {
    /// Creates a logger writing to `writer`, prefixing every line.
    pub fn new(writer: W, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the line prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Consumes the logger and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Logger for WriterLogger<W> {
    fn log(&self, args: fmt::Arguments<'_>) {
        let line = format!("{}{}\n", self.prefix, args);
        let mut writer = self.writer.lock();
        // A logger has nowhere to report its own failures.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

/// Writes lines to standard error with a fixed prefix.
#[derive(Debug, Clone)]
pub struct StderrLogger {
    prefix: String,
}

impl StderrLogger {
    /// Creates a standard-error logger with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Logger for StderrLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}{}", self.prefix, args);
    }
}

/// Forwards lines to `tracing` as info-level events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "flexmetrics", "{}", args);
    }
}

/// Returns the process-wide fallback logger.
pub fn default_logger() -> Arc<dyn Logger> {
    static DEFAULT: OnceLock<Arc<dyn Logger>> = OnceLock::new();
    Arc::clone(DEFAULT.get_or_init(|| Arc::new(StderrLogger::default())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_logger_prefixes_lines() {
        let logger = WriterLogger::new(Vec::new(), "TEST_LOGGER: ");
        logger.log(format_args!("first"));
        logger.log(format_args!("second {}", 2));

        let output = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(output, "TEST_LOGGER: first\nTEST_LOGGER: second 2\n");
    }

    #[test]
    fn test_closure_logger() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = move |args: fmt::Arguments<'_>| sink.lock().push(args.to_string());

        logger.log(format_args!("serving on {}", "127.0.0.1:9090"));

        assert_eq!(lines.lock().as_slice(), ["serving on 127.0.0.1:9090"]);
    }

    #[test]
    fn test_default_logger_is_shared() {
        let a = default_logger();
        let b = default_logger();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_stderr_logger_default_prefix() {
        let logger = StderrLogger::default();
        assert_eq!(logger.prefix, DEFAULT_PREFIX);
        logger.log(format_args!("does not panic"));
    }
}
