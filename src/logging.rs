/// Structured logging for the bulletin archiver.
///
/// Context-rich progress logging tagged with the pipeline stage that
/// produced it, with optional file-based output for long unattended walks.
/// A ten-year walk is ~3600 page renders; the per-day lines are the only
/// way to locate where a halted run got to.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Which part of the pipeline a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Browser navigation and form driving.
    Portal,
    /// Table geometry reading and column linking.
    Extract,
    /// CSV destination management.
    Archive,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Portal => write!(f, "PORTAL"),
            Stage::Extract => write!(f, "EXTRACT"),
            Stage::Archive => write!(f, "ARCHIVE"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    min_level: LogLevel,
    log_file: Option<String>,
}

impl Logger {
    fn log(&self, level: LogLevel, stage: Stage, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let entry = format!(
            "{} {} {}{}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            level,
            stage,
            context_part,
            message
        );

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
            _ => println!("{}", entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public logging functions
// ---------------------------------------------------------------------------

/// Initialize the global logger.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    *LOGGER.lock().unwrap() = Some(Logger {
        min_level,
        log_file: log_file.map(String::from),
    });
}

pub fn info(stage: Stage, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, stage, context, message);
    }
}

pub fn warn(stage: Stage, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, stage, context, message);
    }
}

pub fn error(stage: Stage, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, stage, context, message);
    }
}

pub fn debug(stage: Stage, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, stage, context, message);
    }
}

// ---------------------------------------------------------------------------
// Walk summary logging
// ---------------------------------------------------------------------------

/// Log the end-of-walk summary line. A high missing ratio flags suspicious
/// gaps in the portal's archive; it never triggers retries.
pub fn log_walk_summary(total_readings: usize, missing_days: usize, missing_ratio: f64) {
    let message = format!(
        "walk complete: {} readings archived, {} days without data ({:.1}% missing)",
        total_readings,
        missing_days,
        missing_ratio * 100.0
    );

    if missing_days == 0 {
        info(Stage::System, None, &message);
    } else {
        warn(Stage::System, None, &message);
    }
}
