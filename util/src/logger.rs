//! Logging to the terminal and the session log file

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Threads which step faster than the control loop, never logged below
/// `Debug`.
const FAST_RATE_MODULES: [&str; 2] = ["drive_lib::sim", "drive_lib::nav_bridge::pursuit"];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Minimum log level must be at least as verbose as INFO, got {0}")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Could not install the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Start logging to stdout and the session's log file.
///
/// Call once per process, a second call returns `FernInitError`.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    check_min_level(min_level)?;

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    FAST_RATE_MODULES
        .iter()
        .fold(
            fern::Dispatch::new().format(format_record).level(min_level),
            |d, module| d.level_for(*module, fast_rate_level(min_level))
        )
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging started at {:?}", min_level);
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Info must always be logged.
fn check_min_level(min_level: LevelFilter) -> Result<(), LoggerInitError> {
    match min_level < Level::Info {
        true => Err(LoggerInitError::InvalidMinLogLevel(min_level)),
        false => Ok(())
    }
}

fn fast_rate_level(min_level: LevelFilter) -> LevelFilter {
    min_level.min(LevelFilter::Debug)
}

/// Debug and trace lines carry the module path so cycle output can be
/// filtered by module.
fn format_record(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record
) {
    let level = record.level();
    let elapsed_s = session::get_elapsed_seconds();

    match level > Level::Info {
        true => out.finish(format_args!(
            "[{:10.6} {}] {}: {}", elapsed_s, level_tag(level), record.target(), message
        )),
        false => out.finish(format_args!(
            "[{:10.6} {}] {}", elapsed_s, level_tag(level), message
        ))
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_min_level() {
        assert!(check_min_level(LevelFilter::Info).is_ok());
        assert!(check_min_level(LevelFilter::Trace).is_ok());
        assert!(matches!(
            check_min_level(LevelFilter::Warn),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
        assert!(check_min_level(LevelFilter::Off).is_err());
    }

    #[test]
    fn test_fast_rate_capped_at_debug() {
        assert_eq!(fast_rate_level(LevelFilter::Trace), LevelFilter::Debug);
        assert_eq!(fast_rate_level(LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(fast_rate_level(LevelFilter::Info), LevelFilter::Info);
    }
}
