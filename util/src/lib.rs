//! Shared utilities for the swerve drive executables
//!
//! Sessions, logging, parameter files, command scripts and the angle maths
//! used by the control modules.

pub mod host;
#[macro_use]
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod script_interpreter;
pub mod time;

pub use comms_if;

/// Log an error and panic.
///
/// Only for faults the control loop cannot continue from, such as repeated
/// cycle overruns. Everything else returns a `Result`.
#[macro_export]
macro_rules! raise_error {
    () => ({
        log::error!("Unrecoverable error raised");
        std::panic!("Unrecoverable error");
    });
    ($msg:expr) => ({
        log::error!("{}", $msg);
        std::panic!("Unrecoverable error: {}", $msg);
    });
    ($fmt:expr, $($arg:tt)+) => ({
        let msg = std::format!($fmt, $($arg)+);
        log::error!("{}", msg);
        std::panic!("Unrecoverable error: {}", msg);
    });
}
