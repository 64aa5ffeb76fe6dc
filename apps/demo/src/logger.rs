//! Process logging: colored stdout plus a plain log file per role.

use crate::error::DemoError;

use common::ErrorLocation;

use std::fs::File;
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

/// Install the global logger writing to stdout and `{log_dir}/{file_name}`.
///
/// Safe to call more than once; later calls log a warning and return Ok.
/// The log file is opened before that check, so an unusable directory is
/// reported on every call.
///
/// # Errors
///
/// Returns [`DemoError::Demo`] if the log file cannot be created or the
/// global logger cannot be installed.
#[track_caller]
pub fn initialize(log_dir: &Path, file_name: &str, level: LevelFilter) -> Result<(), DemoError> {
    let log_file = fern::log_file(log_dir.join(file_name)).map_err(|e| DemoError::Demo {
        message: format!("Failed to create log file in {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());
    INIT_LOGGER_ONCE.call_once(|| {
        result = apply(log_file, level);
        if result.is_ok() {
            info!("Logger initialized with level: {level}");
        }
    });
    result
}

#[track_caller]
fn apply(log_file: File, level: LevelFilter) -> Result<(), DemoError> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                target = record.target(),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(log_file);

    Dispatch::new()
        .level(level)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| DemoError::Demo {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
