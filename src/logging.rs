use std::path::Path;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::error::App;

/// File logger for the listener. Warnings and errors are also echoed to
/// stderr. Keep the returned handle alive for as long as logs are written.
pub fn init_file_logger(level: &str, log_dir: &Path) -> Result<LoggerHandle, App> {
    let handle = Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().directory(log_dir))
        .rotate(
            Criterion::Size(1_000_000),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(3),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .start()?;
    Ok(handle)
}

/// Stderr logger for the CLI; silent when `quiet`.
pub fn init_cli_logger(quiet: bool) -> Result<LoggerHandle, App> {
    let level = if quiet { "off" } else { "warn" };
    let handle = Logger::try_with_str(level)?.log_to_stderr().start()?;
    Ok(handle)
}
