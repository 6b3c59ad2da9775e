//! Logger bootstrap.
//!
//! Logs go to stderr unless `[log] dir` is configured, in which case they go
//! to size-rotated files there and warnings are still echoed to stderr.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

use crate::model::config::LogConfig;

const LOG_FILE_BASENAME: &str = "tdl";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Start the logger. The returned handle must be kept alive for the life of
/// the process; dropping it flushes and stops file logging.
pub fn init(config: &LogConfig) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(&config.level)?;
    let logger = match &config.dir {
        Some(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .append()
            .duplicate_to_stderr(Duplicate::Warn)
            .format_for_files(flexi_logger::detailed_format),
        None => logger.log_to_stderr(),
    };
    logger.format_for_stderr(flexi_logger::default_format).start()
}
