/*!
 * Console and file logging.
 *
 * Every record goes to stderr with color and to the run's log file as a plain
 * `timestamp - LEVEL - message` line. The file is opened in append mode so a
 * resumed run extends the same log.
 */

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

// @struct: Logger writing to stderr and an optional file
pub struct CustomLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl CustomLogger {
    // @creates: New logger with specified level
    pub fn new(level: LevelFilter, file: Option<File>) -> Self {
        CustomLogger {
            level,
            file: file.map(Mutex::new),
        }
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Plain line as written to the log file
    pub fn format_file_line(timestamp: &str, level: Level, message: &str) -> String {
        format!("{} - {} - {}", timestamp, level, message)
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let message = record.args().to_string();

        let _ = writeln!(
            std::io::stderr(),
            "{}{} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now.format("%H:%M:%S.%3f"),
            message
        );

        if let Some(file) = &self.file {
            let line = Self::format_file_line(
                &now.format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
                record.level(),
                &message,
            );
            let _ = writeln!(file.lock(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

// @initializes: Global logger
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?,
        ),
        None => None,
    };

    log::set_boxed_logger(Box::new(CustomLogger::new(level, file)))
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
    log::set_max_level(level);
    Ok(())
}
