use super::sink::{Level, LogSink};
use crate::utils::misc::current_datetime_rfc3339;
use chrono::Local;
use colored::*;
use glob::glob;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
/// # Logger Local Options
///
/// Configuration options for the `LoggerLocal` instance, controlling where
/// log messages are output.
pub struct LoggerLocalOptions {
    /// The log levels that should be printed to the TTY (console).
    pub use_tty: Option<Vec<Level>>,
    /// The log levels that should be written to a log file.
    pub use_file: Option<Vec<Level>>,
    /// The directory where log files should be stored. If `None`, defaults
    /// to the current working directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggerLocalOptions {
    /// Default options: every level to the TTY, no log file.
    fn default() -> Self {
        Self {
            use_tty: Some(vec![
                Level::Debug,
                Level::Info,
                Level::Success,
                Level::Warning,
                Level::Error,
            ]),
            use_file: None,
            log_dir: None,
        }
    }
}

/// Local implementation of the [`LogSink`] capability: colored console
/// output plus an optional append-only log file.
pub struct LoggerLocal {
    /// The name of the application associated with this logger instance.
    app_name: String,
    /// Configuration options determining logging behavior.
    options: LoggerLocalOptions,
    /// The path to the currently active log file, if file logging is enabled.
    current_log_file: Option<PathBuf>,
}

impl LoggerLocal {
    /// Rotates log files for a given application and log directory.
    ///
    /// Keeps only the most recent log file (based on the timestamp in the
    /// filename) and deletes older log files for the application.
    fn rotate_logs(app_name: &str, log_dir: &Path) {
        let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
        let mut log_files: Vec<PathBuf> = Vec::new();

        if let Ok(entries) = glob(&pattern) {
            for entry in entries.flatten() {
                log_files.push(entry);
            }
        }

        // Newest first by filename timestamp.
        log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        if log_files.len() > 1 {
            for old_file in log_files.iter().skip(1) {
                if let Err(e) = std::fs::remove_file(old_file) {
                    eprintln!("Error deleting old log file {}: {}", old_file.display(), e);
                }
            }
        }
    }

    /// Creates a new `LoggerLocal` instance.
    ///
    /// If file logging is enabled, ensures the log directory exists, rotates
    /// old logs, and sets up the current log file path.
    ///
    /// # Arguments
    /// * `app_name` - The name of the application using this logger.
    /// * `options` - Optional `LoggerLocalOptions` to customize behavior.
    ///   If `None`, default options are used (TTY only, all levels).
    pub fn new(app_name: String, options: Option<LoggerLocalOptions>) -> Self {
        let opts = options.unwrap_or_default();

        let mut logger = Self {
            app_name: app_name.clone(),
            options: opts,
            current_log_file: None,
        };

        if logger.options.use_file.is_some() {
            let log_base_dir = logger
                .options
                .log_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));

            if let Err(e) = std::fs::create_dir_all(&log_base_dir) {
                eprintln!("Error creating log directory {}: {}", log_base_dir.display(), e);
            }

            LoggerLocal::rotate_logs(&app_name, &log_base_dir);

            let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
            let current_log_filename = format!("{}-{}.log", app_name, timestamp);
            logger.current_log_file = Some(log_base_dir.join(current_log_filename));
        }

        logger
    }

    /// Colors a message for console output according to its level.
    fn colorize(level: Level, message: &str) -> ColoredString {
        match level {
            Level::Error => message.bright_red(),
            Level::Warning => message.bright_yellow(),
            Level::Success => message.bright_green(),
            Level::Info => message.green(),
            Level::Debug => message.bright_cyan(),
        }
    }
}

impl LogSink for LoggerLocal {
    fn record(&self, level: Level, message: &str) {
        let ts = current_datetime_rfc3339();

        if let Some(tty_levels) = &self.options.use_tty {
            if tty_levels.contains(&level) {
                let prefix = format!("{} [{}]", ts, self.app_name).truecolor(128, 128, 128);
                let body = format!("[{}] {}", level.label(), message);
                println!("{} {}", prefix, Self::colorize(level, &body));
            }
        }

        if let Some(file_levels) = &self.options.use_file {
            if file_levels.contains(&level) {
                if let Some(log_file_path) = &self.current_log_file {
                    let formatted = format!("{} [{}] [{}] {}\n", ts, self.app_name, level.label(), message);
                    let _ = OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(log_file_path)
                        .and_then(|mut file| write!(file, "{}", formatted));
                }
            }
        }
    }
}
