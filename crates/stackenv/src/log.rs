// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Per-run record of diagnostics.
//!
//! Every message is also forwarded to `tracing`; the [`RunLog`] keeps its
//! own copy so a caller can check for failures after a non-strict run and
//! so the run can be written to a log file.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./log_test.rs"]
mod log_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Failure,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Failure => "FAILURE",
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.level,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}

/// Diagnostics collected during one run.
///
/// Interior mutability lets hooks and callbacks log through a shared
/// `&Context`.
#[derive(Debug, Default)]
pub struct RunLog {
    records: RefCell<Vec<LogRecord>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{message}");
        self.push(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.push(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.push(LogLevel::Warning, message);
    }

    pub fn failure(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.push(LogLevel::Failure, message);
    }

    fn push(&self, level: LogLevel, message: String) {
        self.records.borrow_mut().push(LogRecord {
            level,
            timestamp: Local::now(),
            message,
        });
    }

    pub fn has_failure(&self) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|r| r.level == LogLevel::Failure)
    }

    pub fn last_failure(&self) -> Option<String> {
        self.records
            .borrow()
            .iter()
            .rev()
            .find(|r| r.level == LogLevel::Failure)
            .map(|r| r.message.clone())
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warning)
    }

    pub fn failures(&self) -> Vec<String> {
        self.messages(LogLevel::Failure)
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Write every record at `min_level` or above to `path`, one per line.
    pub fn write_to(&self, path: &Path, min_level: LogLevel) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| Error::WriteFailed {
                path: parent.to_path_buf(),
                error,
            })?;
        }
        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(path)?;
            for record in self.records.borrow().iter() {
                if record.level >= min_level {
                    writeln!(file, "{record}")?;
                }
            }
            Ok(())
        };
        write().map_err(|error| Error::WriteFailed {
            path: path.to_path_buf(),
            error,
        })
    }
}
