//! Append-only battery level history
//!
//! One line per valid report: `<unix seconds>|<level>|<DD/MM/YYYY HH:MM:SS>`.
//! The file is opened and closed on every write, so it can be rotated or
//! removed while the monitor runs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

pub const DEFAULT_LOG_FILE: &str = "bats.txt";

#[derive(Error, Debug)]
#[error("Error writing to log file {}: {source}", path.display())]
pub struct LogError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Format one log line, newline included
pub fn format_line<Tz: TimeZone>(level: u8, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}|{}|{}\n",
        at.timestamp(),
        level,
        at.format("%d/%m/%Y %H:%M:%S")
    )
}

#[derive(Debug, Clone)]
pub struct BatteryLog {
    path: PathBuf,
}

impl BatteryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a reading stamped with the current local time
    pub fn append_now(&self, level: u8) -> Result<(), LogError> {
        self.append(level, &Local::now())
    }

    pub fn append<Tz: TimeZone>(&self, level: u8, at: &DateTime<Tz>) -> Result<(), LogError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let line = format_line(level, at);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|source| LogError {
                path: self.path.clone(),
                source,
            })
    }
}
