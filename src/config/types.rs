//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - TreeOptions carries the knobs the tree operations consult.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use super::{COPY_MIME_DEFAULT, FILE_MIME_DEFAULT};
use crate::tree::Encoding;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and errors (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Most verbose `tracing` level let through at this setting.
    /// `normal` keeps completed-mutation INFO events out and shows only
    /// best-effort failures (WARN) and rejections.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::ERROR,
            LogLevel::Normal => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Defaults consulted by tree operations when a request leaves them open.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOptions {
    /// Content type for files created by write/append without an explicit one
    pub default_mime_type: String,
    /// Content type for destination files created by move/copy
    pub copy_mime_type: String,
    /// Encoding used when a request does not name one
    pub default_encoding: Encoding,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            default_mime_type: FILE_MIME_DEFAULT.to_owned(),
            copy_mime_type: COPY_MIME_DEFAULT.to_owned(),
            default_encoding: Encoding::Utf8,
        }
    }
}

/// Runtime configuration for the command-line front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    pub tree: TreeOptions,
}
