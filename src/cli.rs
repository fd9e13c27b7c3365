//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - --root is required by every subcommand except `config-path`.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use scoped_tree::{Config, Encoding, LogLevel};

/// Path-based file operations inside a granted directory.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Path-based file operations inside a granted directory")]
pub struct Args {
    /// Root grant: `file:///abs/dir` or an absolute directory path.
    #[arg(long, short = 'r', global = true, value_name = "GRANT")]
    pub root: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Explicit config file (overrides SCOPED_TREE_CONFIG and the default location).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Log file override.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Payload options shared by `write` and `append`.
#[derive(clap::Args, Debug, Clone)]
pub struct WriteArgs {
    pub path: String,
    /// Payload; read from stdin when omitted.
    #[arg(long)]
    pub data: Option<String>,
    #[arg(long, short = 'e')]
    pub encoding: Option<Encoding>,
    /// Content type for a newly created file.
    #[arg(long)]
    pub mime_type: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TransferArgs {
    pub from: String,
    pub to: String,
    /// Replace an existing destination.
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create or truncate a file and write the payload.
    Write(WriteArgs),
    /// Append the payload, creating the file if needed.
    Append(WriteArgs),
    /// Print a file's content.
    Read {
        path: String,
        #[arg(long, short = 'e')]
        encoding: Option<Encoding>,
    },
    /// Create a directory, plus any missing parents unless `--no-parents`.
    Mkdir {
        path: String,
        /// Require every parent to exist already.
        #[arg(long)]
        no_parents: bool,
    },
    /// Remove a directory.
    Rmdir {
        path: String,
        #[arg(long, short = 'R')]
        recursive: bool,
    },
    /// List a directory (the root when no path is given).
    Readdir { path: Option<String> },
    Stat { path: String },
    Exists { path: String },
    /// Delete a node; absence is not an error.
    Delete { path: String },
    #[command(name = "move")]
    Move(TransferArgs),
    Copy(TransferArgs),
    /// Print the provider identifier for a path.
    Uri { path: String },
    /// Print the config file location that would be used, then exit.
    ConfigPath,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.json {
            cfg.json_logs = true;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
