//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel, TreeOptions};
pub use xml::{load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file (or its directory).
pub const CONFIG_ENV: &str = "SCOPED_TREE_CONFIG";
/// Per-user directory name under the OS config/data dirs.
pub const APP_DIR: &str = "scoped_tree";

pub const FILE_MIME_DEFAULT: &str = "text/plain";
pub const COPY_MIME_DEFAULT: &str = "application/octet-stream";
