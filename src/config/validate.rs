//! Config validation logic.
//! Verifies content types look like `type/subtype` and the log file path is safe to open.

use anyhow::{bail, Result};
use tracing::{debug, error};

use super::paths::path_has_symlink_ancestor;
use super::types::Config;

impl Config {
    /// Validate content types and the optional log file location.
    pub fn validate(&self) -> Result<()> {
        ensure_mime_type(&self.tree.default_mime_type, "default_mime_type")?;
        ensure_mime_type(&self.tree.copy_mime_type, "copy_mime_type")?;

        if let Some(log) = &self.log_file {
            if log.is_dir() {
                error!("log_file is a directory: {}", log.display());
                bail!("log_file is a directory: {}", log.display());
            }
            if path_has_symlink_ancestor(log)? {
                bail!("log_file '{}' has a symlinked ancestor", log.display());
            }
        }

        debug!(
            default_mime = %self.tree.default_mime_type,
            copy_mime = %self.tree.copy_mime_type,
            encoding = %self.tree.default_encoding,
            "config validated"
        );
        Ok(())
    }
}

/// `type/subtype`, both halves non-empty, no whitespace.
fn ensure_mime_type(value: &str, name: &str) -> Result<()> {
    let ok = match value.split_once('/') {
        Some((ty, sub)) => {
            !ty.is_empty()
                && !sub.is_empty()
                && !sub.contains('/')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !ok {
        bail!("{name} must look like 'type/subtype', got '{value}'");
    }
    Ok(())
}
