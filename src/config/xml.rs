//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Maps the optional fields onto [`Config`] defaults.
//!
//! Notes:
//! - A missing file is not an error; callers fall back to defaults.
//! - Unknown XML fields are a hard error to surface misconfigurations early.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use crate::config::types::{Config, LogLevel};
use crate::tree::Encoding;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "json_logs")]
    json_logs: Option<bool>,
    #[serde(rename = "default_mime_type")]
    default_mime_type: Option<String>,
    #[serde(rename = "copy_mime_type")]
    copy_mime_type: Option<String>,
    #[serde(rename = "default_encoding")]
    default_encoding: Option<String>,
}

fn trimmed(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

// Map XmlConfig -> Config; absent or blank fields keep their defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = trimmed(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = trimmed(parsed.log_file.as_deref()).map(PathBuf::from);
    cfg.json_logs = parsed.json_logs.unwrap_or(false);

    if let Some(s) = trimmed(parsed.default_mime_type.as_deref()) {
        cfg.tree.default_mime_type = s.to_owned();
    }
    if let Some(s) = trimmed(parsed.copy_mime_type.as_deref()) {
        cfg.tree.copy_mime_type = s.to_owned();
    }
    if let Some(s) = trimmed(parsed.default_encoding.as_deref()) {
        cfg.tree.default_encoding = s.parse::<Encoding>().map_err(anyhow::Error::msg)?;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in '{}'", path.display()))
}

/// Load the config at the default location (or `$SCOPED_TREE_CONFIG`).
/// Returns Ok(None) when no file exists there.
pub fn load_config() -> Result<Option<Config>> {
    let path = default_config_path().context("resolve default config path")?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path).map(Some)
}
