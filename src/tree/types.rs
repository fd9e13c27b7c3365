//! Plain-data request and result records exchanged with callers.
//!
//! Field names serialize in camelCase so the records line up with what a
//! request/response bridge above this crate expects (`isDir`, `mimeType`, ...).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TreeResult;
use crate::provider::{NodeKind, TreeNode};

/// Text encoding of a payload crossing the caller boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    #[serde(alias = "utf-8", alias = "UTF8", alias = "UTF-8")]
    Utf8,
    #[serde(alias = "BASE64")]
    Base64,
}

impl Encoding {
    /// Parse an encoding name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Some(Encoding::Utf8),
            "base64" => Some(Encoding::Base64),
            _ => None,
        }
    }

    /// Caller payload -> raw bytes. Base64 input may contain line breaks.
    pub fn decode(self, data: &str) -> TreeResult<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(data.as_bytes().to_vec()),
            Encoding::Base64 => {
                let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                Ok(BASE64.decode(compact)?)
            }
        }
    }

    /// Raw bytes -> caller payload. Invalid UTF-8 is replaced, not rejected.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Base64 => BASE64.encode(bytes),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "utf8",
            Encoding::Base64 => "base64",
        })
    }
}

impl FromStr for Encoding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid encoding: '{s}' (expected utf8 or base64)"))
    }
}

/// Payload for writeFile / appendFile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub path: String,
    pub data: Option<String>,
    #[serde(default)]
    pub encoding: Option<Encoding>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl WriteRequest {
    pub fn new(path: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub path: String,
    #[serde(default)]
    pub encoding: Option<Encoding>,
}

impl ReadRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), encoding: None }
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub data: String,
}

/// Directory to create. Missing parents are created too unless `recursive`
/// is turned off, in which case they must already exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MkdirRequest {
    pub path: String,
    #[serde(default = "recursive_by_default")]
    pub recursive: bool,
}

fn recursive_by_default() -> bool {
    true
}

impl MkdirRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), recursive: true }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmdirRequest {
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
}

impl RmdirRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), recursive: false }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Source and destination for move / copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

impl TransferRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// One immediate child as reported by readdir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: Option<u64>,
    /// Seconds since the epoch (fractional).
    pub mtime: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaddirResult {
    pub entries: Vec<DirEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatResult {
    pub uri: String,
    pub size: Option<u64>,
    pub mtime: Option<f64>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsResult {
    pub exists: bool,
    pub is_directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriResult {
    pub uri: Option<String>,
}

/// File size, or `None` for anything that is not a file.
pub(crate) fn file_size<N: TreeNode>(node: &N) -> Option<u64> {
    node.is_file().then(|| node.size())
}

/// Provider millis -> caller seconds; zero means unknown.
pub(crate) fn mtime_secs<N: TreeNode>(node: &N) -> Option<f64> {
    node.modified_at()
        .filter(|&ms| ms > 0)
        .map(|ms| ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_parse_is_case_insensitive() {
        assert_eq!(Encoding::parse("UTF8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::parse("Base64"), Some(Encoding::Base64));
        assert_eq!(Encoding::parse("latin1"), None);
        assert!("hex".parse::<Encoding>().is_err());
    }

    #[test]
    fn base64_decode_tolerates_line_breaks() {
        let bytes = Encoding::Base64.decode("aGVs\nbG8=\n").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn base64_decode_rejects_garbage() {
        assert!(Encoding::Base64.decode("***").is_err());
    }

    #[test]
    fn base64_encode_is_unwrapped() {
        let long = vec![0xABu8; 200];
        let text = Encoding::Base64.encode(&long);
        assert!(!text.contains('\n'));
    }

    #[test]
    fn records_serialize_in_camel_case() {
        let entry = DirEntry {
            name: "b".into(),
            is_dir: true,
            size: None,
            mtime: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isDir"], true);

        let exists = ExistsResult { exists: true, is_directory: false };
        let json = serde_json::to_value(exists).unwrap();
        assert_eq!(json["isDirectory"], false);
    }

    #[test]
    fn write_request_deserializes_with_defaults() {
        let req: WriteRequest =
            serde_json::from_str(r#"{"path":"a.txt","data":"x","encoding":"base64"}"#).unwrap();
        assert_eq!(req.encoding, Some(Encoding::Base64));
        assert_eq!(req.mime_type, None);
    }
}
