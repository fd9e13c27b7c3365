//! Byte I/O: writeFile, appendFile, readFile, and the stream copy used by move/copy.
//!
//! Streams are acquired right before use and closed on every exit path by
//! going out of scope. Writers are flushed explicitly so a failed flush is
//! reported instead of being lost in `Drop`.

use std::io::{self, BufReader, BufWriter, Read, Write};
use tracing::{debug, info};

use super::types::{ReadRequest, ReadResult, WriteRequest};
use super::walk::{materialize_file, resolve};
use super::{require_path, ScopedTree};
use crate::errors::{OpResult, Operation, TreeError, TreeResult};
use crate::path::is_blank;
use crate::provider::{RootGrant, StorageProvider, TreeNode, WriteMode};

const BUF_SIZE: usize = 64 * 1024;

impl<P: StorageProvider> ScopedTree<P> {
    /// Create or truncate the file at `req.path` and write the decoded payload.
    /// Missing parent directories are created.
    pub fn write_file(&self, root: &RootGrant, req: &WriteRequest) -> OpResult<()> {
        self.run(Operation::WriteFile, || self.write_payload(root, req, WriteMode::Truncate))
    }

    /// Like [`write_file`](Self::write_file) but appends to existing content.
    pub fn append_file(&self, root: &RootGrant, req: &WriteRequest) -> OpResult<()> {
        self.run(Operation::AppendFile, || self.write_payload(root, req, WriteMode::Append))
    }

    /// Read the whole file and encode it for the caller.
    /// A directory at `req.path` counts as not found.
    pub fn read_file(&self, root: &RootGrant, req: &ReadRequest) -> OpResult<ReadResult> {
        self.run(Operation::ReadFile, || {
            let path = require_path(&req.path)?;
            let encoding = req.encoding.unwrap_or(self.options.default_encoding);
            let root = self.open_root(root)?;

            let node = resolve(&self.provider, &root, path)
                .filter(|n| n.is_file())
                .ok_or_else(|| TreeError::NotFound("File not found".into()))?;

            let bytes = {
                let mut reader = self.provider.open_read(&node).map_err(|e| {
                    TreeError::Provider(format!("failed to open input stream: {e}"))
                })?;
                let mut buf = Vec::new();
                reader
                    .read_to_end(&mut buf)
                    .map_err(TreeError::io(format!("read '{path}'")))?;
                buf
            };
            debug!(path, bytes = bytes.len(), %encoding, "read file");

            Ok(ReadResult { data: encoding.encode(&bytes) })
        })
    }

    fn write_payload(&self, root: &RootGrant, req: &WriteRequest, mode: WriteMode) -> TreeResult<()> {
        let path = require_path(&req.path)?;
        let data = req
            .data
            .as_deref()
            .ok_or_else(|| TreeError::InvalidArgument("data missing".into()))?;
        let encoding = req.encoding.unwrap_or(self.options.default_encoding);
        let mime_type = req
            .mime_type
            .as_deref()
            .filter(|m| !is_blank(m))
            .unwrap_or(self.options.default_mime_type.as_str());

        // Decode before touching storage so a bad payload leaves no empty file behind.
        let bytes = encoding.decode(data)?;

        let root = self.open_root(root)?;
        let node = materialize_file(&self.provider, &root, path, mime_type)?;

        let mut writer = self
            .provider
            .open_write(&node, mode)
            .map_err(|e| TreeError::Provider(format!("failed to open output stream: {e}")))?;
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(TreeError::io(format!("write '{path}'")))?;

        info!(path, bytes = bytes.len(), ?mode, uri = %node.uri(), "wrote file");
        Ok(())
    }
}

/// Copy everything from `reader` to `writer`, then flush.
/// Does not assume a known length; reads until end-of-stream.
pub fn copy_stream<R: Read, W: Write>(reader: R, writer: W) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, reader);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, writer);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_stream_copies_everything() {
        let data: Vec<u8> = (0..(3 * BUF_SIZE + 17)).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        let n = copy_stream(&data[..], &mut out).unwrap();
        assert_eq!(n as usize, data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn copy_stream_zero_length_ok() {
        let mut out = Vec::new();
        assert_eq!(copy_stream(io::empty(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn copy_stream_surfaces_write_errors() {
        let err = copy_stream(&b"payload"[..], FailingWriter).unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
