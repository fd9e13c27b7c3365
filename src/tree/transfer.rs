//! Move and copy.
//!
//! There is no rename primitive, so both are a stream copy into a freshly
//! created destination file. Move then removes the source best-effort.
//! Order matters:
//! 1. resolve the source
//! 2. materialize the destination's parent chain
//! 3. settle an existing destination (reject, or delete when overwriting).
//!    A destination that contains the source is always rejected.
//! 4. create the destination file, copy bytes
//! 5. (move only) delete the source; failure is logged, not reported

use tracing::{info, warn};

use super::io::copy_stream;
use super::types::TransferRequest;
use super::walk::{materialize_dir, resolve_located, split_leaf};
use super::{require, ScopedTree};
use crate::errors::{OpResult, Operation, TreeError, TreeResult};
use crate::path::split_path;
use crate::provider::{delete_node, DeleteOutcome, RootGrant, StorageProvider, TreeNode, WriteMode};

impl<P: StorageProvider> ScopedTree<P> {
    /// Copy `from` to `to`, then remove `from` best-effort.
    pub fn move_file(&self, root: &RootGrant, req: &TransferRequest) -> OpResult<()> {
        self.run(Operation::Move, || self.transfer(root, req, true))
    }

    /// Copy `from` to `to`, leaving `from` in place.
    pub fn copy_file(&self, root: &RootGrant, req: &TransferRequest) -> OpResult<()> {
        self.run(Operation::Copy, || self.transfer(root, req, false))
    }

    fn transfer(&self, root: &RootGrant, req: &TransferRequest, is_move: bool) -> TreeResult<()> {
        let from = require(req.from.as_deref(), "from")?;
        let to = require(req.to.as_deref(), "to")?;
        let root = self.open_root(root)?;

        let src = resolve_located(&self.provider, &root, from)
            .ok_or_else(|| TreeError::NotFound(format!("Source not found: {from}")))?;
        if src.node.is_dir() {
            return Err(TreeError::WrongKind {
                path: from.to_owned(),
                expected: "file",
            });
        }

        let segments = split_path(to);
        let (file_name, dirs) = split_leaf(&segments, to)?;
        let parent = materialize_dir(&self.provider, &root, dirs)?;

        if let Some(existing) = self.provider.find_child(&parent, file_name) {
            if existing.uri() == src.node.uri() {
                info!(from, to, "source and destination are the same node; nothing to do");
                return Ok(());
            }
            if src.is_below(&existing) {
                return Err(TreeError::WrongKind {
                    path: to.to_owned(),
                    expected: "file",
                });
            }
            if !req.overwrite {
                return Err(TreeError::AlreadyExists(
                    "Destination exists and overwrite=false".into(),
                ));
            }
            if delete_node(&self.provider, Some(&parent), &existing) != DeleteOutcome::Deleted {
                return Err(TreeError::Provider(
                    "Failed to delete existing destination".into(),
                ));
            }
        }

        let dst = self
            .provider
            .create_file(&parent, &self.options.copy_mime_type, file_name)
            .ok_or_else(|| TreeError::Provider("Failed to create destination file".into()))?;

        let bytes = {
            let reader = self
                .provider
                .open_read(&src.node)
                .map_err(|e| TreeError::Provider(format!("Failed to open streams: {e}")))?;
            let writer = self
                .provider
                .open_write(&dst, WriteMode::Truncate)
                .map_err(|e| TreeError::Provider(format!("Failed to open streams: {e}")))?;
            copy_stream(reader, writer).map_err(TreeError::io(format!("copy '{from}' -> '{to}'")))?
        };

        if is_move {
            let outcome = delete_node(&self.provider, src.parent.as_ref(), &src.node);
            if !outcome.is_deleted() {
                warn!(uri = %src.node.uri(), ?outcome, "Move: failed to delete source");
            }
        }

        info!(from, to, bytes, is_move, overwrite = req.overwrite, "transfer complete");
        Ok(())
    }
}
