//! Directory operations: mkdir, readdir, rmdir, deleteFile.
//!
//! Recursive removal is best-effort: children go before their directory, and a
//! node the provider refuses to delete is logged and skipped so its siblings
//! still get removed. Some providers report `false` for deletes that worked,
//! so a refused delete is never fatal inside the walk.

use tracing::{debug, info, warn};

use super::types::{file_size, mtime_secs, DirEntry, MkdirRequest, ReaddirResult, RmdirRequest};
use super::walk::{materialize_dir, resolve, resolve_located};
use super::{require_path, ScopedTree};
use crate::errors::{OpResult, Operation, TreeError};
use crate::path::{is_blank, split_path};
use crate::provider::{delete_node, DeleteOutcome, RootGrant, StorageProvider, TreeNode};

impl<P: StorageProvider> ScopedTree<P> {
    /// Create every missing directory along `path`. Existing ones are fine.
    pub fn mkdir(&self, root: &RootGrant, path: &str) -> OpResult<()> {
        self.mkdir_with(root, &MkdirRequest::new(path))
    }

    /// [`mkdir`](Self::mkdir) with the parent policy spelled out. Without
    /// `recursive` only the last segment may be created; a missing parent is
    /// `NotFound` and nothing is created.
    pub fn mkdir_with(&self, root: &RootGrant, req: &MkdirRequest) -> OpResult<()> {
        self.run(Operation::Mkdir, || {
            let path = require_path(&req.path)?;
            let root = self.open_root(root)?;
            let segments = split_path(path);
            let dir = if req.recursive {
                materialize_dir(&self.provider, &root, &segments)?
            } else {
                let (leaf, parents) = segments.split_at(segments.len() - 1);
                let mut parent = root;
                for seg in parents {
                    if seg.is_empty() {
                        return Err(TreeError::InvalidArgument("empty path segment".into()));
                    }
                    parent = match self.provider.find_child(&parent, seg) {
                        Some(dir) if dir.is_dir() => dir,
                        Some(_) => {
                            return Err(TreeError::WrongKind {
                                path: seg.clone(),
                                expected: "directory",
                            });
                        }
                        None => return Err(TreeError::NotFound(format!("Parent directory missing: {seg}"))),
                    };
                }
                materialize_dir(&self.provider, &parent, leaf)?
            };
            info!(path, recursive = req.recursive, uri = %dir.uri(), "mkdir");
            Ok(())
        })
    }

    /// List the immediate children of `path` (the root when `None` or blank).
    pub fn readdir(&self, root: &RootGrant, path: Option<&str>) -> OpResult<ReaddirResult> {
        self.run(Operation::Readdir, || {
            let root = self.open_root(root)?;
            let (dir, shown) = match path.filter(|p| !is_blank(p)) {
                None => (root, "<root>"),
                Some(p) => {
                    let dir = resolve(&self.provider, &root, p)
                        .ok_or_else(|| TreeError::NotFound(format!("Not found: {p}")))?;
                    (dir, p)
                }
            };
            if !dir.is_dir() {
                return Err(TreeError::WrongKind {
                    path: shown.to_owned(),
                    expected: "directory",
                });
            }

            let children = self
                .provider
                .list_children(&dir)
                .map_err(TreeError::io(format!("list '{shown}'")))?;
            let entries = children
                .iter()
                .map(|child| DirEntry {
                    name: child.name().unwrap_or_default(),
                    is_dir: child.is_dir(),
                    size: file_size(child),
                    mtime: mtime_secs(child),
                })
                .collect::<Vec<_>>();
            debug!(path = shown, count = entries.len(), "readdir");
            Ok(ReaddirResult { entries })
        })
    }

    /// Remove a directory. Without `recursive`, a non-empty directory is rejected
    /// and left untouched.
    pub fn rmdir(&self, root: &RootGrant, req: &RmdirRequest) -> OpResult<()> {
        self.run(Operation::Rmdir, || {
            let path = require_path(&req.path)?;
            let root = self.open_root(root)?;
            let loc = resolve_located(&self.provider, &root, path)
                .ok_or_else(|| TreeError::NotFound(format!("Not found: {path}")))?;
            if !loc.node.is_dir() {
                return Err(TreeError::WrongKind {
                    path: path.to_owned(),
                    expected: "directory",
                });
            }

            if !req.recursive {
                let children = self
                    .provider
                    .list_children(&loc.node)
                    .map_err(TreeError::io(format!("list '{path}'")))?;
                if !children.is_empty() {
                    return Err(TreeError::NotEmpty(path.to_owned()));
                }
            }

            let stuck = remove_tree(&self.provider, loc.parent.as_ref(), &loc.node);
            info!(path, recursive = req.recursive, stuck, "rmdir");
            Ok(())
        })
    }

    /// Delete the node at `path`. Absence is success; a refused delete is not.
    pub fn delete_file(&self, root: &RootGrant, path: &str) -> OpResult<()> {
        self.run(Operation::DeleteFile, || {
            let path = require_path(path)?;
            let root = self.open_root(root)?;
            let Some(loc) = resolve_located(&self.provider, &root, path) else {
                debug!(path, "nothing to delete");
                return Ok(());
            };
            match delete_node(&self.provider, loc.parent.as_ref(), &loc.node) {
                DeleteOutcome::Deleted => {
                    info!(path, "deleted");
                    Ok(())
                }
                outcome => {
                    debug!(path, ?outcome, "delete refused");
                    Err(TreeError::Provider("Delete returned false".into()))
                }
            }
        })
    }
}

/// Depth-first removal of `node` and everything under it.
/// Returns how many nodes the provider did not confirm as deleted.
pub(crate) fn remove_tree<P: StorageProvider>(
    provider: &P,
    parent: Option<&P::Node>,
    node: &P::Node,
) -> usize {
    let mut stuck = 0;
    if node.is_dir() {
        match provider.list_children(node) {
            Ok(children) => {
                for child in &children {
                    stuck += remove_tree(provider, Some(node), child);
                }
            }
            Err(e) => warn!(uri = %node.uri(), error = %e, "Could not list directory; deleting it directly"),
        }
    }

    let outcome = delete_node(provider, parent, node);
    if !outcome.is_deleted() {
        warn!(uri = %node.uri(), ?outcome, "Delete returned false; continuing");
        stuck += 1;
    }
    stuck
}

