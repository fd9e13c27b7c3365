//! Metadata lookups: stat, exists, getUriForPath.

use super::types::{file_size, mtime_secs, ExistsResult, StatResult, UriResult};
use super::walk::resolve;
use super::{require_path, ScopedTree};
use crate::errors::{OpResult, Operation, TreeError};
use crate::provider::{RootGrant, StorageProvider, TreeNode};

impl<P: StorageProvider> ScopedTree<P> {
    pub fn stat(&self, root: &RootGrant, path: &str) -> OpResult<StatResult> {
        self.run(Operation::Stat, || {
            let path = require_path(path)?;
            let root = self.open_root(root)?;
            let node = resolve(&self.provider, &root, path)
                .ok_or_else(|| TreeError::NotFound(format!("Not found: {path}")))?;
            Ok(StatResult {
                uri: node.uri(),
                size: file_size(&node),
                mtime: mtime_secs(&node),
                kind: node.kind(),
            })
        })
    }

    /// Whether `path` resolves. A missing node is an answer, not a rejection;
    /// only a missing path or an unusable root grant rejects.
    pub fn exists(&self, root: &RootGrant, path: &str) -> OpResult<ExistsResult> {
        self.run(Operation::Exists, || {
            let path = require_path(path)?;
            let root = self.open_root(root)?;
            let found = resolve(&self.provider, &root, path);
            Ok(ExistsResult {
                exists: found.is_some(),
                is_directory: found.is_some_and(|n| n.is_dir()),
            })
        })
    }

    /// The provider's identifier for `path`, or `None` when it does not resolve.
    pub fn get_uri_for_path(&self, root: &RootGrant, path: &str) -> OpResult<UriResult> {
        self.run(Operation::GetUriForPath, || {
            let path = require_path(path)?;
            let root = self.open_root(root)?;
            let uri = resolve(&self.provider, &root, path).map(|n| n.uri());
            Ok(UriResult { uri })
        })
    }
}
