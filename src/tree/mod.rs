//! The path-based tree API.
//!
//! [`ScopedTree`] is the stateless entry point. Its operations are grouped by
//! concern: `io` reads, writes and appends file content, `dir` creates,
//! lists and removes directories and deletes files, `meta` answers stat,
//! exists and URI lookups, and `transfer` moves and copies. [`walk`] turns a
//! logical path into provider handles and [`types`] holds the request and
//! result records.
//!
//! Every public operation re-dereferences the root grant, walks from there,
//! and converts any failure into a single [`OperationError`] naming the
//! operation.

mod dir;
mod io;
mod meta;
mod transfer;
pub mod types;
pub mod walk;

pub use io::copy_stream;
pub use types::*;

use tracing::{debug, error_span};

use crate::config::types::TreeOptions;
use crate::errors::{OpResult, Operation, OperationError, TreeError, TreeResult};
use crate::path;
use crate::provider::{RootGrant, StorageProvider};

/// Path-based file-tree API over a [`StorageProvider`].
///
/// Holds no per-root state: handles are derived per call and dropped at its end.
#[derive(Debug)]
pub struct ScopedTree<P> {
    provider: P,
    options: TreeOptions,
}

impl<P: StorageProvider> ScopedTree<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, TreeOptions::default())
    }

    pub fn with_options(provider: P, options: TreeOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Dereference the grant, failing fast before any path walk.
    fn open_root(&self, grant: &RootGrant) -> TreeResult<P::Node> {
        if grant.is_blank() {
            return Err(TreeError::InvalidRoot("'folder.id' missing".into()));
        }
        self.provider
            .dereference(grant)
            .ok_or_else(|| TreeError::InvalidRoot(grant.to_string()))
    }

    /// Run one operation body and tag any failure with the operation name.
    /// Events logged inside `body` carry the operation name through the
    /// `tree` span, which is enabled at every level but `off`.
    fn run<T>(&self, op: Operation, body: impl FnOnce() -> TreeResult<T>) -> OpResult<T> {
        let _span = error_span!("tree", op = op.as_str()).entered();
        debug!("start");
        body().map_err(|e| {
            debug!(kind = e.kind().as_str(), error = %e, "rejected");
            OperationError::new(op, e)
        })
    }
}

/// Reject a blank required field.
fn require<'a>(value: Option<&'a str>, field: &str) -> TreeResult<&'a str> {
    match value {
        Some(v) if !path::is_blank(v) => Ok(v),
        _ => Err(TreeError::InvalidArgument(format!("'{field}' missing"))),
    }
}

fn require_path(p: &str) -> TreeResult<&str> {
    require(Some(p), "path")
}
