//! Core library for `scoped_tree`.
//!
//! A path-based file-tree API over opaque, permission-scoped storage roots.
//! Callers name files with slash-separated paths relative to a root grant;
//! the crate resolves those paths one child lookup at a time through a
//! [`StorageProvider`], creating missing parents on writes and hiding the
//! provider's handle model behind plain request/result records.
//!
//! Layout:
//! - [`path`]: path splitting
//! - [`provider`]: the storage seam (`StorageProvider`, `TreeNode`, root grants)
//! - [`tree`]: resolver, materializer and the public operations on [`ScopedTree`]
//! - [`backends`]: local-directory and in-memory providers
//! - [`config`], [`errors`], [`output`]: ambient support for the CLI

pub mod backends;
pub mod config;
pub mod errors;
pub mod output;
pub mod path;
pub mod provider;
pub mod tree;

pub use backends::{LocalProvider, MemoryProvider};
pub use config::{
    default_config_path, default_log_path, load_config, path_has_symlink_ancestor, Config,
    LogLevel, TreeOptions,
};
pub use errors::{ErrorKind, OpResult, Operation, OperationError, TreeError, TreeResult};
pub use provider::{
    delete_node, DeleteOutcome, NodeKind, RootGrant, StorageProvider, TreeNode, WriteMode,
};
pub use tree::{
    DirEntry, Encoding, ExistsResult, MkdirRequest, ReadRequest, ReadResult, ReaddirResult,
    RmdirRequest, ScopedTree, StatResult, TransferRequest, UriResult, WriteRequest,
};

/// Everything a caller typically needs in one import.
pub mod prelude {
    pub use crate::provider::{RootGrant, StorageProvider, TreeNode};
    pub use crate::tree::{
        Encoding, MkdirRequest, ReadRequest, RmdirRequest, ScopedTree, TransferRequest, WriteRequest,
    };
    pub use crate::errors::{OpResult, OperationError};
}
