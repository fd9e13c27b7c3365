//! Storage provider seam.
//!
//! The tree layer never addresses storage by path. It only sees opaque node
//! handles and a handful of single-hop primitives: dereference a root grant,
//! find a named child, list children, create a child file or directory, delete
//! a node, and open byte streams. Any backend that can answer those (a cloud
//! object store, a sandboxed directory, the in-memory double) plugs in here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Write};

/// Opaque, externally issued token naming an authorized storage root.
///
/// The tree layer never creates or revokes grants; it dereferences one at the
/// start of every operation and never caches the resulting root handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootGrant(String);

impl RootGrant {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A grant with no usable identifier.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RootGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RootGrant {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RootGrant {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a node is, as far as the provider can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
    Unknown,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
            NodeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a write stream treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Accessors every node handle exposes.
///
/// A handle is a capability for one node only; children must be obtained
/// through [`StorageProvider::find_child`] or [`StorageProvider::list_children`].
pub trait TreeNode: Clone + fmt::Debug {
    /// Provider-assigned name. May differ from the requested name on collision.
    fn name(&self) -> Option<String>;

    fn kind(&self) -> NodeKind;

    /// Byte length. Only meaningful for files.
    fn size(&self) -> u64;

    /// Modification time in epoch milliseconds; `None` when unknown.
    fn modified_at(&self) -> Option<u64>;

    /// Opaque, provider-addressable identifier for this node.
    fn uri(&self) -> String;

    fn is_dir(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }
}

/// Single-hop primitives a storage backend must supply.
///
/// `None`/`false` returns mean the provider refused or found nothing; the tree
/// layer decides whether that is an error.
pub trait StorageProvider {
    type Node: TreeNode;
    type Reader: Read;
    type Writer: Write;

    /// Turn a root grant into a root handle. `None` when the grant is malformed
    /// or no longer authorized.
    fn dereference(&self, grant: &RootGrant) -> Option<Self::Node>;

    fn find_child(&self, parent: &Self::Node, name: &str) -> Option<Self::Node>;

    /// Immediate children of a directory.
    fn list_children(&self, dir: &Self::Node) -> io::Result<Vec<Self::Node>>;

    fn create_directory(&self, parent: &Self::Node, name: &str) -> Option<Self::Node>;

    fn create_file(&self, parent: &Self::Node, mime_type: &str, name: &str) -> Option<Self::Node>;

    /// Advisory: some providers report `false` for deletes that succeeded.
    fn delete(&self, node: &Self::Node) -> bool;

    fn open_read(&self, node: &Self::Node) -> io::Result<Self::Reader>;

    fn open_write(&self, node: &Self::Node, mode: WriteMode) -> io::Result<Self::Writer>;
}

/// Classified result of a provider delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Provider confirmed the delete.
    Deleted,
    /// Provider reported failure, but the node may well be gone.
    ReportedFailure,
    /// Provider reported failure and the node is still visible under its parent.
    StillPresent,
}

impl DeleteOutcome {
    pub fn is_deleted(self) -> bool {
        self == DeleteOutcome::Deleted
    }
}

/// Delete `node` and classify the result.
///
/// When the provider returns `false` and the parent is known, the parent is
/// re-queried by name to tell a stuck node from a quirky report.
pub fn delete_node<P: StorageProvider>(
    provider: &P,
    parent: Option<&P::Node>,
    node: &P::Node,
) -> DeleteOutcome {
    if provider.delete(node) {
        return DeleteOutcome::Deleted;
    }
    match (parent, node.name()) {
        (Some(parent), Some(name)) => match provider.find_child(parent, &name) {
            Some(_) => DeleteOutcome::StillPresent,
            None => DeleteOutcome::ReportedFailure,
        },
        _ => DeleteOutcome::ReportedFailure,
    }
}
