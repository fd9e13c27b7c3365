//! In-memory storage provider.
//!
//! Behaves like a document-tree provider: nodes are opaque handles, names are
//! provider-assigned (a colliding create gets a ` (n)` suffix), and deleting a
//! directory takes its contents with it. Faults can be injected per node name
//! to reproduce refused creates, refused or misreported deletes, streams
//! that will not open, and writes that break after the stream is open.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::provider::{NodeKind, RootGrant, StorageProvider, TreeNode, WriteMode};

#[derive(Debug)]
struct Entry {
    id: u64,
    name: String,
    kind: NodeKind,
    mime_type: String,
    data: Vec<u8>,
    modified_at: u64,
    children: Vec<MemNode>,
    parent: Weak<Mutex<Entry>>,
}

/// Handle to one in-memory node.
#[derive(Clone)]
pub struct MemNode(Arc<Mutex<Entry>>);

impl MemNode {
    fn lock(&self) -> MutexGuard<'_, Entry> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Content type the node was created with (empty for directories).
    pub fn mime_type(&self) -> String {
        self.lock().mime_type.clone()
    }

    fn same(&self, other: &MemNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.lock();
        f.debug_struct("MemNode")
            .field("id", &e.id)
            .field("name", &e.name)
            .field("kind", &e.kind)
            .finish()
    }
}

impl TreeNode for MemNode {
    fn name(&self) -> Option<String> {
        Some(self.lock().name.clone())
    }

    fn kind(&self) -> NodeKind {
        self.lock().kind
    }

    fn size(&self) -> u64 {
        self.lock().data.len() as u64
    }

    fn modified_at(&self) -> Option<u64> {
        Some(self.lock().modified_at)
    }

    fn uri(&self) -> String {
        format!("memory://node/{}", self.lock().id)
    }
}

#[derive(Debug, Default)]
struct Faults {
    refuse_create: HashSet<String>,
    refuse_delete: HashSet<String>,
    misreport_delete: HashSet<String>,
    refuse_open: HashSet<String>,
    fail_writes: HashSet<String>,
}

/// Tree of nodes held in memory, addressed through root grants.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    roots: Mutex<HashMap<String, MemNode>>,
    next_id: AtomicU64,
    faults: Mutex<Faults>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty root directory and return the grant naming it.
    pub fn add_root(&self, id: &str) -> RootGrant {
        let root = self.new_entry(id, NodeKind::Directory, String::new(), Weak::new());
        lock(&self.roots).insert(id.to_owned(), root);
        RootGrant::new(id)
    }

    /// Withdraw authorization for a root; its grant stops dereferencing.
    pub fn revoke_root(&self, id: &str) {
        lock(&self.roots).remove(id);
    }

    /// Creating a node with this name returns nothing.
    pub fn refuse_create(&self, name: &str) {
        lock(&self.faults).refuse_create.insert(name.to_owned());
    }

    /// Deleting a node with this name reports `false` and leaves it in place.
    pub fn refuse_delete(&self, name: &str) {
        lock(&self.faults).refuse_delete.insert(name.to_owned());
    }

    /// Deleting a node with this name removes it but still reports `false`.
    pub fn misreport_delete(&self, name: &str) {
        lock(&self.faults).misreport_delete.insert(name.to_owned());
    }

    /// Opening a read or write stream on a node with this name fails.
    pub fn refuse_open(&self, name: &str) {
        lock(&self.faults).refuse_open.insert(name.to_owned());
    }

    /// Write streams on a node with this name open, then fail on every write.
    pub fn fail_writes(&self, name: &str) {
        lock(&self.faults).fail_writes.insert(name.to_owned());
    }

    fn new_entry(&self, name: &str, kind: NodeKind, mime_type: String, parent: Weak<Mutex<Entry>>) -> MemNode {
        MemNode(Arc::new(Mutex::new(Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: name.to_owned(),
            kind,
            mime_type,
            data: Vec::new(),
            modified_at: now_millis(),
            children: Vec::new(),
            parent,
        })))
    }

    fn create_child(&self, parent: &MemNode, name: &str, kind: NodeKind, mime_type: &str) -> Option<MemNode> {
        if name.is_empty() || lock(&self.faults).refuse_create.contains(name) {
            return None;
        }
        let mut p = parent.lock();
        if p.kind != NodeKind::Directory {
            return None;
        }
        let taken: HashSet<String> = p.children.iter().map(|c| c.lock().name.clone()).collect();
        let assigned = unique_name(&taken, name, kind);
        let child = self.new_entry(&assigned, kind, mime_type.to_owned(), Arc::downgrade(&parent.0));
        p.children.push(child.clone());
        p.modified_at = now_millis();
        trace!(parent = p.id, name = %assigned, ?kind, "memory create");
        Some(child)
    }

    fn check_open(&self, node: &MemNode) -> io::Result<()> {
        let (name, kind) = {
            let e = node.lock();
            (e.name.clone(), e.kind)
        };
        if kind != NodeKind::File {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"));
        }
        if lock(&self.faults).refuse_open.contains(&name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stream refused"));
        }
        Ok(())
    }
}

impl StorageProvider for MemoryProvider {
    type Node = MemNode;
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemWriter;

    fn dereference(&self, grant: &RootGrant) -> Option<MemNode> {
        lock(&self.roots).get(grant.as_str()).cloned()
    }

    fn find_child(&self, parent: &MemNode, name: &str) -> Option<MemNode> {
        let p = parent.lock();
        if p.kind != NodeKind::Directory || name.is_empty() {
            return None;
        }
        p.children.iter().find(|c| c.lock().name == name).cloned()
    }

    fn list_children(&self, dir: &MemNode) -> io::Result<Vec<MemNode>> {
        let d = dir.lock();
        if d.kind != NodeKind::Directory {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a directory"));
        }
        Ok(d.children.clone())
    }

    fn create_directory(&self, parent: &MemNode, name: &str) -> Option<MemNode> {
        self.create_child(parent, name, NodeKind::Directory, "")
    }

    fn create_file(&self, parent: &MemNode, mime_type: &str, name: &str) -> Option<MemNode> {
        self.create_child(parent, name, NodeKind::File, mime_type)
    }

    fn delete(&self, node: &MemNode) -> bool {
        let (name, parent) = {
            let e = node.lock();
            (e.name.clone(), e.parent.upgrade())
        };
        let Some(parent) = parent else {
            // roots and already-detached nodes
            return false;
        };
        let (refused, misreported) = {
            let f = lock(&self.faults);
            (f.refuse_delete.contains(&name), f.misreport_delete.contains(&name))
        };
        if refused {
            return false;
        }

        let parent = MemNode(parent);
        parent.lock().children.retain(|c| !c.same(node));
        node.lock().parent = Weak::new();
        trace!(name = %name, misreported, "memory delete");
        !misreported
    }

    fn open_read(&self, node: &MemNode) -> io::Result<Self::Reader> {
        self.check_open(node)?;
        Ok(Cursor::new(node.lock().data.clone()))
    }

    fn open_write(&self, node: &MemNode, mode: WriteMode) -> io::Result<MemWriter> {
        self.check_open(node)?;
        if mode == WriteMode::Truncate {
            let mut e = node.lock();
            e.data.clear();
            e.modified_at = now_millis();
        }
        let broken = lock(&self.faults).fail_writes.contains(&node.lock().name);
        Ok(MemWriter {
            node: node.clone(),
            broken,
        })
    }
}

/// Write stream appending straight into a node's content.
#[derive(Debug)]
pub struct MemWriter {
    node: MemNode,
    broken: bool,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"));
        }
        let mut e = self.node.lock();
        e.data.extend_from_slice(buf);
        e.modified_at = now_millis();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Pick a free name the way document providers do: `name (1)`, `name (2)`, ...
/// Files keep their extension last: `report (1).txt`.
fn unique_name(taken: &HashSet<String>, name: &str, kind: NodeKind) -> String {
    if !taken.contains(name) {
        return name.to_owned();
    }
    let (stem, ext) = match (kind, name.rfind('.')) {
        (NodeKind::File, Some(dot)) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (1..)
        .map(|n| format!("{stem} ({n}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_owned())
}
