//! Local-directory storage provider.
//!
//! A root grant names an existing directory (`file:///abs/dir` or a bare
//! absolute path). Child lookups accept a single plain name only, and only
//! below a parent that is itself a real directory, so a walk can never step
//! outside the granted directory. Separators, `.`, `..` and NUL are refused,
//! a symlinked directory is a dead end, and symlinks are never opened as
//! streams.

use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::provider::{NodeKind, RootGrant, StorageProvider, TreeNode, WriteMode};

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    /// Build a grant for `dir` in the `file://` form this provider accepts.
    pub fn grant_for(dir: &Path) -> RootGrant {
        RootGrant::new(format!("{FILE_SCHEME}{}", dir.display()))
    }
}

/// Handle to one entry below a granted directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNode {
    path: PathBuf,
}

impl LocalNode {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` unless `name` is a plain name and `self` is a real directory.
    fn child(&self, name: &str) -> Option<PathBuf> {
        (is_plain_name(name) && is_real_dir(&self.path)).then(|| self.path.join(name))
    }
}

impl TreeNode for LocalNode {
    fn name(&self) -> Option<String> {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned())
    }

    fn kind(&self) -> NodeKind {
        match fs::symlink_metadata(&self.path) {
            Ok(m) if m.is_dir() => NodeKind::Directory,
            Ok(m) if m.is_file() => NodeKind::File,
            _ => NodeKind::Unknown,
        }
    }

    fn size(&self) -> u64 {
        fs::symlink_metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn modified_at(&self) -> Option<u64> {
        let meta = fs::symlink_metadata(&self.path).ok()?;
        let mtime = FileTime::from_last_modification_time(&meta);
        let secs = u64::try_from(mtime.unix_seconds()).ok()?;
        Some(secs * 1000 + u64::from(mtime.nanoseconds()) / 1_000_000)
    }

    fn uri(&self) -> String {
        format!("{FILE_SCHEME}{}", self.path.display())
    }
}

/// A single path component that cannot climb or descend.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// A directory that is not reached through a symlink at its last component.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}

fn not_regular(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("not a regular file: {}", path.display()),
    )
}

fn ensure_regular_file(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_file() { Ok(()) } else { Err(not_regular(path)) }
}

impl StorageProvider for LocalProvider {
    type Node = LocalNode;
    type Reader = File;
    type Writer = File;

    fn dereference(&self, grant: &RootGrant) -> Option<LocalNode> {
        let raw = grant.as_str().trim();
        let raw = raw.strip_prefix(FILE_SCHEME).unwrap_or(raw);
        let path = Path::new(raw);
        if !path.is_absolute() {
            return None;
        }
        let path = dunce::canonicalize(path).ok()?;
        path.is_dir().then_some(LocalNode { path })
    }

    fn find_child(&self, parent: &LocalNode, name: &str) -> Option<LocalNode> {
        let path = parent.child(name)?;
        fs::symlink_metadata(&path).ok()?;
        Some(LocalNode { path })
    }

    fn list_children(&self, dir: &LocalNode) -> io::Result<Vec<LocalNode>> {
        if !is_real_dir(&dir.path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir.path.display()),
            ));
        }
        let mut children = fs::read_dir(&dir.path)?
            .map(|entry| entry.map(|e| LocalNode { path: e.path() }))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    fn create_directory(&self, parent: &LocalNode, name: &str) -> Option<LocalNode> {
        let path = parent.child(name)?;
        match fs::create_dir(&path) {
            Ok(()) => Some(LocalNode { path }),
            Err(e) => {
                trace!(path = %path.display(), error = %e, "create_dir refused");
                None
            }
        }
    }

    /// Content types have no on-disk representation here.
    fn create_file(&self, parent: &LocalNode, _mime_type: &str, name: &str) -> Option<LocalNode> {
        let path = parent.child(name)?;
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Some(LocalNode { path }),
            Err(e) => {
                trace!(path = %path.display(), error = %e, "create_file refused");
                None
            }
        }
    }

    fn delete(&self, node: &LocalNode) -> bool {
        let result = match fs::symlink_metadata(&node.path) {
            Ok(m) if m.is_dir() => fs::remove_dir_all(&node.path),
            Ok(_) => fs::remove_file(&node.path),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            trace!(path = %node.path.display(), error = %e, "delete refused");
        }
        result.is_ok()
    }

    fn open_read(&self, node: &LocalNode) -> io::Result<File> {
        ensure_regular_file(&node.path)?;
        File::open(&node.path)
    }

    fn open_write(&self, node: &LocalNode, mode: WriteMode) -> io::Result<File> {
        ensure_regular_file(&node.path)?;
        let mut opts = OpenOptions::new();
        match mode {
            WriteMode::Truncate => opts.write(true).truncate(true),
            WriteMode::Append => opts.append(true),
        };
        opts.open(&node.path)
    }
}
