//! Walking a logical path from a root handle.
//!
//! The provider has no "resolve deep path" primitive, so every lookup is a
//! chain of single-hop `find_child` calls:
//! - `resolve` only looks; the first miss means "not found", with no side effects.
//! - `materialize_dir` / `materialize_file` create what is missing on the way.
//!   Existing segments are reused, never recreated, so repeated calls are idempotent.
//!
//! An empty segment (from `/a`, `a//b` or `a/`) never reaches the provider:
//! lookups treat it as a miss and materialization rejects it.

use tracing::{debug, trace};

use crate::errors::{TreeError, TreeResult};
use crate::path::split_path;
use crate::provider::{StorageProvider, TreeNode};

/// A resolved node together with the directory it was found in.
/// `parent` is `None` only when the path named the root itself.
#[derive(Debug, Clone)]
pub struct Located<N> {
    pub parent: Option<N>,
    /// Every directory walked through, root first; ends with `parent`.
    pub ancestors: Vec<N>,
    pub node: N,
}

impl<N: TreeNode> Located<N> {
    /// Whether `other` is one of the directories above the resolved node.
    pub fn is_below(&self, other: &N) -> bool {
        let uri = other.uri();
        self.ancestors.iter().any(|a| a.uri() == uri)
    }
}

/// Walk `path` from `root` without creating anything.
pub fn resolve<P: StorageProvider>(provider: &P, root: &P::Node, path: &str) -> Option<P::Node> {
    resolve_located(provider, root, path).map(|loc| loc.node)
}

/// Like [`resolve`], but also returns the parent of the final node.
pub fn resolve_located<P: StorageProvider>(
    provider: &P,
    root: &P::Node,
    path: &str,
) -> Option<Located<P::Node>> {
    let mut ancestors = Vec::new();
    let mut cur = root.clone();
    for seg in split_path(path) {
        if seg.is_empty() {
            trace!(path, "empty segment; treating as not found");
            return None;
        }
        let next = provider.find_child(&cur, &seg)?;
        ancestors.push(std::mem::replace(&mut cur, next));
    }
    Some(Located {
        parent: ancestors.last().cloned(),
        ancestors,
        node: cur,
    })
}

/// Walk `segments` as directories from `root`, creating any that are missing.
pub fn materialize_dir<P: StorageProvider>(
    provider: &P,
    root: &P::Node,
    segments: &[String],
) -> TreeResult<P::Node> {
    let mut cur = root.clone();
    for seg in segments {
        cur = step_dir(provider, &cur, seg)?;
    }
    Ok(cur)
}

/// Materialize the parent chain of `path`, then find or create the leaf file.
pub fn materialize_file<P: StorageProvider>(
    provider: &P,
    root: &P::Node,
    path: &str,
    mime_type: &str,
) -> TreeResult<P::Node> {
    let segments = split_path(path);
    let (leaf, dirs) = split_leaf(&segments, path)?;
    let parent = materialize_dir(provider, root, dirs)?;

    match provider.find_child(&parent, leaf) {
        Some(existing) if existing.is_dir() => Err(TreeError::WrongKind {
            path: path.to_owned(),
            expected: "file",
        }),
        Some(existing) => Ok(existing),
        None => {
            let created = provider
                .create_file(&parent, mime_type, leaf)
                .ok_or_else(|| TreeError::Provider(format!("Failed to create file: {leaf}")))?;
            debug!(name = leaf, mime_type, uri = %created.uri(), "created file");
            Ok(created)
        }
    }
}

/// Split segments into (leaf name, directory chain). The leaf must be non-empty.
pub(crate) fn split_leaf<'a>(segments: &'a [String], path: &str) -> TreeResult<(&'a str, &'a [String])> {
    match segments.split_last() {
        Some((leaf, dirs)) if !leaf.is_empty() => Ok((leaf.as_str(), dirs)),
        _ => Err(TreeError::InvalidArgument(format!("'{path}' does not name a file"))),
    }
}

fn step_dir<P: StorageProvider>(provider: &P, cur: &P::Node, seg: &str) -> TreeResult<P::Node> {
    if seg.is_empty() {
        return Err(TreeError::InvalidArgument("empty path segment".into()));
    }
    match provider.find_child(cur, seg) {
        Some(existing) if existing.is_dir() => Ok(existing),
        Some(_) => Err(TreeError::WrongKind {
            path: seg.to_owned(),
            expected: "directory",
        }),
        None => {
            let created = provider
                .create_directory(cur, seg)
                .ok_or_else(|| TreeError::Provider(format!("Failed to create directory: {seg}")))?;
            debug!(name = seg, uri = %created.uri(), "created directory");
            Ok(created)
        }
    }
}
