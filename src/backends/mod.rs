//! Storage providers shipped with the crate.
//!
//! - [`LocalProvider`]: a granted directory on the local filesystem.
//! - [`MemoryProvider`]: an in-process tree with fault injection, used by tests
//!   and by callers that want a scratch tree.

mod local;
mod memory;

pub use local::{LocalNode, LocalProvider};
pub use memory::{MemNode, MemWriter, MemoryProvider};
