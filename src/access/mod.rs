//! Path-sandboxed file access.
//!
//! Every file the registry returns is read through a [`SafeRoot`], which
//! rejects traversal before touching the filesystem and re-checks
//! containment after resolving symlinks.

mod error;
mod path;

pub use error::AccessError;
pub use path::{display_relative, normalize_relative, SafeRoot};
