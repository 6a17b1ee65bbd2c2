//! Filesystem Operation Layer
//!
//! A small, fully enumerable vocabulary of durable filesystem primitives.
//! The storage engine performs every mutation through this layer, so each
//! primitive call can be counted and, in tests, intercepted.
//!
//! ## Vocabulary
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ ensure_directory │ mkdir (missing ancestors too), idempotent    │
//! │ write_new_file   │ create/truncate + write all bytes            │
//! │ sync_file        │ fsync a file                                 │
//! │ rename           │ atomic rename, replacing the destination     │
//! │ sync_directory   │ fsync a directory                            │
//! │ list_directory   │ names + kinds of the immediate children      │
//! └──────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//! A primitive either succeeds or aborts the process. Errors are never
//! handed back to the caller: continuing after a failed write could commit
//! a partial entry, while a crash leaves the tree in a state the atomic
//! rename protocol already knows how to resume from.

mod basic;
mod failing;

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::Path;

pub use basic::BasicFilesystemOp;
pub use failing::FailingFilesystemOp;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name (no path components)
    pub name: OsString,

    /// Whether the child is a directory
    pub is_dir: bool,
}

/// Durable filesystem primitives used by the storage engine.
///
/// Every method call increments the operation counter exactly once, in
/// call order. "Operation #k" is the k-th call (counting from zero) and
/// is the unit of granularity for fault injection.
pub trait FilesystemOp: Send {
    /// Create `path` (and any missing ancestors) if it does not exist.
    ///
    /// Returns `true` if `path` itself was created by this call.
    fn ensure_directory(&self, path: &Path) -> bool;

    /// Create or truncate `path`, write `data` fully, and return the open file.
    fn write_new_file(&self, path: &Path, data: &[u8]) -> File;

    /// Flush a file's data and metadata to stable storage.
    fn sync_file(&self, file: &File, path: &Path);

    /// Atomically rename `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path);

    /// Flush a directory's entries to stable storage.
    fn sync_directory(&self, path: &Path);

    /// List the immediate children of a directory.
    fn list_directory(&self, path: &Path) -> Vec<DirEntry>;

    /// Number of primitive calls issued so far.
    fn op_count(&self) -> u64;
}

impl<F: FilesystemOp + ?Sized> FilesystemOp for Box<F> {
    fn ensure_directory(&self, path: &Path) -> bool {
        (**self).ensure_directory(path)
    }

    fn write_new_file(&self, path: &Path, data: &[u8]) -> File {
        (**self).write_new_file(path, data)
    }

    fn sync_file(&self, file: &File, path: &Path) {
        (**self).sync_file(file, path)
    }

    fn rename(&self, from: &Path, to: &Path) {
        (**self).rename(from, to)
    }

    fn sync_directory(&self, path: &Path) {
        (**self).sync_directory(path)
    }

    fn list_directory(&self, path: &Path) -> Vec<DirEntry> {
        (**self).list_directory(path)
    }

    fn op_count(&self) -> u64 {
        (**self).op_count()
    }
}

/// Log an unrecoverable filesystem failure and abort the process.
pub(crate) fn fatal(op: &str, path: &Path, err: &io::Error) -> ! {
    tracing::error!(
        "Filesystem operation {} failed on {}: {}; aborting",
        op,
        path.display(),
        err
    );
    std::process::abort()
}
