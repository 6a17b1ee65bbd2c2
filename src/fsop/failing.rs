//! Fault-injecting filesystem operations
//!
//! Simulates an uncontrolled crash at a chosen operation index. The
//! process is aborted *before* the selected primitive touches the disk,
//! so "fail at k" leaves exactly operations `0..k` applied.
//!
//! Intended for crash sweeps: run a logical operation once with injection
//! disabled to learn the range of indices it consumes, then re-run it in a
//! child process once per index.

use std::fs::File;
use std::path::Path;

use super::{BasicFilesystemOp, DirEntry, FilesystemOp};

/// Filesystem operations that abort the process at a configured index
#[derive(Debug, Default)]
pub struct FailingFilesystemOp {
    /// Performs the real work and owns the counter
    inner: BasicFilesystemOp,

    /// Index of the operation to abort at (`None` disables injection)
    fail_at: Option<u64>,
}

impl FailingFilesystemOp {
    /// Abort when operation number `index` (counting from zero) is issued
    pub fn fail_at(index: u64) -> Self {
        Self {
            inner: BasicFilesystemOp::new(),
            fail_at: Some(index),
        }
    }

    /// Count operations without ever failing (profiling runs)
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The configured abort index
    pub fn threshold(&self) -> Option<u64> {
        self.fail_at
    }

    fn maybe_fail(&self, op: &str, path: &Path) {
        let index = self.inner.op_count();
        if self.fail_at == Some(index) {
            tracing::error!(
                "Injected failure at operation #{} ({} on {}); aborting",
                index,
                op,
                path.display()
            );
            std::process::abort();
        }
    }
}

impl FilesystemOp for FailingFilesystemOp {
    fn ensure_directory(&self, path: &Path) -> bool {
        self.maybe_fail("ensure_directory", path);
        self.inner.ensure_directory(path)
    }

    fn write_new_file(&self, path: &Path, data: &[u8]) -> File {
        self.maybe_fail("write_new_file", path);
        self.inner.write_new_file(path, data)
    }

    fn sync_file(&self, file: &File, path: &Path) {
        self.maybe_fail("sync_file", path);
        self.inner.sync_file(file, path)
    }

    fn rename(&self, from: &Path, to: &Path) {
        self.maybe_fail("rename", from);
        self.inner.rename(from, to)
    }

    fn sync_directory(&self, path: &Path) {
        self.maybe_fail("sync_directory", path);
        self.inner.sync_directory(path)
    }

    fn list_directory(&self, path: &Path) -> Vec<DirEntry> {
        self.maybe_fail("list_directory", path);
        self.inner.list_directory(path)
    }

    fn op_count(&self) -> u64 {
        self.inner.op_count()
    }
}
