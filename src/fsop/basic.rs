//! Production filesystem operations
//!
//! Performs each primitive directly against the local filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{fatal, DirEntry, FilesystemOp};

/// Filesystem operations backed by `std::fs`
#[derive(Debug, Default)]
pub struct BasicFilesystemOp {
    /// Primitive calls issued so far
    ops: AtomicU64,
}

impl BasicFilesystemOp {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self) {
        self.ops.fetch_add(1, Ordering::SeqCst);
    }
}

impl FilesystemOp for BasicFilesystemOp {
    fn ensure_directory(&self, path: &Path) -> bool {
        self.count();

        match fs::create_dir(path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if path.is_dir() {
                    false
                } else {
                    fatal("ensure_directory", path, &e)
                }
            }
            // A missing ancestor; only expected for the storage root itself
            Err(e) if e.kind() == ErrorKind::NotFound => match fs::create_dir_all(path) {
                Ok(()) => true,
                Err(e) => fatal("ensure_directory", path, &e),
            },
            Err(e) => fatal("ensure_directory", path, &e),
        }
    }

    fn write_new_file(&self, path: &Path, data: &[u8]) -> File {
        self.count();

        let mut file = match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
        {
            Ok(file) => file,
            Err(e) => fatal("write_new_file", path, &e),
        };

        if let Err(e) = file.write_all(data) {
            fatal("write_new_file", path, &e);
        }

        file
    }

    fn sync_file(&self, file: &File, path: &Path) {
        self.count();

        if let Err(e) = file.sync_all() {
            fatal("sync_file", path, &e);
        }
    }

    fn rename(&self, from: &Path, to: &Path) {
        self.count();

        if let Err(e) = fs::rename(from, to) {
            fatal("rename", from, &e);
        }
    }

    fn sync_directory(&self, path: &Path) {
        self.count();

        let dir = match File::open(path) {
            Ok(dir) => dir,
            Err(e) => fatal("sync_directory", path, &e),
        };
        if let Err(e) = dir.sync_all() {
            fatal("sync_directory", path, &e);
        }
    }

    fn list_directory(&self, path: &Path) -> Vec<DirEntry> {
        self.count();

        let read_dir = match fs::read_dir(path) {
            Ok(read_dir) => read_dir,
            Err(e) => fatal("list_directory", path, &e),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => fatal("list_directory", path, &e),
            };
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => fatal("list_directory", &entry.path(), &e),
            };
            entries.push(DirEntry {
                name: entry.file_name(),
                is_dir: file_type.is_dir(),
            });
        }

        entries
    }

    fn op_count(&self) -> u64 {
        self.ops.load(Ordering::SeqCst)
    }
}
