//! File Storage
//!
//! The crash-safe entry store: one file per entry in the shard tree,
//! written with the write-temp-then-rename protocol.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::fsop::{fatal, BasicFilesystemOp, FilesystemOp};

use super::path::{chunk_bytes, shard_byte, EncodedPath, PathCodec};

/// Directory-sharded, crash-safe key-value store
///
/// ## Write Protocol
/// ```text
/// create_entry / update_entry
///   1. ensure_directory   (create only: each level, then sync its parent)
///   2. write_new_file     <entry>.tmp
///   3. sync_file          <entry>.tmp
///   4. rename             <entry>.tmp → <entry>
///   5. sync_directory     containing directory
/// ```
///
/// An interruption before step 4 leaves at most an orphaned `.tmp` file,
/// which lookups and scans never see. From step 4 on, the entry is
/// complete. Opening a root needs no recovery pass.
///
/// ## Concurrency
/// Not internally synchronized. Mutations take `&mut self`; share an
/// instance across threads through [`crate::Engine`]. Only one process may
/// use a given root at a time.
pub struct FileStorage<F: FilesystemOp = BasicFilesystemOp> {
    /// Storage root directory
    root: PathBuf,

    /// Key ↔ path translation
    codec: PathCodec,

    /// Every mutation goes through here
    fs: F,
}

impl FileStorage<BasicFilesystemOp> {
    /// Open (or create) a storage root with the production filesystem layer
    pub fn open(root: impl Into<PathBuf>, depth: usize) -> Self {
        Self::with_filesystem(root, depth, BasicFilesystemOp::new())
    }
}

impl<F: FilesystemOp> FileStorage<F> {
    /// Open (or create) a storage root on top of the given filesystem layer
    ///
    /// `depth` must match the depth the root was first used with.
    pub fn with_filesystem(root: impl Into<PathBuf>, depth: usize, fs: F) -> Self {
        let root = root.into();
        fs.ensure_directory(&root);

        tracing::info!(
            "File storage opened at {} (depth {})",
            root.display(),
            depth
        );

        Self {
            root,
            codec: PathCodec::new(depth),
            fs,
        }
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    /// Read the value stored under `key`
    ///
    /// Returns `Err(StoreError::NotFound)` if no entry exists.
    pub fn lookup_entry(&self, key: &[u8]) -> Result<Vec<u8>> {
        let path = self.codec.encode(key).file(&self.root);
        match fs::read(&path) {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => fatal("lookup_entry", &path, &e),
        }
    }

    /// Whether an entry exists for `key`, without reading its value
    pub fn contains_entry(&self, key: &[u8]) -> bool {
        let path = self.codec.encode(key).file(&self.root);
        Self::entry_file_exists(&path)
    }

    /// Store a new entry
    ///
    /// Returns `Err(StoreError::EntryAlreadyExists)` without touching the
    /// stored value if `key` is already present.
    pub fn create_entry(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let encoded = self.codec.encode(key);
        if Self::entry_file_exists(&encoded.file(&self.root)) {
            return Err(StoreError::EntryAlreadyExists);
        }

        self.ensure_directories(&encoded);
        self.commit(&encoded, value);

        tracing::debug!(
            "Created entry {} ({} bytes)",
            hex::encode(key),
            value.len()
        );
        Ok(())
    }

    /// Replace the value of an existing entry
    ///
    /// Returns `Err(StoreError::NotFound)` and changes nothing if `key` is
    /// absent.
    pub fn update_entry(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if !self.contains_entry(key) {
            return Err(StoreError::NotFound);
        }

        let encoded = self.codec.encode(key);
        self.commit(&encoded, value);

        tracing::debug!(
            "Updated entry {} ({} bytes)",
            hex::encode(key),
            value.len()
        );
        Ok(())
    }

    /// Enumerate every stored key
    ///
    /// Temporary artifacts and any foreign files in the tree are skipped.
    pub fn scan(&self) -> BTreeSet<Vec<u8>> {
        let mut keys = BTreeSet::new();
        let mut components = Vec::with_capacity(self.codec.depth());
        self.scan_directory(&self.root, &mut components, &mut keys);

        tracing::debug!("Scan found {} entries", keys.len());
        keys
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sharding depth
    pub fn depth(&self) -> usize {
        self.codec.depth()
    }

    /// The path codec in use
    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    /// The filesystem layer in use
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Filesystem primitives issued so far (including by `open`)
    pub fn op_count(&self) -> u64 {
        self.fs.op_count()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn entry_file_exists(path: &Path) -> bool {
        match fs::symlink_metadata(path) {
            Ok(metadata) => metadata.is_file(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => fatal("lookup_entry", path, &e),
        }
    }

    /// Create the directory chain, one level at a time
    ///
    /// Every parent is synced even when the level already existed: it may
    /// have been left behind by a process that crashed before syncing it.
    fn ensure_directories(&self, encoded: &EncodedPath) {
        let mut dir = self.root.clone();
        for component in &encoded.components {
            let parent = dir.clone();
            dir.push(component);
            self.fs.ensure_directory(&dir);
            self.fs.sync_directory(&parent);
        }
    }

    /// Write `value` to a temporary artifact and atomically move it into place
    fn commit(&self, encoded: &EncodedPath, value: &[u8]) {
        let dir = encoded.directory(&self.root);
        let tmp = encoded.temporary_file(&self.root);
        let target = encoded.file(&self.root);

        let file = self.fs.write_new_file(&tmp, value);
        self.fs.sync_file(&file, &tmp);
        drop(file);

        self.fs.rename(&tmp, &target);
        self.fs.sync_directory(&dir);
    }

    fn scan_directory(
        &self,
        dir: &Path,
        components: &mut Vec<String>,
        keys: &mut BTreeSet<Vec<u8>>,
    ) {
        for entry in self.fs.list_directory(dir) {
            // Non-UTF-8 names are never produced by the codec
            let Some(name) = entry.name.to_str() else {
                continue;
            };

            if entry.is_dir {
                let descend = if components.len() < self.codec.depth() {
                    shard_byte(name).is_some()
                } else {
                    chunk_bytes(name).is_some()
                };
                if descend {
                    components.push(name.to_string());
                    self.scan_directory(&dir.join(name), components, keys);
                    components.pop();
                }
            } else if let Some(key) = self.codec.decode(components, name) {
                keys.insert(key);
            }
        }
    }
}
