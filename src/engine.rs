//! Engine Module
//!
//! Thread-safe front for a single storage root.
//!
//! ## Responsibilities
//! - Open the storage root described by a [`Config`]
//! - Serialize all calls into the underlying [`FileStorage`]
//! - Route protocol commands to storage operations

use std::collections::BTreeSet;
use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{encode_key_list, Command};
use crate::storage::FileStorage;

/// The main storage engine
///
/// ## Concurrency Model: Fully Serialized
///
/// `FileStorage` has no internal synchronization, so every call (reads
/// included) takes the same mutex. Operations are short, blocking, and
/// never suspend; there is no background activity.
///
/// One `Engine` per root per process. Nothing guards against a second
/// process opening the same root.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The single owner of the storage root
    storage: Mutex<FileStorage>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// No recovery pass: whatever a previous (possibly crashed) process
    /// left behind is served as-is.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let storage = FileStorage::open(&config.root_dir, config.storage_depth);

        Ok(Self {
            config,
            storage: Mutex::new(storage),
        })
    }

    /// Open with a path and depth (convenience method)
    ///
    /// Uses default config for everything else
    pub fn open_path(path: &Path, depth: usize) -> Result<Self> {
        let config = Config::builder()
            .root_dir(path)
            .storage_depth(depth)
            .build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Returns the reply payload: the value for LOOKUP, the encoded key
    /// list for SCAN, `None` otherwise.
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Lookup { key } => self.lookup(&key).map(Some),
            Command::Create { key, value } => {
                self.create(&key, &value)?;
                Ok(None)
            }
            Command::Update { key, value } => {
                self.update(&key, &value)?;
                Ok(None)
            }
            Command::Scan => Ok(Some(encode_key_list(self.scan()))),
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    /// Read the value stored under `key`
    pub fn lookup(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.storage.lock().lookup_entry(key)
    }

    /// Whether an entry exists for `key`
    pub fn contains(&self, key: &[u8]) -> bool {
        self.storage.lock().contains_entry(key)
    }

    /// Store a new entry; never overwrites
    pub fn create(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.storage.lock().create_entry(key, value)
    }

    /// Replace the value of an existing entry
    pub fn update(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.storage.lock().update_entry(key, value)
    }

    /// Every stored key, in ascending order
    pub fn scan(&self) -> BTreeSet<Vec<u8>> {
        self.storage.lock().scan()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the storage root path
    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }

    /// Get the sharding depth
    pub fn storage_depth(&self) -> usize {
        self.config.storage_depth
    }

    /// Filesystem primitives issued so far
    pub fn op_count(&self) -> u64 {
        self.storage.lock().op_count()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
