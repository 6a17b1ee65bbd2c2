//! Storage Module
//!
//! Persistent storage layer: one file per entry in a shard tree.
//!
//! ## Responsibilities
//! - Translate keys to tree locations and back (path codec)
//! - Create and update entries atomically (temp file + rename)
//! - Enumerate all keys without any index or log
//!
//! ## On-Disk Layout (depth 3)
//! ```text
//! {root}/
//!   └── 31/                      key byte 0 = '1'
//!       └── 32/                  key byte 1 = '2'
//!           ├── _                entry for key "12"
//!           └── 33/              key byte 2 = '3'
//!               ├── _            entry for key "123"
//!               ├── 3478797a77   entry for key "1234xyzw"
//!               ├── 3435.tmp     orphaned write for key "12345"
//!               └── +3435...     240-hex-char chunk of a long key's remainder
//!                   └── 3637     entry for that long key
//! ```
//!
//! The tree is the only source of truth. No compaction, no deletion, no
//! reclamation of orphaned `.tmp` files.

mod file_storage;
pub mod path;

pub use file_storage::FileStorage;
pub use path::{EncodedPath, PathCodec};
