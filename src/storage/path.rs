//! Path Codec
//!
//! Maps byte-string keys onto the shard tree and back. Pure functions of
//! the key and the configured depth, no I/O.
//!
//! ## Encoding (depth D)
//! ```text
//! key = b0 b1 ... bn-1
//!
//! n >  D:  hex(b0)/hex(b1)/.../hex(bD-1)/+c0/+c1/.../ck
//! n == D:  hex(b0)/hex(b1)/.../hex(bD-1)/_
//! n <  D:  hex(b0)/.../hex(bn-1)/_
//!
//! c0 .. ck = hex(bD..bn-1) cut into CHUNK_HEX_LEN-character pieces
//! ```
//!
//! Every shard directory name is exactly two lowercase hex characters.
//! A remainder longer than one chunk spills into chunk directories: each
//! holds exactly one full chunk behind a `+` marker, and the last (possibly
//! short) chunk names the entry file. File names stay within 255 bytes for
//! keys of any length.
//!
//! The sentinel `_` is never valid hex, so a short key's file can never be
//! confused with the shard directory of a longer key sharing its prefix.
//! Temporary write artifacts append `.tmp`, which no entry name contains.

use std::path::{Path, PathBuf};

/// Filename of an entry whose key is fully consumed by the directory levels
pub const SENTINEL: &str = "_";

/// Suffix marking a not-yet-committed write
pub const TEMP_SUFFIX: &str = ".tmp";

/// Marker prefixed to a chunk directory name
pub const CHUNK_MARKER: char = '+';

/// Hex characters per remainder chunk (120 key bytes)
pub const CHUNK_HEX_LEN: usize = 240;

/// Location of a key in the shard tree, relative to the storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPath {
    /// Shard directory names, outermost first, then any chunk directories
    pub components: Vec<String>,

    /// Entry file name inside the innermost directory
    pub filename: String,
}

impl EncodedPath {
    /// Directory holding the entry
    pub fn directory(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        dir.extend(&self.components);
        dir
    }

    /// Full path of the entry file
    pub fn file(&self, root: &Path) -> PathBuf {
        self.directory(root).join(&self.filename)
    }

    /// Full path of the temporary artifact used to write the entry
    pub fn temporary_file(&self, root: &Path) -> PathBuf {
        self.directory(root).join(temporary_name(&self.filename))
    }
}

/// Stateless key ↔ path translation for a fixed sharding depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    depth: usize,
}

impl PathCodec {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    /// Number of shard directory levels
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Encode a key into its directories and file name
    pub fn encode(&self, key: &[u8]) -> EncodedPath {
        let split = key.len().min(self.depth);

        let mut components: Vec<String> = key[..split]
            .iter()
            .map(|byte| hex::encode([*byte]))
            .collect();

        if key.len() <= self.depth {
            return EncodedPath {
                components,
                filename: SENTINEL.to_string(),
            };
        }

        let mut remainder = hex::encode(&key[split..]);
        while remainder.len() > CHUNK_HEX_LEN {
            let rest = remainder.split_off(CHUNK_HEX_LEN);
            components.push(chunk_directory_name(&remainder));
            remainder = rest;
        }

        EncodedPath {
            components,
            filename: remainder,
        }
    }

    /// Decode a location back into its key
    ///
    /// Returns `None` for anything that is not an entry: temporary
    /// artifacts, foreign files, and names at a level where they could
    /// never have been produced by [`PathCodec::encode`].
    pub fn decode<S: AsRef<str>>(&self, components: &[S], filename: &str) -> Option<Vec<u8>> {
        let (shards, chunks) = components.split_at(components.len().min(self.depth));

        let mut key = Vec::with_capacity(shards.len() + (chunks.len() + 1) * CHUNK_HEX_LEN / 2);
        for shard in shards {
            key.push(shard_byte(shard.as_ref())?);
        }

        if filename == SENTINEL {
            return chunks.is_empty().then_some(key);
        }

        // Hex-named entries only live at or below the bottom shard level
        if shards.len() < self.depth {
            return None;
        }

        for chunk in chunks {
            key.extend(chunk_bytes(chunk.as_ref())?);
        }

        if filename.len() > CHUNK_HEX_LEN {
            return None;
        }
        key.extend(decode_lower_hex(filename)?);
        Some(key)
    }
}

/// Byte value of a shard directory name, if it is one
pub fn shard_byte(name: &str) -> Option<u8> {
    if name.len() != 2 {
        return None;
    }
    decode_lower_hex(name).map(|bytes| bytes[0])
}

/// Key bytes carried by a chunk directory name, if it is one
pub fn chunk_bytes(name: &str) -> Option<Vec<u8>> {
    let hex = name.strip_prefix(CHUNK_MARKER)?;
    if hex.len() != CHUNK_HEX_LEN {
        return None;
    }
    decode_lower_hex(hex)
}

/// Whether a file name marks a temporary write artifact
pub fn is_temporary(name: &str) -> bool {
    name.ends_with(TEMP_SUFFIX)
}

/// Temporary artifact name for an entry file name
pub fn temporary_name(filename: &str) -> String {
    format!("{}{}", filename, TEMP_SUFFIX)
}

fn chunk_directory_name(chunk: &str) -> String {
    format!("{}{}", CHUNK_MARKER, chunk)
}

/// Strict inverse of `hex::encode`: non-empty, even length, lowercase only
fn decode_lower_hex(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || s.len() % 2 != 0 {
        return None;
    }
    if !s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    hex::decode(s).ok()
}
