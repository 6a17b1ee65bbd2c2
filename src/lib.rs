//! # ctstore
//!
//! A crash-safe, directory-sharded key-value store for log server state:
//! - One file per entry, sharded by key prefix
//! - Atomic write-temp / fsync / rename commits, no recovery pass
//! - Countable, interceptable filesystem primitives for crash testing
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Fixed worker pool, busy refusal)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │                 (Serialized by a Mutex)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     FileStorage                              │
//! │        create / update / lookup / scan over PathCodec        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  FilesystemOp layer                          │
//! │        Basic (counting)  │  Failing (abort at op #k)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fsop;
pub mod storage;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use engine::Engine;
pub use storage::FileStorage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ctstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
