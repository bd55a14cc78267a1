//! Shared infrastructure utilities for mindmatter.
//!
//! Cross-cutting helpers that don't belong in the domain-pure
//! `mindmatter-types` crate:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write, atomic_write_with_options,
    move_aside, recover_bak_file,
};
