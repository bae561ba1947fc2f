// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # journal-pool
//!
//! A thread-safe pool of memory-mapped journal readers.
//!
//! Opening a time-series journal is expensive: it resolves metadata, mmaps
//! partition files, and initializes per-column indexes. This crate caches
//! opened readers across many concurrent consumer threads under a strict
//! ownership discipline -- each handed-out reader is exclusively owned by
//! exactly one thread until returned, and returned readers stay resident
//! for reuse rather than being closed.
//!
//! ## Quick start
//!
//! ```no_run
//! use journal_pool::{FsJournalConfig, MmapJournalReader, ReaderPool};
//!
//! let config = FsJournalConfig::new("/var/lib/journals");
//! let pool = ReaderPool::<MmapJournalReader, FsJournalConfig>::new(config, 4);
//!
//! let handle = pool.reader("trades")?;
//! // ... read from `handle` via its Deref<Target = MmapJournalReader> ...
//! handle.close()?;
//! # Ok::<(), journal_pool::PoolError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                     Application Layer                      |
//! |            consumer threads <-> ReaderPool::reader()        |
//! +-------------------------------------------------------------+
//! |                        Pool Layer                           |
//! |   Name map (DashMap) -> Segment chain -> Slot (CAS alloc)   |
//! +-------------------------------------------------------------+
//! |                     Collaborator Layer                      |
//! |   JournalConfig (name -> path)  |  JournalReader (mmap)     |
//! +-------------------------------------------------------------+
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - the pool itself: acquire/release/lock/unlock/close
//! - [`config`] - the `JournalConfig` collaborator
//! - [`reader`] - the `JournalReader` collaborator
//! - [`error`] - the pool's error taxonomy
//! - [`JournalKey`] - locator accepted by `reader()`, generalizing the
//!   `reader(name)` / `reader(key)` / `reader(class, name)` /
//!   `reader(class, name, hint)` call shapes into one generic method

pub mod config;
pub mod error;
mod journal_key;
pub mod pool;
pub mod reader;
mod thread_token;

pub use config::{ExistsResult, FsJournalConfig, JournalConfig, JournalMetadata};
pub use error::{PoolError, Result};
pub use journal_key::JournalKey;
pub use pool::{ReaderHandle, ReaderPool};
pub use reader::{JournalReader, MmapJournalReader};
