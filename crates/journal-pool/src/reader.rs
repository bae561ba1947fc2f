// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Journal reader collaborator.
//!
//! Opening a journal mmaps its partition file(s) and initializes per-column
//! state; the pool treats this as an expensive, external operation it only
//! calls through [`JournalReader`]. Query execution against an opened
//! reader is handled elsewhere, not by this crate.

use crate::config::JournalMetadata;
use crate::error::{PoolError, Result};
use memmap2::Mmap;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Collaborator contract for opening, refreshing and closing a journal.
///
/// `open` is the expensive constructor the pool amortizes; `refresh` must
/// be cheap enough to run on every reuse (it only needs to observe newly
/// appended data, not re-resolve metadata).
pub trait JournalReader: Send + Sync {
    /// Open a reader bound to `metadata`, mmapping its partition data.
    fn open(metadata: &JournalMetadata) -> Result<Self>
    where
        Self: Sized;

    /// Re-read any data appended to the journal since the last open/refresh.
    fn refresh(&self) -> Result<()>;

    /// Release the underlying mapping and file descriptor.
    fn close(&self) -> Result<()>;
}

/// Default [`JournalReader`]: memory-maps a single `data.bin` partition
/// file inside the journal's directory.
///
/// Real time-series journals shard data across many partition files and
/// maintain symbol tables and column indexes; this reader stands in for
/// that machinery so the pool's acquire/release protocol can be exercised
/// end-to-end without a full storage engine.
pub struct MmapJournalReader {
    data_path: PathBuf,
    mapping: Mutex<Option<Mmap>>,
}

impl MmapJournalReader {
    fn map_current_file(data_path: &PathBuf) -> Result<Option<Mmap>> {
        let file = OpenOptions::new()
            .read(true)
            .open(data_path)
            .map_err(|e| PoolError::OpenFailed(data_path.display().to_string(), Box::new(e)))?;
        let len = file
            .metadata()
            .map_err(|e| PoolError::OpenFailed(data_path.display().to_string(), Box::new(e)))?
            .len();
        if len == 0 {
            // An empty partition file has nothing to map; mmap of a
            // zero-length file is not portable, so skip it.
            return Ok(None);
        }
        // SAFETY: the file is exclusively ours for the duration of the
        // mapping call and is not concurrently truncated by this process;
        // cross-process truncation during a held mapping is a documented
        // hazard of mmap and is guarded at a higher level by pool `lock()`.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| PoolError::OpenFailed(data_path.display().to_string(), Box::new(e)))?;
        Ok(Some(mmap))
    }

    /// Number of mapped bytes currently visible, or 0 if nothing is mapped.
    pub fn mapped_len(&self) -> usize {
        self.mapping.lock().as_ref().map_or(0, Mmap::len)
    }
}

impl JournalReader for MmapJournalReader {
    fn open(metadata: &JournalMetadata) -> Result<Self> {
        let data_path = metadata.path.join("data.bin");
        if !data_path.exists() {
            OpenOptions::new()
                .create(true)
                .write(true)
                .open(&data_path)
                .map_err(|e| {
                    PoolError::OpenFailed(metadata.name.clone(), Box::new(e))
                })?;
        }
        let mapping = Self::map_current_file(&data_path)?;
        Ok(Self {
            data_path,
            mapping: Mutex::new(mapping),
        })
    }

    fn refresh(&self) -> Result<()> {
        let mapping = Self::map_current_file(&self.data_path)?;
        *self.mapping.lock() = mapping;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.mapping.lock() = None;
        Ok(())
    }
}
