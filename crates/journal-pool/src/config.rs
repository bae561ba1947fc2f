// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Journal configuration collaborator.
//!
//! Resolves journal names to on-disk locations and reports existence. The
//! pool depends on this only through [`JournalConfig`]; opening the journal
//! itself is the [`crate::reader::JournalReader`] collaborator's job.

use std::path::{Path, PathBuf};

/// Result of an existence check against the configuration's journal base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistsResult {
    /// A journal directory was found for this name.
    Exists,
    /// No journal directory exists for this name.
    DoesNotExist,
}

/// Metadata resolved for a named journal: its on-disk partition directory.
#[derive(Debug, Clone)]
pub struct JournalMetadata {
    /// Journal name as given to `reader(name)`.
    pub name: String,
    /// Directory containing this journal's partition files.
    pub path: PathBuf,
}

/// Collaborator contract: resolve journal names to on-disk metadata.
///
/// Implementations must be safe to call concurrently from many threads;
/// the pool never mutates shared state through this trait itself.
pub trait JournalConfig: Send + Sync {
    /// Check whether `name` has an on-disk presence under [`Self::journal_base`].
    fn exists(&self, name: &str) -> ExistsResult;

    /// Resolve metadata for an existing journal.
    fn read_metadata(&self, name: &str) -> crate::error::Result<JournalMetadata>;

    /// Create metadata for a journal keyed by `key` that does not yet exist
    /// on disk (used by writers; the pool only reads it back via
    /// [`Self::read_metadata`]).
    fn create_metadata(&self, key: &str) -> crate::error::Result<JournalMetadata>;

    /// Root directory under which all journals for this pool live.
    fn journal_base(&self) -> &Path;
}

/// Filesystem-backed [`JournalConfig`]: a journal named `n` lives at
/// `journal_base/n`.
#[derive(Debug, Clone)]
pub struct FsJournalConfig {
    base: PathBuf,
}

impl FsJournalConfig {
    /// Root all journal name lookups at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl JournalConfig for FsJournalConfig {
    fn exists(&self, name: &str) -> ExistsResult {
        if self.base.join(name).is_dir() {
            ExistsResult::Exists
        } else {
            ExistsResult::DoesNotExist
        }
    }

    fn read_metadata(&self, name: &str) -> crate::error::Result<JournalMetadata> {
        let path = self.base.join(name);
        if !path.is_dir() {
            return Err(crate::error::PoolError::NotFound(name.to_string()));
        }
        Ok(JournalMetadata {
            name: name.to_string(),
            path,
        })
    }

    fn create_metadata(&self, key: &str) -> crate::error::Result<JournalMetadata> {
        let path = self.base.join(key);
        std::fs::create_dir_all(&path).map_err(|e| {
            crate::error::PoolError::OpenFailed(key.to_string(), Box::new(e))
        })?;
        Ok(JournalMetadata {
            name: key.to_string(),
            path,
        })
    }

    fn journal_base(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_journal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = FsJournalConfig::new(dir.path());
        assert_eq!(cfg.exists("nope"), ExistsResult::DoesNotExist);
        assert!(cfg.read_metadata("nope").is_err());
    }

    #[test]
    fn create_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = FsJournalConfig::new(dir.path());
        let created = cfg.create_metadata("j").expect("create");
        assert_eq!(cfg.exists("j"), ExistsResult::Exists);
        let read = cfg.read_metadata("j").expect("read");
        assert_eq!(created.path, read.path);
    }
}
