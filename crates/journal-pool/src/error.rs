// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors returned by the journal reader pool.
//!
//! Every kind here corresponds to a specific trigger in the acquire/lock
//! protocol; see the variant docs for caller policy (retry vs. terminal).

use std::fmt;

/// Errors surfaced by [`crate::ReaderPool`] operations.
#[derive(Debug)]
pub enum PoolError {
    /// The journal has no on-disk presence at first-install.
    ///
    /// Permanent for this name: the entry stays installed but every
    /// acquisition will keep failing at the open step.
    NotFound(String),
    /// The journal's name is currently administratively locked.
    ///
    /// Retry after a caller-defined backoff.
    Locked(String),
    /// `lock()` found a slot held by another thread and cannot wait for it.
    ///
    /// Retry the `lock` call after backoff; `lock_owner` remains set.
    Retry(String),
    /// The segment chain for this name has grown to `max_segments` and
    /// every slot in every segment is allocated.
    PoolFull(String),
    /// The pool has been closed; no further acquisitions are possible.
    PoolClosed,
    /// The underlying reader constructor failed to open the journal.
    OpenFailed(String, Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::NotFound(name) => write!(f, "journal not found: {name}"),
            PoolError::Locked(name) => write!(f, "journal locked: {name}"),
            PoolError::Retry(name) => write!(f, "lock contended, retry: {name}"),
            PoolError::PoolFull(name) => write!(f, "pool full for journal: {name}"),
            PoolError::PoolClosed => write!(f, "pool is closed"),
            PoolError::OpenFailed(name, cause) => {
                write!(f, "failed to open journal {name}: {cause}")
            }
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::OpenFailed(_, cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
