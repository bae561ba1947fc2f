// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A single pool slot: the unit of CAS-based allocation.

use crate::reader::JournalReader;
use crate::thread_token::UNALLOCATED;
use arc_swap::ArcSwapOption;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// One of [`super::entry::ENTRY_SIZE`] cells in an [`super::entry::Entry`].
///
/// `allocation` is the synchronization point: a successful CAS from
/// [`UNALLOCATED`] to a thread token grants that thread exclusive ownership
/// until it CASes back to [`UNALLOCATED`]. `reader` is lazily populated on
/// first successful allocation and retained across releases.
pub(crate) struct Slot<R: JournalReader> {
    pub(crate) allocation: AtomicU64,
    pub(crate) release_time: AtomicU64,
    pub(crate) reader: ArcSwapOption<R>,
}

impl<R: JournalReader> Slot<R> {
    pub(crate) fn new() -> Self {
        Self {
            allocation: AtomicU64::new(UNALLOCATED),
            release_time: AtomicU64::new(0),
            reader: ArcSwapOption::from(None),
        }
    }

    pub(crate) fn cached_reader(&self) -> Option<Arc<R>> {
        self.reader.load_full()
    }
}
