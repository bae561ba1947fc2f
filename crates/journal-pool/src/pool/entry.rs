// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entry (segment): a fixed bank of slots, chained per journal name.

use super::slot::Slot;
use crate::reader::JournalReader;
use crate::thread_token::UNALLOCATED;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

/// Fixed slot count per [`Entry`]. Total capacity per name is
/// `max_segments * ENTRY_SIZE`.
pub(crate) const ENTRY_SIZE: usize = 32;

/// A bank of [`ENTRY_SIZE`] slots, append-only once published.
///
/// Entries for a given journal name form a singly-linked chain with
/// strictly increasing `index`, starting at 0. The chain only grows: once
/// an `Entry` is reachable from a name's head, it exists for the lifetime
/// of the pool even after the name is unlocked and removed from the map.
pub(crate) struct Entry<R: JournalReader> {
    /// Process-unique id, used only to tell a pool's own entries apart from
    /// a handle wired up against a foreign or stale entry.
    pub(crate) id: u64,
    pub(crate) index: u32,
    pub(crate) slots: [Slot<R>; ENTRY_SIZE],
    pub(crate) lock_owner: AtomicU64,
    next_status: AtomicBool,
    next: ArcSwapOption<Entry<R>>,
}

impl<R: JournalReader> Entry<R> {
    pub(crate) fn new(id: u64, index: u32) -> Self {
        Self {
            id,
            index,
            slots: std::array::from_fn(|_| Slot::new()),
            lock_owner: AtomicU64::new(UNALLOCATED),
            next_status: AtomicBool::new(false),
            next: ArcSwapOption::from(None),
        }
    }

    pub(crate) fn next(&self) -> Option<Arc<Entry<R>>> {
        self.next.load_full()
    }

    /// Attempt to become the single writer that grows this entry's chain.
    /// Returns `true` if this call won the claim (the caller must then
    /// construct and publish the successor).
    pub(crate) fn claim_growth(&self) -> bool {
        self.next_status
            .compare_exchange(
                false,
                true,
                std::sync::atomic::Ordering::AcqRel,
                std::sync::atomic::Ordering::Acquire,
            )
            .is_ok()
    }

    /// Publish the successor entry. Must only be called by the thread that
    /// won [`Self::claim_growth`].
    pub(crate) fn publish_next(&self, successor: Arc<Entry<R>>) {
        self.next.store(Some(successor));
    }
}
