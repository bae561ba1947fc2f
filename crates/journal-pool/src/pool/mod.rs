// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The reader pool: a lock-free bank of cached journal readers.
//!
//! # Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |  ReaderPool (thread-safe, shared via Arc)                      |
//! |  +------------------------------------------------------------+|
//! |  |  DashMap<String, Arc<Entry>>   (name -> head segment)      ||
//! |  |  Entry -> Entry -> ... (chain, grown on contention)         ||
//! |  |  Entry = [Slot; 32], each Slot = (allocation, reader)       ||
//! |  +------------------------------------------------------------+|
//! |                                                                |
//! |  Used by:                                                      |
//! |  - Any consumer thread: reader(name) -> ReaderHandle            |
//! |  - Admin thread: lock(name) / unlock(name)                     |
//! +----------------------------------------------------------------+
//! ```

mod entry;
mod handle;
mod slot;

pub(crate) use entry::{Entry, ENTRY_SIZE};
pub use handle::ReaderHandle;

use crate::config::JournalConfig;
use crate::error::{PoolError, Result};
use crate::journal_key::JournalKey;
use crate::reader::JournalReader;
use crate::thread_token::{self, UNALLOCATED};
use crossbeam::utils::Backoff;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::{DashMap, DashSet};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

/// A deadline value meaning "never evict" -- `release_time` is a monotonic
/// millisecond counter and can never reach `u64::MAX`.
const DEADLINE_FOREVER: u64 = u64::MAX;

/// Reserved allocation token used internally while a slot is being drained
/// by pool shutdown; never handed out as a real thread token (those start
/// at 1 and count up, see [`crate::thread_token`]).
const SHUTDOWN_TOKEN: u64 = u64::MAX;

/// Thread-safe pool of journal readers.
///
/// See the module docs for the overall architecture this implements: the
/// acquire/release/lock/unlock/close protocol described below.
pub struct ReaderPool<R: JournalReader, C: JournalConfig> {
    entries: DashMap<String, Arc<Entry<R>>>,
    known_entries: DashSet<u64>,
    closed: AtomicBool,
    next_entry_id: AtomicU64,
    max_segments: u32,
    config: C,
    epoch: Instant,
    /// Non-owning back-reference handed to every [`ReaderHandle`] this pool
    /// mints, so a handle can reach the pool again on `close()` without the
    /// pool's own lifetime being tied to handles it has given out.
    self_weak: Weak<Self>,
    _reader: PhantomData<R>,
}

impl<R: JournalReader, C: JournalConfig> ReaderPool<R, C> {
    /// Build a new pool over `config`, capping each name's segment chain
    /// at `max_segments` entries (`max_segments * 32` slots).
    pub fn new(config: C, max_segments: u32) -> Arc<Self> {
        Arc::new_cyclic(|self_weak| Self {
            entries: DashMap::new(),
            known_entries: DashSet::new(),
            closed: AtomicBool::new(false),
            next_entry_id: AtomicU64::new(0),
            max_segments,
            config,
            epoch: Instant::now(),
            self_weak: self_weak.clone(),
            _reader: PhantomData,
        })
    }

    /// Total slot capacity per journal name: `max_segments * 32`.
    pub fn max_entries(&self) -> usize {
        self.max_segments as usize * ENTRY_SIZE
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn new_entry(&self, index: u32) -> Arc<Entry<R>> {
        let id = self.next_entry_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(Entry::new(id, index));
        self.known_entries.insert(id);
        entry
    }

    /// Find or create the head entry for `name`, running the on-disk
    /// existence check only if this call is the one that installs it.
    fn head_for(&self, name: &str) -> Result<Arc<Entry<R>>> {
        match self.entries.entry(name.to_string()) {
            MapEntry::Occupied(occ) => Ok(occ.get().clone()),
            MapEntry::Vacant(vac) => {
                let fresh = self.new_entry(0);
                let head = vac.insert(fresh).clone();
                if self.config.exists(name) == crate::config::ExistsResult::DoesNotExist {
                    return Err(PoolError::NotFound(name.to_string()));
                }
                Ok(head)
            }
        }
    }

    /// Acquire a reader, opening or refreshing it as needed.
    ///
    /// Accepts anything convertible to a [`JournalKey`]: a bare name
    /// (`reader("trades")`), an already-resolved [`JournalKey`]
    /// (`reader(key)`), a `(class, name)` pair, or a `(class, name, hint)`
    /// triple -- the Rust collapse of the spec's four overloaded forms into
    /// one generic entry point.
    pub fn reader(&self, locator: impl Into<JournalKey>) -> Result<ReaderHandle<R, C>> {
        let key = locator.into();
        let name = key.resolved_name();

        if self.closed.load(Ordering::Acquire) {
            return Err(PoolError::PoolClosed);
        }

        let head = self.head_for(&name)?;

        if let Some(hint) = &key.hint {
            log::debug!("reader pool: acquiring {name} with hint {hint}");
        }

        if head.lock_owner.load(Ordering::Acquire) != UNALLOCATED {
            return Err(PoolError::Locked(name.to_string()));
        }

        let token = thread_token::current();
        let backoff = Backoff::new();
        let mut current = head;

        loop {
            for (index, slot) in current.slots.iter().enumerate() {
                if slot
                    .allocation
                    .compare_exchange(UNALLOCATED, token, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    return self.open_or_refresh(&name, &current, index);
                }
            }

            current = self.advance_or_grow(&name, &current, &backoff)?;
        }
    }

    fn open_or_refresh(
        &self,
        name: &str,
        entry: &Arc<Entry<R>>,
        index: usize,
    ) -> Result<ReaderHandle<R, C>> {
        let slot = &entry.slots[index];

        let reader = match slot.cached_reader() {
            Some(existing) => {
                if let Err(e) = existing.refresh() {
                    slot.allocation.store(UNALLOCATED, Ordering::Release);
                    return Err(e);
                }
                existing
            }
            None => {
                let metadata = match self.config.read_metadata(name) {
                    Ok(m) => m,
                    Err(e) => {
                        slot.allocation.store(UNALLOCATED, Ordering::Release);
                        return Err(e);
                    }
                };
                match R::open(&metadata) {
                    Ok(opened) => {
                        let opened = Arc::new(opened);
                        slot.reader.store(Some(opened.clone()));
                        opened
                    }
                    Err(e) => {
                        slot.allocation.store(UNALLOCATED, Ordering::Release);
                        return Err(e);
                    }
                }
            }
        };

        if self.closed.load(Ordering::Acquire) {
            // The pool finished shutting down between our CAS and here; the
            // caller owns this reader outright and must free it directly.
            return Ok(ReaderHandle::new(reader, entry.clone(), index, None));
        }

        Ok(ReaderHandle::new(
            reader,
            entry.clone(),
            index,
            Some(self.self_weak.clone()),
        ))
    }

    /// Move to the next entry in the chain, growing it if we're at the
    /// last published entry and it's full.
    fn advance_or_grow(
        &self,
        name: &str,
        entry: &Arc<Entry<R>>,
        backoff: &Backoff,
    ) -> Result<Arc<Entry<R>>> {
        if let Some(next) = entry.next() {
            return Ok(next);
        }

        if entry.index + 1 >= self.max_segments {
            return Err(PoolError::PoolFull(name.to_string()));
        }

        if entry.claim_growth() {
            let successor = self.new_entry(entry.index + 1);
            entry.publish_next(successor.clone());
            log::debug!(
                "reader pool: grew segment chain for {name} to index {}",
                successor.index
            );
            Ok(successor)
        } else {
            loop {
                if let Some(next) = entry.next() {
                    return Ok(next);
                }
                backoff.snooze();
            }
        }
    }

    /// Release-interceptor logic invoked by [`ReaderHandle::close`].
    ///
    /// Returns `true` if the caller must actually free the reader, `false`
    /// if the pool has retained it for reuse.
    pub(crate) fn release(&self, home: &Arc<Entry<R>>, slot_index: usize, _reader: &Arc<R>) -> bool {
        if !self.known_entries.contains(&home.id) {
            log::error!(
                "reader pool: release of foreign reader handle (entry {} not registered)",
                home.id
            );
            return true;
        }

        let token = thread_token::current();
        let slot = &home.slots[slot_index];

        if slot.allocation.load(Ordering::Acquire) != token {
            log::error!(
                "reader pool: release from non-owning thread for entry {} slot {slot_index}",
                home.id
            );
            return true;
        }

        if self.closed.load(Ordering::Acquire) {
            slot.reader.store(None);
            return true;
        }

        slot.release_time.store(self.now_millis(), Ordering::Release);
        slot.allocation.store(UNALLOCATED, Ordering::Release);
        false
    }

    /// Administrative exclusion: drain every slot for `name` so an
    /// out-of-band operation (truncate, rename, rebuild) can safely mutate
    /// the journal's on-disk files.
    pub fn lock(&self, name: &str) -> Result<()> {
        let Some(head) = self.entries.get(name).map(|e| e.clone()) else {
            return Ok(());
        };

        let token = thread_token::current();
        match head
            .lock_owner
            .compare_exchange(UNALLOCATED, token, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(current) if current == token => {}
            Err(_) => return Err(PoolError::Locked(name.to_string())),
        }

        let mut current = head;
        loop {
            for slot in &current.slots {
                match slot.allocation.compare_exchange(
                    UNALLOCATED,
                    token,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => {
                        if let Some(reader) = slot.reader.swap(None) {
                            if let Err(e) = reader.close() {
                                log::warn!("reader pool: error closing reader during lock({name}): {e}");
                            }
                        }
                    }
                    Err(current) if current == token => {
                        // Already reclaimed by an earlier retry of this same
                        // lock() call chain: our own token means we drained
                        // it ourselves and left it allocated to keep it
                        // excluded. Nothing left to do.
                    }
                    Err(_) => {
                        // Some other thread holds this slot -- either a
                        // settled borrower or an acquirer still mid-open
                        // between claiming the slot and storing its reader.
                        // Either way we cannot tell the slot is quiesced, so
                        // we must not report success; back off and retry.
                        return Err(PoolError::Retry(name.to_string()));
                    }
                }
            }

            match current.next() {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(())
    }

    /// Release the administrative exclusion on `name`.
    ///
    /// A no-op if the calling thread is not the lock holder. Removal is
    /// safe because a successful `lock` guarantees no other thread retained
    /// a slot with a live reader.
    pub fn unlock(&self, name: &str) {
        let token = thread_token::current();
        let Some(head) = self.entries.get(name).map(|e| e.clone()) else {
            return;
        };
        if head.lock_owner.load(Ordering::Acquire) == token {
            self.entries.remove(name);
        }
    }

    /// Idempotently shut the pool down, closing every cached reader.
    pub fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.release_all(DEADLINE_FOREVER);
    }

    /// Evict every cached reader whose `release_time` precedes `deadline`.
    ///
    /// `close()` calls this with [`DEADLINE_FOREVER`]. Exposed internally
    /// as the primitive a future TTL-based eviction policy would build on;
    /// not part of the public surface.
    fn release_all(&self, deadline: u64) {
        for entry in self.entries.iter() {
            let mut current = entry.value().clone();
            loop {
                for slot in &current.slots {
                    if slot.cached_reader().is_none() {
                        continue;
                    }
                    // re-read release_time post-CAS so a finite, moving
                    // deadline observes the latest value; always true while
                    // deadline is DEADLINE_FOREVER.
                    if slot
                        .allocation
                        .compare_exchange(
                            UNALLOCATED,
                            SHUTDOWN_TOKEN,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        if slot.release_time.load(Ordering::Acquire) < deadline {
                            if let Some(reader) = slot.reader.swap(None) {
                                if let Err(e) = reader.close() {
                                    log::warn!("reader pool: error closing reader during shutdown: {e}");
                                }
                            }
                        }
                        slot.allocation.store(UNALLOCATED, Ordering::Release);
                    }
                }
                match current.next() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
    }
}
