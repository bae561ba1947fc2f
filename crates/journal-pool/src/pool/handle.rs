// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The borrowed reader handle: a thin wrapper that intercepts `close()`.

use super::entry::Entry;
use super::ReaderPool;
use crate::config::JournalConfig;
use crate::error::Result;
use crate::reader::JournalReader;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// A journal reader borrowed from a [`ReaderPool`].
///
/// Forwards the underlying [`JournalReader`]'s read API via `Deref`. Its
/// [`Self::close`] does not free the underlying reader while the pool is
/// open; instead it returns the slot to the pool for reuse. Abandoning a
/// handle without calling `close()` leaks its slot until the pool itself
/// is closed -- the pool does not reclaim on `Drop`, matching the
/// acquire/release protocol's lack of any cancellation primitive.
#[must_use = "dropping a handle without calling close() leaks its slot until the pool closes"]
pub struct ReaderHandle<R: JournalReader, C: JournalConfig> {
    reader: Option<Arc<R>>,
    home: Arc<Entry<R>>,
    slot_index: usize,
    pool: Option<Weak<ReaderPool<R, C>>>,
}

impl<R: JournalReader, C: JournalConfig> ReaderHandle<R, C> {
    pub(crate) fn new(
        reader: Arc<R>,
        home: Arc<Entry<R>>,
        slot_index: usize,
        pool: Option<Weak<ReaderPool<R, C>>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            home,
            slot_index,
            pool,
        }
    }

    /// The entry this handle's slot belongs to (for diagnostics/tests).
    pub(crate) fn home(&self) -> &Arc<Entry<R>> {
        &self.home
    }

    /// The slot index within [`Self::home`] (for diagnostics/tests).
    pub(crate) fn slot_index(&self) -> usize {
        self.slot_index
    }

    /// The underlying reader this handle wraps (for diagnostics/tests).
    pub(crate) fn reader_arc(&self) -> &Arc<R> {
        self.reader.as_ref().expect("reader handle used after close")
    }

    /// Return this handle to the pool.
    ///
    /// If the pool accepts it back (the common case), the underlying
    /// reader stays cached and open. Otherwise -- a foreign handle, a
    /// handle acquired while the pool was already closing, or misuse where
    /// this thread is not the slot's owner -- the reader is actually
    /// closed here.
    pub fn close(mut self) -> Result<()> {
        let reader = self.reader.take().expect("handle already closed");
        let should_free = match self.pool.take() {
            None => true,
            Some(weak) => match weak.upgrade() {
                Some(pool) => pool.release(&self.home, self.slot_index, &reader),
                None => true,
            },
        };
        if should_free {
            reader.close()
        } else {
            Ok(())
        }
    }
}

impl<R: JournalReader, C: JournalConfig> Deref for ReaderHandle<R, C> {
    type Target = R;

    fn deref(&self) -> &R {
        self.reader
            .as_deref()
            .expect("reader handle used after close")
    }
}
