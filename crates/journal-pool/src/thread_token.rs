// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-thread allocation tokens.
//!
//! The pool's CAS fields (`slot.allocation`, `entry.lock_owner`) need a
//! process-unique, non-zero integer per thread to serve as both the CAS
//! target and the ownership check. `std::thread::ThreadId` has no stable
//! integer representation, so we mint our own: a global counter handed out
//! once per OS thread and cached in thread-local storage.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel meaning "no thread owns this" for both `allocation` and
/// `lock_owner` fields.
pub const UNALLOCATED: u64 = 0;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TOKEN: u64 = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
}

/// This thread's stable, process-unique, non-zero token.
pub fn current() -> u64 {
    TOKEN.with(|t| *t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn token_is_stable_within_a_thread() {
        assert_eq!(current(), current());
    }

    #[test]
    fn tokens_never_collide_with_unallocated() {
        assert_ne!(current(), UNALLOCATED);
    }

    #[test]
    fn distinct_threads_get_distinct_tokens() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(current)).collect();
        let tokens: HashSet<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(tokens.len(), 8);
    }
}
