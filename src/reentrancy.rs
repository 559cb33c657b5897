//! Debug-only reentrancy check.
//!
//! Table operations run user code through the hash and equality policies
//! while chains are being probed or relinked. Re-entering the same table
//! from inside that code would observe (or corrupt) a half-mutated
//! structure, so debug builds detect it and panic. Release builds compile
//! the check away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table flag guarding public entry points. Also pins the owner to a
/// single thread: the raw-pointer `PhantomData` makes it `!Send + !Sync`.
#[derive(Debug, Default)]
pub struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    entered: Cell<bool>,
    _single_thread: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            entered: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Mark the table as busy until the returned guard drops. Panics in
    /// debug builds if it is already busy.
    #[inline]
    pub fn enter(&self) -> EntryGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.entered.replace(true),
                "reentrant call into a table that is mid-operation"
            );
            return EntryGuard { check: self };
        }

        #[cfg(not(debug_assertions))]
        {
            EntryGuard { _life: PhantomData }
        }
    }
}

/// RAII token returned by [`ReentrancyCheck::enter`].
pub struct EntryGuard<'a> {
    #[cfg(debug_assertions)]
    check: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _life: PhantomData<&'a ()>,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.check.entered.set(false);
    }
}
