use std::ops::{Deref, DerefMut};

use crate::state::UnitOfWorkFilterState;
use crate::value::Value;

/// Restores filter state captured when a toggle was issued.
///
/// The guard holds the only mutable borrow of its [`UnitOfWorkFilterState`]
/// and dereferences to it; further toggles, parameter changes and queries go
/// through the guard. Release happens on drop, on every exit path, or
/// explicitly with [`release`](Self::release), which is idempotent.
///
/// Release writes back the values observed when the guard was created, even
/// if something changed them in between. A toggle that did not change a flag
/// (disabling a filter that was already disabled) therefore restores the same
/// value on release.
#[must_use = "dropping a ScopeGuard restores the filters immediately; call `keep()` to persist the change"]
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    state: &'a mut UnitOfWorkFilterState,
    flags: Vec<(usize, bool)>,
    params: Vec<(usize, usize, Value)>,
    released: bool,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn new(
        state: &'a mut UnitOfWorkFilterState,
        flags: Vec<(usize, bool)>,
        params: Vec<(usize, usize, Value)>,
    ) -> Self {
        Self {
            state,
            flags,
            params,
            released: false,
        }
    }

    /// Restore the captured state. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.state.restore(&self.flags, &self.params);
    }

    /// Consume the guard without restoring; the change lasts for the rest of the unit of work.
    pub fn keep(mut self) {
        self.released = true;
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = UnitOfWorkFilterState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
