//! Open-scope bookkeeping for surfaces.
//!
//! One mutex guards the whole map and is held only while a count changes,
//! never while pixels are written. Nested scopes are reentrant use by the
//! same caller chain; concurrent writers on one surface are not supported.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{trace, warn};
use once_cell::sync::Lazy;

use super::{AccessMode, SurfaceId};

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: usize,
    mode: AccessMode,
}

/// Result of registering one more scope on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    /// True when this scope must physically lock the surface
    pub first: bool,
    /// Mode of the outermost scope, which wins over nested requests
    pub mode: AccessMode,
}

/// Maps surface identity to its number of open scopes
#[derive(Debug, Default)]
pub struct LockRegistry {
    entries: Mutex<HashMap<SurfaceId, Entry>>,
}

static SHARED: Lazy<LockRegistry> = Lazy::new(LockRegistry::new);

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`PixelBuffer::context`](super::PixelBuffer::context)
    pub fn shared() -> &'static Self {
        &SHARED
    }

    // The map is updated in single statements, so a panic elsewhere cannot
    // leave it half-written; recover from poisoning instead of propagating.
    fn entries(&self) -> MutexGuard<'_, HashMap<SurfaceId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn acquire(&self, id: SurfaceId, mode: AccessMode) -> Acquisition {
        let mut entries = self.entries();
        let entry = entries.entry(id).or_insert(Entry { count: 0, mode });
        entry.count += 1;
        trace!("acquire {:?}: {} open", id, entry.count);
        Acquisition {
            first: entry.count == 1,
            mode: entry.mode,
        }
    }

    /// Close one scope. Returns the outermost mode once the count reaches
    /// zero and the surface should be unlocked.
    ///
    /// Releasing more scopes than were acquired is a caller bug; it is
    /// logged and otherwise ignored.
    pub fn release(&self, id: SurfaceId) -> Option<AccessMode> {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(&id) else {
            warn!("release of {:?} without an open scope", id);
            return None;
        };
        entry.count -= 1;
        trace!("release {:?}: {} open", id, entry.count);
        if entry.count > 0 {
            return None;
        }
        entries.remove(&id).map(|e| e.mode)
    }

    /// Number of scopes currently open on `id`
    pub fn open_count(&self, id: SurfaceId) -> usize {
        self.entries().get(&id).map_or(0, |e| e.count)
    }
}
