//! Handle registry: maps integer handles to engine-side objects.
//!
//! Handles are monotonically increasing `isize` values starting from 1.
//! Handle 0 is reserved as the null/error sentinel. The counter survives
//! [`destroy_registry`], so a handle from before a shutdown never names an
//! object allocated after the next init.
//!
//! All operations are `Mutex`-protected. An engine call that touches
//! several objects (clone, cascading release) runs inside one
//! [`with_table`] closure so it observes and leaves a consistent table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Mutex;

use crate::engine::NativeObject;
use crate::error::{BridgeError, Result};
use crate::types::Handle;

/// Global handle registry, initialized by [`init_registry`].
static REGISTRY: Mutex<Option<HandleTable>> = Mutex::new(None);

/// First id handed out by the next table. Only touched under `REGISTRY`.
static NEXT_ID: AtomicIsize = AtomicIsize::new(1);

pub(crate) struct HandleTable {
    objects: HashMap<isize, NativeObject>,
    next_id: isize,
    max_handles: Option<usize>,
}

impl HandleTable {
    fn new(next_id: isize, max_handles: Option<usize>) -> Self {
        Self {
            objects: HashMap::new(),
            next_id,
            max_handles,
        }
    }

    pub(crate) fn insert(&mut self, obj: NativeObject) -> Result<Handle> {
        if let Some(max) = self.max_handles {
            if self.objects.len() >= max {
                return Err(BridgeError::HandleLimit(self.objects.len()));
            }
        }
        let id = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(BridgeError::HandleOverflow)?;
        self.objects.insert(id, obj);
        Handle::from_raw(id).ok_or(BridgeError::HandleOverflow)
    }

    pub(crate) fn get(&self, handle: Handle) -> Result<&NativeObject> {
        self.objects
            .get(&handle.raw())
            .ok_or(BridgeError::InvalidHandle(handle.raw()))
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Result<&mut NativeObject> {
        self.objects
            .get_mut(&handle.raw())
            .ok_or(BridgeError::InvalidHandle(handle.raw()))
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> Result<NativeObject> {
        self.objects
            .remove(&handle.raw())
            .ok_or(BridgeError::InvalidHandle(handle.raw()))
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }
}

// ==================== Public API ====================

/// Initialize the registry. Returns `false` when it already exists, in
/// which case the table and its limit are left untouched.
pub fn init_registry(max_handles: Option<usize>) -> Result<bool> {
    let mut guard = REGISTRY.lock().map_err(|_| BridgeError::Poisoned)?;
    if guard.is_some() {
        return Ok(false);
    }
    *guard = Some(HandleTable::new(NEXT_ID.load(Ordering::Relaxed), max_handles));
    Ok(true)
}

/// Destroy the registry, dropping all objects. Returns how many were live.
pub fn destroy_registry() -> Result<usize> {
    let mut guard = REGISTRY.lock().map_err(|_| BridgeError::Poisoned)?;
    Ok(guard.take().map_or(0, |table| {
        NEXT_ID.store(table.next_id, Ordering::Relaxed);
        table.len()
    }))
}

pub fn is_initialized() -> bool {
    REGISTRY.lock().map(|guard| guard.is_some()).unwrap_or(false)
}

/// Run `f` against the table while holding the registry lock.
pub(crate) fn with_table<R>(f: impl FnOnce(&mut HandleTable) -> Result<R>) -> Result<R> {
    let mut guard = REGISTRY.lock().map_err(|_| BridgeError::Poisoned)?;
    let table = guard.as_mut().ok_or(BridgeError::NotInitialized)?;
    f(table)
}

/// Whether `handle` currently names a live object.
pub fn contains(handle: Handle) -> Result<bool> {
    with_table(|table| Ok(table.get(handle).is_ok()))
}

/// Return the number of live handles (for diagnostics).
pub fn len() -> Result<usize> {
    with_table(|table| Ok(table.len()))
}
