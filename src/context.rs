//! Session object passed to every wrapper constructor.
//!
//! A `Context` does not own the engine. It only remembers which top-level
//! handles were allocated through it so the host can free them in bulk.
//! Handles adopted from elsewhere are never recorded.

use std::sync::Mutex;

use crate::engine;
use crate::error::{BridgeError, Result};
use crate::registry;
use crate::types::Handle;

#[derive(Debug)]
pub struct Context {
    allocated: Mutex<Vec<Handle>>,
}

impl Context {
    /// Create a context. The runtime must have been initialised with
    /// [`crate::init`].
    pub fn new() -> Result<Self> {
        if !registry::is_initialized() {
            return Err(BridgeError::NotInitialized);
        }
        Ok(Self {
            allocated: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn record(&self, handle: Handle) -> Result<()> {
        self.allocated
            .lock()
            .map_err(|_| BridgeError::Poisoned)?
            .push(handle);
        Ok(())
    }

    /// Handles allocated through this context and not yet released.
    pub fn allocated(&self) -> Result<Vec<Handle>> {
        Ok(self
            .allocated
            .lock()
            .map_err(|_| BridgeError::Poisoned)?
            .clone())
    }

    /// Free one handle and forget it.
    pub fn release(&self, handle: Handle) -> Result<()> {
        engine::release(handle)?;
        self.allocated
            .lock()
            .map_err(|_| BridgeError::Poisoned)?
            .retain(|h| *h != handle);
        Ok(())
    }

    /// Free every recorded handle. Handles released by other means are
    /// skipped. Returns the number of objects freed.
    ///
    /// On any other error the failing handle and every handle after it stay
    /// recorded, so a later `dispose` can finish the job.
    pub fn dispose(&self) -> Result<usize> {
        let mut allocated = self.allocated.lock().map_err(|_| BridgeError::Poisoned)?;
        let mut pending = std::mem::take(&mut *allocated).into_iter();
        let mut freed = 0;
        while let Some(handle) = pending.next() {
            match engine::release(handle) {
                Ok(()) => freed += 1,
                Err(BridgeError::InvalidHandle(_)) => {}
                Err(e) => {
                    allocated.push(handle);
                    allocated.extend(pending);
                    return Err(e);
                }
            }
        }
        tracing::debug!(freed, "context disposed");
        Ok(freed)
    }
}
