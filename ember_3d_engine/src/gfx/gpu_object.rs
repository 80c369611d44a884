/// Destroyable GPU object capability
///
/// Storages keep one strongly-typed map per object kind but tear them down
/// through this trait, iterating every kind the same way.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::gfx::{Context, GpuHandle};

pub trait GpuObject: Send + Sync {
    /// Short kind name used in logs ("Buffer", "Texture", ...)
    fn label(&self) -> &'static str;

    /// Backend handle of the object
    fn handle(&self) -> GpuHandle;

    fn is_destroyed(&self) -> bool;

    /// Release the backend object
    ///
    /// Calling it again after the first time does nothing.
    fn destroy(&self, context: &Context);
}

/// One-shot flag guarding backend release
#[derive(Debug, Default)]
pub(crate) struct DestroyFlag(AtomicBool);

impl DestroyFlag {
    /// Mark as destroyed; returns true only for the first call
    pub(crate) fn mark(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
