/// Off-screen window used by tests and headless runs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::utils::lock;
use super::Window;

#[derive(Debug)]
pub struct HeadlessWindow {
    size: Mutex<(u32, u32)>,
    swaps: AtomicU64,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new((width, height)),
            swaps: AtomicU64::new(0),
        }
    }

    /// Change the drawable size (the caller dispatches the resize event)
    pub fn resize(&self, width: u32, height: u32) {
        *lock(&self.size) = (width, height);
    }

    /// Number of buffer swaps so far
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }
}

impl Window for HeadlessWindow {
    fn size(&self) -> (u32, u32) {
        *lock(&self.size)
    }

    fn swap_buffers(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }
}
