//! Window interface consumed by the graphics context
//!
//! The context only needs the drawable size and a buffer swap. Resize
//! notifications travel through the event bus, not through this trait.

mod headless_window;
mod winit_window;

pub use headless_window::HeadlessWindow;

/// Surface a context renders into
pub trait Window: Send + Sync {
    /// Current drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Width over height (1.0 for a zero-height surface)
    fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Present the back buffer
    fn swap_buffers(&self);
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
