/// winit adapter

use super::Window;

impl Window for winit::window::Window {
    fn size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }

    fn swap_buffers(&self) {
        // The GL surface owner swaps after present.
        self.pre_present_notify();
    }
}
