/// GL surface - glutin display, context and window surface
///
/// Owns the current GL context and performs the buffer swap. glutin
/// contexts are bound to the thread that made them current, so the surface
/// stays with the event loop; only the `GlBackend` it creates goes into the
/// engine.

use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::{engine_debug, engine_error, engine_info};
use glutin::config::{ConfigTemplateBuilder, GlConfig as _};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext as _, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay as _};
use glutin::surface::{GlSurface as _, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::window::Window;

use crate::gl_backend::GlBackend;

/// Swap interval not yet pushed to the surface
const INTERVAL_UNSET: u32 = u32::MAX;

fn init_error(what: &str, err: impl std::fmt::Display) -> Error {
    let message = format!("{}: {}", what, err);
    engine_error!("ember3d::gl", "{}", message);
    Error::InitializationFailed(message)
}

#[cfg(target_os = "windows")]
fn display_preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(Some(window))
}

#[cfg(target_os = "macos")]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

/// Framebuffer size clamped to at least one pixel
fn surface_size(width: u32, height: u32) -> (NonZeroU32, NonZeroU32) {
    (
        NonZeroU32::new(width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(height).unwrap_or(NonZeroU32::MIN),
    )
}

/// Window surface with a current OpenGL 4.2 core context
pub struct GlSurface {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    display: Display,
    swap_interval: Arc<AtomicU32>,
    applied_interval: u32,
}

impl GlSurface {
    /// Create the display, pick a config with depth and stencil, and make
    /// a context current on the window
    pub fn new(window: &Window) -> Result<Self> {
        let raw_display = window.display_handle()
            .map_err(|e| init_error("Failed to get display handle", e))?
            .as_raw();
        let raw_window = window.window_handle()
            .map_err(|e| init_error("Failed to get window handle", e))?
            .as_raw();

        let display = unsafe { Display::new(raw_display, display_preference(raw_window)) }
            .map_err(|e| init_error("Failed to create GL display", e))?;

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_stencil_size(8)
            .compatible_with_native_window(raw_window)
            .build();
        let config = unsafe { display.find_configs(template) }
            .map_err(|e| init_error("Failed to enumerate GL configs", e))?
            .max_by_key(|config| config.num_samples())
            .ok_or_else(|| {
                engine_error!("ember3d::gl", "No GL config matches the window");
                Error::InitializationFailed("No GL config matches the window".to_string())
            })?;
        engine_debug!("ember3d::gl", "GL config: {} samples, depth {}, stencil {}",
            config.num_samples(), config.depth_size(), config.stencil_size());

        let attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 2))))
            .build(Some(raw_window));
        let context = unsafe { display.create_context(&config, &attributes) }
            .map_err(|e| init_error("Failed to create GL context", e))?;

        let size = window.inner_size();
        let (width, height) = surface_size(size.width, size.height);
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new()
            .build(raw_window, width, height);
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(|e| init_error("Failed to create GL window surface", e))?;

        let context = context.make_current(&surface)
            .map_err(|e| init_error("Failed to make GL context current", e))?;
        engine_info!("ember3d::gl", "GL surface created ({}x{})", width, height);

        Ok(Self {
            surface,
            context,
            display,
            swap_interval: Arc::new(AtomicU32::new(INTERVAL_UNSET)),
            applied_interval: INTERVAL_UNSET,
        })
    }

    /// Load GL entry points for the current context
    pub fn create_backend(&self) -> GlBackend {
        let gl = unsafe {
            glow::Context::from_loader_function(|symbol| {
                CString::new(symbol)
                    .map_or(std::ptr::null(), |symbol| self.display.get_proc_address(&symbol))
            })
        };
        GlBackend::new(gl, Arc::clone(&self.swap_interval))
    }

    pub fn resize(&self, width: u32, height: u32) {
        let (width, height) = surface_size(width, height);
        self.surface.resize(&self.context, width, height);
    }

    /// Apply a pending swap interval, then swap
    pub fn swap_buffers(&mut self) -> Result<()> {
        let requested = self.swap_interval.load(Ordering::Relaxed);
        if requested != INTERVAL_UNSET && requested != self.applied_interval {
            let interval = match NonZeroU32::new(requested) {
                Some(interval) => SwapInterval::Wait(interval),
                None => SwapInterval::DontWait,
            };
            if let Err(err) = self.surface.set_swap_interval(&self.context, interval) {
                engine_error!("ember3d::gl", "Failed to set swap interval {}: {}", requested, err);
            }
            self.applied_interval = requested;
        }

        self.surface.swap_buffers(&self.context)
            .map_err(|e| Error::BackendError(format!("Buffer swap failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_never_zero() {
        let (width, height) = surface_size(0, 0);
        assert_eq!((width.get(), height.get()), (1, 1));
        let (width, height) = surface_size(1280, 720);
        assert_eq!((width.get(), height.get()), (1280, 720));
    }
}
