/// Graphics context: one live backend connection bound to one window
///
/// The context owns global render state (enabled states, clear bits,
/// viewport) and is passed to every GPU object operation. It keeps the
/// viewport in sync with the window through a framebuffer-resize listener
/// registered on the event bus at creation.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec4;

use crate::error::{Error, Result};
use crate::event::{Event, EventBus, EventType, ListenerId};
use crate::gfx::{
    Backend, BackendInfo, BlendDesc, ClearFlags, CullDesc, DepthDesc, GfxStates, Pipeline,
    PipelineDesc, StencilDesc,
};
use crate::utils::lock;
use crate::window::Window;
use crate::{engine_debug, engine_error, engine_info};

/// Oldest backend API version the engine runs on
pub const MIN_BACKEND_VERSION: (u32, u32) = (4, 2);

/// Context configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextDesc {
    /// States enabled at creation
    pub states: GfxStates,
    pub depth: DepthDesc,
    pub stencil: StencilDesc,
    pub blend: BlendDesc,
    pub cull: CullDesc,
}

impl Default for ContextDesc {
    fn default() -> Self {
        Self {
            states: GfxStates::DEPTH | GfxStates::STENCIL | GfxStates::BLEND | GfxStates::VSYNC,
            depth: DepthDesc::default(),
            stencil: StencilDesc::default(),
            blend: BlendDesc::default(),
            cull: CullDesc::default(),
        }
    }
}

/// Mutable render state shared with the resize listener
#[derive(Debug, Clone, Copy)]
struct RenderState {
    states: GfxStates,
    clear_flags: ClearFlags,
    viewport: (u32, u32),
    alive: bool,
}

pub struct Context {
    backend: Arc<Mutex<dyn Backend>>,
    window: Arc<dyn Window>,
    info: BackendInfo,
    desc: ContextDesc,
    state: Arc<Mutex<RenderState>>,
    resize_listener: ListenerId,
}

impl Context {
    /// Create the context
    ///
    /// Checks the backend version, binds the viewport to the window size,
    /// applies `desc.states` and subscribes to framebuffer resizes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` if the backend reports a version
    /// older than [`MIN_BACKEND_VERSION`].
    pub fn new(
        backend: Arc<Mutex<dyn Backend>>,
        window: Arc<dyn Window>,
        desc: ContextDesc,
        events: &mut EventBus,
    ) -> Result<Arc<Self>> {
        // ========== VERSION CHECK ==========
        let info = lock(&backend).info();
        if info.version < MIN_BACKEND_VERSION {
            let message = format!(
                "Backend version {}.{} is below the required {}.{}",
                info.version.0, info.version.1, MIN_BACKEND_VERSION.0, MIN_BACKEND_VERSION.1
            );
            engine_error!("ember3d::Context", "{}", message);
            return Err(Error::InitializationFailed(message));
        }
        engine_info!("ember3d::Context", "Vendor: {}", info.vendor);
        engine_info!("ember3d::Context", "Renderer: {}", info.renderer);
        engine_info!("ember3d::Context", "Version: {}.{} (shading language {})",
            info.version.0, info.version.1, info.shading_language);

        // ========== VIEWPORT ==========
        let (width, height) = window.size();
        lock(&backend).set_viewport(width, height);

        let state = Arc::new(Mutex::new(RenderState {
            states: GfxStates::empty(),
            clear_flags: ClearFlags::COLOR,
            viewport: (width, height),
            alive: true,
        }));

        // ========== RESIZE SUBSCRIPTION ==========
        let listener_backend = Arc::clone(&backend);
        let listener_state = Arc::clone(&state);
        let resize_listener = events.listen(EventType::FramebufferResized, move |event| {
            if let Event::FramebufferResized { width, height } = *event {
                let mut state = lock(&listener_state);
                if state.alive {
                    state.viewport = (width, height);
                    lock(&listener_backend).set_viewport(width, height);
                }
            }
            false
        });

        let context = Self {
            backend,
            window,
            info,
            desc,
            state,
            resize_listener,
        };

        // ========== INITIAL STATES ==========
        for flag in desc.states.iter() {
            context.set_state(flag, true);
        }

        engine_info!("ember3d::Context", "Context created ({}x{}, states {:?})", width, height, desc.states);
        Ok(Arc::new(context))
    }

    /// Exclusive access to the backend
    pub(crate) fn device(&self) -> MutexGuard<'_, dyn Backend + 'static> {
        lock(&self.backend)
    }

    // ===== FRAME =====

    /// Clear the color buffer, plus depth/stencil when those states are on
    pub fn clear(&self, color: Vec4) {
        let flags = lock(&self.state).clear_flags;
        self.device().clear(flags, color.to_array());
    }

    /// Swap the window buffers and end the frame on the backend
    pub fn present(&self) {
        self.window.swap_buffers();
        self.device().present();
    }

    // ===== STATES =====

    /// Enable or disable one or more states
    ///
    /// Depth and stencil also toggle their clear bits. Enabling a state
    /// applies its parameter block from the context description.
    pub fn set_state(&self, states: GfxStates, enabled: bool) {
        let mut state = lock(&self.state);
        let mut device = self.device();

        for flag in states.iter() {
            state.states.set(flag, enabled);

            if flag == GfxStates::VSYNC {
                device.set_swap_interval(u32::from(enabled));
                continue;
            }

            device.set_capability(flag, enabled);
            if flag == GfxStates::DEPTH {
                state.clear_flags.set(ClearFlags::DEPTH, enabled);
                if enabled {
                    device.set_depth_state(&self.desc.depth);
                }
            } else if flag == GfxStates::STENCIL {
                state.clear_flags.set(ClearFlags::STENCIL, enabled);
                if enabled {
                    device.set_stencil_state(&self.desc.stencil);
                }
            } else if flag == GfxStates::BLEND && enabled {
                device.set_blend_state(&self.desc.blend);
                device.set_blend_color(self.desc.blend.blend_color);
            } else if flag == GfxStates::CULL && enabled {
                device.set_cull_state(&self.desc.cull);
            }
        }
        engine_debug!("ember3d::Context", "States {:?} set to {}", states, enabled);
    }

    pub fn states(&self) -> GfxStates {
        lock(&self.state).states
    }

    pub fn has_state(&self, state: GfxStates) -> bool {
        self.states().contains(state)
    }

    pub fn clear_flags(&self) -> ClearFlags {
        lock(&self.state).clear_flags
    }

    // ===== PIPELINES =====

    /// Rebind a pipeline's draw state before drawing with it
    ///
    /// Replaces shader, textures, draw mode and counts, sets the stencil
    /// mask and blend color from `desc`, then binds the vertex array.
    pub fn apply_pipeline(&self, pipeline: &Pipeline, desc: &PipelineDesc) {
        pipeline.rebind(desc);
        let mut device = self.device();
        device.set_stencil_mask(desc.stencil_ref);
        device.set_blend_color(desc.blend_factor);
        device.bind_vertex_array(pipeline.vertex_array());
    }

    // ===== ACCESSORS =====

    pub fn info(&self) -> &BackendInfo {
        &self.info
    }

    pub fn desc(&self) -> &ContextDesc {
        &self.desc
    }

    pub fn window(&self) -> &Arc<dyn Window> {
        &self.window
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        lock(&self.state).viewport
    }

    /// Listener registered for framebuffer resizes
    pub fn resize_listener(&self) -> ListenerId {
        self.resize_listener
    }

    pub fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    /// Mark the context as shut down; the resize listener stops acting
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        if state.alive {
            state.alive = false;
            engine_info!("ember3d::Context", "Context shut down");
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("info", &self.info)
            .field("desc", &self.desc)
            .field("state", &*lock(&self.state))
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
