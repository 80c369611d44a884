/*!
# Ember 3D Engine - OpenGL Renderer Backend

OpenGL 4.2 core implementation of the ember_3d_engine `Backend` trait.

`GlSurface` creates the GL display, context and window surface with glutin
and owns the buffer swap. `GlBackend` issues every engine call through glow.
The two share the requested swap interval, so a vsync change made through
the engine context is applied on the next swap.

# Example

```no_run
use std::sync::{Arc, Mutex};
use ember_3d_engine::ember3d::{Engine, EngineDesc};
use ember_3d_engine_renderer_gl::GlSurface;
# fn run(window: Arc<winit::window::Window>) -> ember_3d_engine::ember3d::Result<()> {
let surface = GlSurface::new(&window)?;
let backend = Arc::new(Mutex::new(surface.create_backend()));
let engine = Engine::new(backend, window.clone(), EngineDesc::default())?;
# Ok(())
# }
```
*/

mod gl_format;
mod gl_backend;
mod gl_surface;

pub use gl_backend::GlBackend;
pub use gl_surface::GlSurface;
