/*!
# Ember 3D Engine

Core of a small real-time 3D engine.

## Architecture

- **Context**: one backend connection bound to one window, owning global
  render state and the viewport
- **GPU objects**: buffers, textures, cubemaps, shaders and pipelines
  created through the context
- **ResourceStorage**: named container of GPU objects and composite
  resources (meshes, materials, skyboxes, models, fonts) addressed by
  typed identifiers
- **StorageManager**: registry of storages plus the always-present cache
- **Renderer**: per-frame queue of render commands, sorted then drawn

Backends implement the `Backend` trait; `HeadlessBackend` ships with the
crate and records everything it is asked to do.
*/

// Internal modules
mod error;
mod engine;
mod utils;
pub mod log;
pub mod event;
pub mod gfx;
pub mod renderer;
pub mod resource;
pub mod window;

#[cfg(test)]
mod test_support;

// Main ember3d namespace module
pub mod ember3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine owner + logger registry
    pub use crate::engine::{Engine, EngineDesc};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, MemoryLogger};
    }

    pub mod event {
        pub use crate::event::*;
    }

    pub mod gfx {
        pub use crate::gfx::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod render {
        pub use crate::renderer::*;
    }

    pub mod window {
        pub use crate::window::*;
    }
}

// Re-export math library at crate root
pub use glam;
