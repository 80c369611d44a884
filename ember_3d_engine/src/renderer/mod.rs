/// Renderer module - queued draw commands and the per-frame render loop

mod render_command;
mod renderer;

pub use render_command::{RenderCommand, RenderStats, Renderable};
pub use renderer::{Renderer, RENDERER_STORAGE_NAME};
