/// Graphics module - context, GPU object factory and backends

pub mod backend;
pub mod table;
pub mod state;
pub mod context;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod pipeline;
pub mod headless;
mod gpu_object;

pub use backend::*;
pub use state::*;
pub use context::*;
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use pipeline::*;
pub use gpu_object::GpuObject;
pub use headless::{HeadlessBackend, HeadlessConfig};
pub use table::LookupTable;
