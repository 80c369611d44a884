//! Loaders turning decoded containers and ids into storable resources

pub(crate) mod texture_loader;
pub(crate) mod cubemap_loader;
pub(crate) mod mesh_loader;
pub(crate) mod material_loader;
pub(crate) mod skybox_loader;
pub(crate) mod model_loader;
pub(crate) mod font_loader;

pub use cubemap_loader::CubemapOptions;
pub use texture_loader::TextureOptions;
