/// Resource module - storages, composite resources and their loaders

mod ids;
pub mod nbr;
mod storage;
mod storage_manager;
pub mod mesh;
pub mod material;
pub mod skybox;
pub mod model;
pub mod font;
pub(crate) mod loaders;

pub use ids::*;
pub use storage::ResourceStorage;
pub use storage_manager::{SharedStorage, StorageManager, StorageManagerConfig};
pub use mesh::{Mesh, MeshType, VertexType};
pub use material::{
    Material, MaterialDesc, MATERIAL_LIGHTING_BUFFER_INDEX, MATERIAL_MATRICES_BUFFER_INDEX,
    MATERIAL_UNIFORM_AMBIENT_COLOR, MATERIAL_UNIFORM_DIFFUSE_COLOR, MATERIAL_UNIFORM_MODEL_MATRIX,
    MATERIAL_UNIFORM_SPECULAR_COLOR,
};
pub use skybox::Skybox;
pub use model::{Model, ModelMaterial};
pub use font::{Font, Glyph};
pub use loaders::{CubemapOptions, TextureOptions};
