/// Resource identifiers
///
/// One generational key type per resource kind, so an id pushed as a
/// buffer cannot be passed where a texture id is expected. The null key
/// (`Default::default()`) is the "no resource" sentinel.

use slotmap::new_key_type;

new_key_type! {
    /// GPU buffer in a storage
    pub struct BufferId;
    /// 2D texture in a storage
    pub struct TextureId;
    /// Cubemap in a storage
    pub struct CubemapId;
    /// Shader program in a storage
    pub struct ShaderId;
    /// Mesh (buffers + pipeline) in a storage
    pub struct MeshId;
    /// Material in a storage
    pub struct MaterialId;
    /// Skybox in a storage
    pub struct SkyboxId;
    /// Model (meshes + model materials) in a storage
    pub struct ModelId;
    /// Font (glyph textures + metrics) in a storage
    pub struct FontId;
}
