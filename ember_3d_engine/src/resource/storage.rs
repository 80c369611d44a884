/// Resource storage: one named, self-contained set of engine resources
///
/// A storage owns its GPU objects (buffers, textures, cubemaps, shaders) in
/// one slot map per kind, plus the composite resources built on top of them
/// (meshes, materials, skyboxes, models, fonts). Composites reference the
/// GPU objects of the same storage only. Ids are generational: an id from a
/// destroyed slot or from another storage kind never aliases a live entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use slotmap::{Key, SlotMap};

use crate::error::Result;
use crate::gfx::{
    Buffer, BufferDesc, Context, Cubemap, CubemapDesc, GpuObject, Shader, Texture, TextureDesc,
};
use crate::resource::loaders::{
    cubemap_loader, font_loader, material_loader, mesh_loader, model_loader, skybox_loader,
    texture_loader, CubemapOptions, TextureOptions,
};
use crate::resource::nbr::NbrFile;
use crate::resource::{
    BufferId, CubemapId, Font, FontId, Material, MaterialDesc, MaterialId, Mesh, MeshId, MeshType,
    Model, ModelId, ShaderId, Skybox, SkyboxId, TextureId, VertexType,
};
use crate::{engine_bail, engine_debug, engine_error, engine_info};

/// Look up `id`, logging an error for the null id or a missing entry
fn lookup<'a, K: Key, V>(map: &'a SlotMap<K, V>, id: K, kind: &str, storage: &str) -> Option<&'a V> {
    if id.is_null() {
        engine_error!("ember3d::ResourceStorage", "Null {} id passed to storage '{}'", kind, storage);
        return None;
    }
    let value = map.get(id);
    if value.is_none() {
        engine_error!("ember3d::ResourceStorage", "{} {:?} not found in storage '{}'", kind, id, storage);
    }
    value
}

fn lookup_mut<'a, K: Key, V>(
    map: &'a mut SlotMap<K, V>,
    id: K,
    kind: &str,
    storage: &str,
) -> Option<&'a mut V> {
    if id.is_null() {
        engine_error!("ember3d::ResourceStorage", "Null {} id passed to storage '{}'", kind, storage);
        return None;
    }
    let value = map.get_mut(id);
    if value.is_none() {
        engine_error!("ember3d::ResourceStorage", "{} {:?} not found in storage '{}'", kind, id, storage);
    }
    value
}

/// Read accessors, mutable accessors and counts for one resource kind
macro_rules! storage_accessors {
    ($field:ident, $id:ty, $value:ty, $kind:literal, $get:ident, $count:ident) => {
        #[doc = concat!("Borrow a ", $kind, "; `None` (logged) for the null id or an absent one")]
        pub fn $get(&self, id: $id) -> Option<&$value> {
            lookup(&self.$field, id, $kind, &self.name)
        }

        pub fn $count(&self) -> usize {
            self.$field.len()
        }
    };
    ($field:ident, $id:ty, $value:ty, $kind:literal, $get:ident, $get_mut:ident, $count:ident) => {
        storage_accessors!($field, $id, $value, $kind, $get, $count);

        pub fn $get_mut(&mut self, id: $id) -> Option<&mut $value> {
            lookup_mut(&mut self.$field, id, $kind, &self.name)
        }
    };
}

/// Named set of GPU objects and composite resources
///
/// Every kind has its own id type, so an id of one kind never reaches the
/// map of another:
///
/// ```compile_fail
/// use ember_3d_engine::ember3d::resource::{BufferId, ResourceStorage};
///
/// fn texture_of(storage: &ResourceStorage, id: BufferId) {
///     let _ = storage.get_texture(id);
/// }
/// ```
pub struct ResourceStorage {
    name: String,
    parent_dir: PathBuf,
    context: Arc<Context>,

    buffers: SlotMap<BufferId, Arc<Buffer>>,
    textures: SlotMap<TextureId, Arc<Texture>>,
    cubemaps: SlotMap<CubemapId, Arc<Cubemap>>,
    shaders: SlotMap<ShaderId, Arc<Shader>>,

    meshes: SlotMap<MeshId, Mesh>,
    materials: SlotMap<MaterialId, Material>,
    skyboxes: SlotMap<SkyboxId, Skybox>,
    models: SlotMap<ModelId, Model>,
    fonts: SlotMap<FontId, Font>,

    destroyed: bool,
}

impl ResourceStorage {
    pub(crate) fn new(name: impl Into<String>, parent_dir: impl Into<PathBuf>, context: Arc<Context>) -> Self {
        let name = name.into();
        let parent_dir = parent_dir.into();
        engine_debug!("ember3d::ResourceStorage", "Storage '{}' created in '{}'", name, parent_dir.display());
        Self {
            name,
            parent_dir,
            context,
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            cubemaps: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            skyboxes: SlotMap::with_key(),
            models: SlotMap::with_key(),
            fonts: SlotMap::with_key(),
            destroyed: false,
        }
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory relative file pushes are resolved against
    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
            && self.textures.is_empty()
            && self.cubemaps.is_empty()
            && self.shaders.is_empty()
            && self.meshes.is_empty()
            && self.materials.is_empty()
            && self.skyboxes.is_empty()
            && self.models.is_empty()
            && self.fonts.is_empty()
    }

    fn check_alive(&self, kind: &str) -> Result<()> {
        if self.destroyed {
            engine_bail!("ember3d::ResourceStorage", "Cannot push {} into destroyed storage '{}'", kind, self.name);
        }
        Ok(())
    }

    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.parent_dir.join(path)
    }

    // ===== GPU OBJECTS =====

    pub fn push_buffer(&mut self, desc: &BufferDesc) -> Result<BufferId> {
        self.check_alive("buffer")?;
        let buffer = Buffer::create(&self.context, desc)?;
        Ok(self.buffers.insert(Arc::new(buffer)))
    }

    pub fn push_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        self.check_alive("texture")?;
        let texture = Texture::create(&self.context, desc)?;
        Ok(self.textures.insert(Arc::new(texture)))
    }

    /// Load a texture container relative to the parent directory
    pub fn push_texture_file(&mut self, path: impl AsRef<Path>, options: TextureOptions) -> Result<TextureId> {
        self.check_alive("texture")?;
        let body = NbrFile::load(&self.resolve(path))?.into_texture()?;
        let desc = texture_loader::load(body, &options)?;
        self.push_texture(&desc)
    }

    pub fn push_cubemap(&mut self, desc: &CubemapDesc) -> Result<CubemapId> {
        self.check_alive("cubemap")?;
        let cubemap = Cubemap::create(&self.context, desc)?;
        Ok(self.cubemaps.insert(Arc::new(cubemap)))
    }

    /// Load a cubemap container relative to the parent directory
    pub fn push_cubemap_file(&mut self, path: impl AsRef<Path>, options: CubemapOptions) -> Result<CubemapId> {
        self.check_alive("cubemap")?;
        let body = NbrFile::load(&self.resolve(path))?.into_cubemap()?;
        let desc = cubemap_loader::load(body, &options)?;
        self.push_cubemap(&desc)
    }

    /// Build a shader from a combined source
    ///
    /// Compile and link failures are logged; the shader is stored anyway
    /// and reports them through `Shader::status`.
    pub fn push_shader(&mut self, source: &str) -> Result<ShaderId> {
        self.check_alive("shader")?;
        let shader = Shader::create(&self.context, source);
        Ok(self.shaders.insert(Arc::new(shader)))
    }

    pub fn push_shader_file(&mut self, path: impl AsRef<Path>) -> Result<ShaderId> {
        self.check_alive("shader")?;
        let body = NbrFile::load(&self.resolve(path))?.into_shader()?;
        self.push_shader(&body.source)
    }

    // ===== COMPOSITES =====

    /// Mesh over buffers already in this storage
    pub fn push_mesh(
        &mut self,
        vertex_buffer: BufferId,
        vertex_type: VertexType,
        index_buffer: Option<BufferId>,
        indices_count: usize,
    ) -> Result<MeshId> {
        self.check_alive("mesh")?;
        let mesh = mesh_loader::load(self, vertex_buffer, vertex_type, index_buffer, indices_count)?;
        Ok(self.meshes.insert(mesh))
    }

    /// Built-in mesh; its geometry buffers are pushed into this storage too
    pub fn push_mesh_type(&mut self, mesh_type: MeshType) -> Result<MeshId> {
        self.check_alive("mesh")?;
        let mesh = mesh_loader::load_type(self, mesh_type)?;
        Ok(self.meshes.insert(mesh))
    }

    pub(crate) fn insert_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    pub fn push_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId> {
        self.check_alive("material")?;
        let material = material_loader::load(self, desc)?;
        Ok(self.materials.insert(material))
    }

    pub fn push_skybox(&mut self, cubemap: CubemapId) -> Result<SkyboxId> {
        self.check_alive("skybox")?;
        let skybox = skybox_loader::load(self, cubemap)?;
        Ok(self.skyboxes.insert(skybox))
    }

    /// Load a model container: its textures and meshes land in this storage
    pub fn push_model(&mut self, path: impl AsRef<Path>) -> Result<ModelId> {
        self.check_alive("model")?;
        let body = NbrFile::load(&self.resolve(path))?.into_model()?;
        let model = model_loader::load(self, body)?;
        Ok(self.models.insert(model))
    }

    /// Load a font container: one texture per visible glyph
    pub fn push_font(&mut self, path: impl AsRef<Path>) -> Result<FontId> {
        self.check_alive("font")?;
        let body = NbrFile::load(&self.resolve(path))?.into_font()?;
        let font = font_loader::load(self, body)?;
        Ok(self.fonts.insert(font))
    }

    // ===== LOOKUP =====

    // GPU objects are shared read-only; they mutate through their own methods
    storage_accessors!(buffers, BufferId, Arc<Buffer>, "buffer", get_buffer, buffer_count);
    storage_accessors!(textures, TextureId, Arc<Texture>, "texture", get_texture, texture_count);
    storage_accessors!(cubemaps, CubemapId, Arc<Cubemap>, "cubemap", get_cubemap, cubemap_count);
    storage_accessors!(shaders, ShaderId, Arc<Shader>, "shader", get_shader, shader_count);

    storage_accessors!(meshes, MeshId, Mesh, "mesh", get_mesh, get_mesh_mut, mesh_count);
    storage_accessors!(materials, MaterialId, Material, "material", get_material, get_material_mut, material_count);
    storage_accessors!(skyboxes, SkyboxId, Skybox, "skybox", get_skybox, get_skybox_mut, skybox_count);
    storage_accessors!(models, ModelId, Model, "model", get_model, get_model_mut, model_count);
    storage_accessors!(fonts, FontId, Font, "font", get_font, get_font_mut, font_count);

    // ===== TEARDOWN =====

    /// Destroy every resource and empty the storage; it stays usable
    pub fn clear(&mut self) {
        let context = Arc::clone(&self.context);

        // Composites first: their pipelines reference the GPU objects below
        let mut objects: Vec<&dyn GpuObject> = Vec::new();
        objects.extend(self.meshes.values().map(|mesh| &mesh.pipeline as &dyn GpuObject));
        objects.extend(self.skyboxes.values().map(|skybox| &skybox.pipeline as &dyn GpuObject));
        objects.extend(self.shaders.values().map(|shader| shader.as_ref() as &dyn GpuObject));
        objects.extend(self.textures.values().map(|texture| texture.as_ref() as &dyn GpuObject));
        objects.extend(self.cubemaps.values().map(|cubemap| cubemap.as_ref() as &dyn GpuObject));
        objects.extend(self.buffers.values().map(|buffer| buffer.as_ref() as &dyn GpuObject));

        let mut released = 0usize;
        for object in &objects {
            if !object.is_destroyed() {
                object.destroy(&context);
                released += 1;
            }
        }
        drop(objects);

        self.meshes.clear();
        self.materials.clear();
        self.skyboxes.clear();
        self.models.clear();
        self.fonts.clear();
        self.shaders.clear();
        self.textures.clear();
        self.cubemaps.clear();
        self.buffers.clear();

        engine_debug!("ember3d::ResourceStorage", "Storage '{}' cleared ({} GPU objects released)",
            self.name, released);
    }

    /// Release everything and mark the storage destroyed
    ///
    /// Further pushes fail. A second call does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.clear();
        self.destroyed = true;
        engine_info!("ember3d::ResourceStorage", "Storage '{}' destroyed", self.name);
    }
}

impl std::fmt::Debug for ResourceStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStorage")
            .field("name", &self.name)
            .field("parent_dir", &self.parent_dir)
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("cubemaps", &self.cubemaps.len())
            .field("shaders", &self.shaders.len())
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials.len())
            .field("skyboxes", &self.skyboxes.len())
            .field("models", &self.models.len())
            .field("fonts", &self.fonts.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
