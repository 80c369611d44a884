/// Material: shader, texture maps, lighting colors and uniform bindings
///
/// Preset uniforms (`u_ambient_color`, `u_diffuse_color`,
/// `u_specular_color`, `u_model`) are located once at creation; only the
/// ones the shader declares are uploaded by [`Material::use_material`].

use std::sync::Arc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::gfx::{Buffer, Context, PipelineTexture, Shader, ShaderStage, Texture, UniformValue};
use crate::resource::{ShaderId, TextureId};
use crate::{engine_bail, engine_warn};

/// Uniform buffer slot holding the camera matrices
pub const MATERIAL_MATRICES_BUFFER_INDEX: usize = 0;

/// Uniform buffer slot holding the lighting block
pub const MATERIAL_LIGHTING_BUFFER_INDEX: usize = 1;

pub const MATERIAL_UNIFORM_AMBIENT_COLOR: &str = "u_ambient_color";
pub const MATERIAL_UNIFORM_DIFFUSE_COLOR: &str = "u_diffuse_color";
pub const MATERIAL_UNIFORM_SPECULAR_COLOR: &str = "u_specular_color";
pub const MATERIAL_UNIFORM_MODEL_MATRIX: &str = "u_model";

pub(crate) const MATERIAL_PRESET_UNIFORMS: [&str; 4] = [
    MATERIAL_UNIFORM_AMBIENT_COLOR,
    MATERIAL_UNIFORM_DIFFUSE_COLOR,
    MATERIAL_UNIFORM_SPECULAR_COLOR,
    MATERIAL_UNIFORM_MODEL_MATRIX,
];

/// Ids a material is assembled from (all in the same storage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialDesc {
    pub diffuse: Option<TextureId>,
    pub specular: Option<TextureId>,
    pub shader: ShaderId,
}

impl MaterialDesc {
    pub fn new(shader: ShaderId) -> Self {
        Self { diffuse: None, specular: None, shader }
    }
}

#[derive(Debug)]
pub struct Material {
    pub(crate) shader_id: ShaderId,
    pub(crate) shader: Arc<Shader>,
    pub(crate) diffuse_map: Option<Arc<Texture>>,
    pub(crate) specular_map: Option<Arc<Texture>>,
    pub(crate) uniform_locations: FxHashMap<&'static str, u32>,
    pub(crate) uniform_buffers: [Option<Arc<Buffer>>; 2],
    pub(crate) storage: String,

    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub model_matrix: Mat4,
}

impl Material {
    pub fn shader_id(&self) -> ShaderId {
        self.shader_id
    }

    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    pub fn diffuse_map(&self) -> Option<&Arc<Texture>> {
        self.diffuse_map.as_ref()
    }

    pub fn specular_map(&self) -> Option<&Arc<Texture>> {
        self.specular_map.as_ref()
    }

    /// Texture units bound for this material: diffuse first, then specular
    pub fn textures(&self) -> Vec<PipelineTexture> {
        self.diffuse_map
            .iter()
            .chain(self.specular_map.iter())
            .map(|texture| PipelineTexture::Texture(Arc::clone(texture)))
            .collect()
    }

    /// Location of a preset uniform, if the shader declares it
    pub fn preset_location(&self, name: &str) -> Option<u32> {
        self.uniform_locations.get(name).copied()
    }

    pub fn uniform_buffer(&self, index: usize) -> Option<&Arc<Buffer>> {
        self.uniform_buffers.get(index).and_then(Option::as_ref)
    }

    pub fn storage_name(&self) -> &str {
        &self.storage
    }

    /// Upload a plain uniform by name (unknown names warn and do nothing)
    pub fn set_uniform(&self, context: &Context, name: &str, value: impl Into<UniformValue>) {
        self.shader.set_uniform(context, name, value);
    }

    /// Bind a uniform buffer to one of the two material slots
    ///
    /// The slot index is also the vertex-stage binding slot, and a later
    /// buffer for the same index replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is neither
    /// [`MATERIAL_MATRICES_BUFFER_INDEX`] nor [`MATERIAL_LIGHTING_BUFFER_INDEX`].
    pub fn set_uniform_buffer(&mut self, context: &Context, index: usize, buffer: &Arc<Buffer>) -> Result<()> {
        if index > MATERIAL_LIGHTING_BUFFER_INDEX {
            engine_bail!("ember3d::Material", "Invalid material uniform buffer index {}", index);
        }
        self.uniform_buffers[index] = Some(Arc::clone(buffer));
        if self.shader.attach_uniform_at(context, ShaderStage::Vertex, index as u32, buffer).is_none() {
            engine_warn!("ember3d::Material", "Uniform buffer {} could not be attached", index);
        }
        Ok(())
    }

    /// Upload every preset uniform the shader declares
    pub fn use_material(&self, context: &Context) {
        self.upload_colors(context, self.ambient_color, self.diffuse_color, self.specular_color);
        self.upload_preset(context, MATERIAL_UNIFORM_MODEL_MATRIX, UniformValue::Mat4(self.model_matrix));
    }

    /// Upload the three color presets with explicit values
    pub fn upload_colors(&self, context: &Context, ambient: Vec3, diffuse: Vec3, specular: Vec3) {
        self.upload_preset(context, MATERIAL_UNIFORM_AMBIENT_COLOR, UniformValue::Vec3(ambient));
        self.upload_preset(context, MATERIAL_UNIFORM_DIFFUSE_COLOR, UniformValue::Vec3(diffuse));
        self.upload_preset(context, MATERIAL_UNIFORM_SPECULAR_COLOR, UniformValue::Vec3(specular));
    }

    fn upload_preset(&self, context: &Context, name: &str, value: UniformValue) {
        if let Some(location) = self.preset_location(name) {
            self.shader.upload_uniform(context, location, &value);
        }
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
