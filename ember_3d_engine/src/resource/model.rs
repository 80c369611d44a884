/// Model: meshes loaded from one container, each paired with a model material

use glam::Vec3;

use crate::resource::{MeshId, TextureId};

/// Per-mesh surface description carried by a model file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMaterial {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub diffuse_texture: Option<TextureId>,
    pub specular_texture: Option<TextureId>,
}

impl Default for ModelMaterial {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::ONE,
            specular: Vec3::splat(0.5),
            diffuse_texture: None,
            specular_texture: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) meshes: Vec<MeshId>,
    pub(crate) materials: Vec<ModelMaterial>,
    /// Material index of each mesh
    pub(crate) material_indices: Vec<usize>,
    pub(crate) storage: String,
}

impl Model {
    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }

    pub fn materials(&self) -> &[ModelMaterial] {
        &self.materials
    }

    /// Model material of the mesh at `mesh_index`
    pub fn material_for(&self, mesh_index: usize) -> Option<&ModelMaterial> {
        let material_index = *self.material_indices.get(mesh_index)?;
        self.materials.get(material_index)
    }

    /// Meshes paired with their model material
    pub fn parts(&self) -> impl Iterator<Item = (MeshId, Option<&ModelMaterial>)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| (*mesh, self.material_for(index)))
    }

    pub fn storage_name(&self) -> &str {
        &self.storage
    }
}
