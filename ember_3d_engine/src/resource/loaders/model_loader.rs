/// Model assembly: textures, meshes and model materials from a container

use glam::Vec3;

use crate::error::Result;
use crate::gfx::{BufferDesc, BufferType, BufferUsage};
use crate::resource::loaders::{mesh_loader, texture_loader};
use crate::resource::nbr::{NbrMaterial, NbrModel, NBR_MODEL_VERTEX_FLOATS};
use crate::resource::{Model, ModelMaterial, ResourceStorage, TextureId, TextureOptions, VertexType};
use crate::{engine_debug, engine_warn};

pub(crate) fn load(storage: &mut ResourceStorage, model: NbrModel) -> Result<Model> {
    debug_assert_eq!(NBR_MODEL_VERTEX_FLOATS, VertexType::Pos3Normal3Uv2.components());

    // ========== TEXTURES ==========
    let mut textures = Vec::with_capacity(model.textures.len());
    for texture in model.textures {
        let desc = texture_loader::load(texture, &TextureOptions::default())?;
        textures.push(storage.push_texture(&desc)?);
    }

    // ========== MATERIALS ==========
    let mut materials: Vec<ModelMaterial> = model
        .materials
        .iter()
        .map(|material| model_material(material, &textures))
        .collect();
    if materials.is_empty() {
        materials.push(ModelMaterial::default());
    }

    // ========== MESHES ==========
    let mut meshes = Vec::with_capacity(model.meshes.len());
    let mut material_indices = Vec::with_capacity(model.meshes.len());
    for mesh in model.meshes {
        let vertex_buffer = storage.push_buffer(&BufferDesc::with_data(
            BufferType::Vertex,
            BufferUsage::StaticDraw,
            bytemuck::cast_slice(&mesh.vertices).to_vec(),
        ))?;
        let index_buffer = if mesh.indices.is_empty() {
            None
        } else {
            Some(storage.push_buffer(&BufferDesc::with_data(
                BufferType::Index,
                BufferUsage::StaticDraw,
                bytemuck::cast_slice(&mesh.indices).to_vec(),
            ))?)
        };
        let loaded = mesh_loader::load(
            storage,
            vertex_buffer,
            VertexType::Pos3Normal3Uv2,
            index_buffer,
            mesh.indices.len(),
        )?;
        meshes.push(storage.insert_mesh(loaded));

        let material_index = mesh.material_index as usize;
        if material_index < materials.len() {
            material_indices.push(material_index);
        } else {
            engine_warn!("ember3d::ModelLoader",
                "Mesh refers to material {} of {}, using material 0", material_index, materials.len());
            material_indices.push(0);
        }
    }

    engine_debug!("ember3d::ModelLoader", "Model loaded: {} meshes, {} materials, {} textures",
        meshes.len(), materials.len(), textures.len());

    Ok(Model {
        meshes,
        materials,
        material_indices,
        storage: storage.name().to_string(),
    })
}

fn model_material(material: &NbrMaterial, textures: &[TextureId]) -> ModelMaterial {
    let resolve = |index: Option<u32>| {
        let index = index? as usize;
        let texture = textures.get(index).copied();
        if texture.is_none() {
            engine_warn!("ember3d::ModelLoader", "Material refers to missing texture {}", index);
        }
        texture
    };
    ModelMaterial {
        ambient: Vec3::from_array(material.ambient),
        diffuse: Vec3::from_array(material.diffuse),
        specular: Vec3::from_array(material.specular),
        diffuse_texture: resolve(material.diffuse_texture),
        specular_texture: resolve(material.specular_texture),
    }
}
