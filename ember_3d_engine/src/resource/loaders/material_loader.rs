/// Material assembly from shader and texture ids

use std::sync::Arc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::gfx::{Backend, Texture};
use crate::resource::material::MATERIAL_PRESET_UNIFORMS;
use crate::resource::{Material, MaterialDesc, ResourceStorage, TextureId};
use crate::{engine_bail, engine_trace};

pub(crate) fn load(storage: &ResourceStorage, desc: &MaterialDesc) -> Result<Material> {
    let Some(shader) = storage.get_shader(desc.shader).cloned() else {
        engine_bail!("ember3d::MaterialLoader", "Material shader is not in storage '{}'", storage.name());
    };
    let diffuse_map = texture(storage, desc.diffuse, "diffuse")?;
    let specular_map = texture(storage, desc.specular, "specular")?;

    // Presets the shader does not declare are skipped without a warning
    let mut uniform_locations = FxHashMap::default();
    {
        let device = storage.context().device();
        for name in MATERIAL_PRESET_UNIFORMS {
            if let Some(location) = device.uniform_location(shader.program(), name) {
                uniform_locations.insert(name, location);
            }
        }
    }
    engine_trace!("ember3d::MaterialLoader", "Material presets found: {:?}", uniform_locations.keys());

    Ok(Material {
        shader_id: desc.shader,
        shader,
        diffuse_map,
        specular_map,
        uniform_locations,
        uniform_buffers: [None, None],
        storage: storage.name().to_string(),
        ambient_color: Vec3::splat(0.1),
        diffuse_color: Vec3::ONE,
        specular_color: Vec3::splat(0.5),
        model_matrix: Mat4::IDENTITY,
    })
}

fn texture(
    storage: &ResourceStorage,
    id: Option<TextureId>,
    role: &str,
) -> Result<Option<Arc<Texture>>> {
    match id {
        None => Ok(None),
        Some(id) => match storage.get_texture(id) {
            Some(texture) => Ok(Some(texture.clone())),
            None => engine_bail!("ember3d::MaterialLoader",
                "Material {} map is not in storage '{}'", role, storage.name()),
        },
    }
}
