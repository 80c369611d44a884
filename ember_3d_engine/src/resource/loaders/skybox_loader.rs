/// Skybox assembly: inward cube buffer plus a cubemap pipeline

use crate::error::Result;
use crate::gfx::{BufferDesc, BufferType, BufferUsage, Pipeline, PipelineDesc, PipelineTexture};
use crate::resource::loaders::mesh_loader::cube_positions_inward;
use crate::resource::{CubemapId, ResourceStorage, Skybox, VertexType};
use crate::engine_bail;

pub(crate) fn load(storage: &mut ResourceStorage, cubemap_id: CubemapId) -> Result<Skybox> {
    let Some(cubemap) = storage.get_cubemap(cubemap_id).cloned() else {
        engine_bail!("ember3d::SkyboxLoader", "Skybox cubemap is not in storage '{}'", storage.name());
    };

    let positions = cube_positions_inward();
    let vertex_buffer = storage.push_buffer(&BufferDesc::with_data(
        BufferType::Vertex,
        BufferUsage::StaticDraw,
        bytemuck::cast_slice(&positions).to_vec(),
    ))?;
    let Some(vertices) = storage.get_buffer(vertex_buffer).cloned() else {
        engine_bail!("ember3d::SkyboxLoader", "Skybox vertex buffer vanished from '{}'", storage.name());
    };

    let desc = PipelineDesc {
        vertices_count: positions.len() / VertexType::Pos3.components(),
        vertex_buffer: Some(vertices),
        layout: VertexType::Pos3.layout(),
        textures: vec![PipelineTexture::Cubemap(cubemap)],
        ..PipelineDesc::default()
    };
    let pipeline = Pipeline::create(storage.context(), &desc)?;

    Ok(Skybox {
        cubemap_id,
        vertex_buffer,
        pipeline,
        pipeline_desc: desc,
        storage: storage.name().to_string(),
    })
}
