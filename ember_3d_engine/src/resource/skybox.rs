/// Skybox: a cubemap drawn on a unit cube

use crate::error::Result;
use crate::gfx::{Context, Pipeline, PipelineDesc, PipelineTexture};
use crate::resource::mesh::draw_pipeline;
use crate::resource::{BufferId, CubemapId, Material};

#[derive(Debug)]
pub struct Skybox {
    pub(crate) cubemap_id: CubemapId,
    pub(crate) vertex_buffer: BufferId,
    pub(crate) pipeline: Pipeline,
    pub(crate) pipeline_desc: PipelineDesc,
    pub(crate) storage: String,
}

impl Skybox {
    pub fn cubemap_id(&self) -> CubemapId {
        self.cubemap_id
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn storage_name(&self) -> &str {
        &self.storage
    }

    /// Draw the cube with the material's shader, sampling the cubemap
    pub fn draw(&self, context: &Context, material: &Material) -> Result<()> {
        let textures: Vec<PipelineTexture> = self.pipeline_desc.textures.clone();
        draw_pipeline(context, &self.pipeline, &self.pipeline_desc, material.shader(), textures)
    }
}
