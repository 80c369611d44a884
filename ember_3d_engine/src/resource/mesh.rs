/// Mesh: vertex/index buffers from the owning storage plus a pipeline

use std::sync::Arc;

use crate::error::Result;
use crate::gfx::{Context, LayoutDesc, LayoutType, Pipeline, PipelineDesc, PipelineTexture, Shader};
use crate::resource::{BufferId, Material};

/// Interleaved vertex formats a mesh can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    /// Position
    Pos3,
    /// Position, texture coordinates
    Pos3Uv2,
    /// Position, normal, texture coordinates
    Pos3Normal3Uv2,
}

impl VertexType {
    pub fn layout(&self) -> Vec<LayoutDesc> {
        let types: &[LayoutType] = match self {
            VertexType::Pos3 => &[LayoutType::Float3],
            VertexType::Pos3Uv2 => &[LayoutType::Float3, LayoutType::Float2],
            VertexType::Pos3Normal3Uv2 => &[LayoutType::Float3, LayoutType::Float3, LayoutType::Float2],
        };
        types.iter().copied().map(LayoutDesc::from).collect()
    }

    /// Floats per vertex
    pub fn components(&self) -> usize {
        match self {
            VertexType::Pos3 => 3,
            VertexType::Pos3Uv2 => 5,
            VertexType::Pos3Normal3Uv2 => 8,
        }
    }

    pub fn stride(&self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }
}

/// Built-in geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshType {
    /// Unit cube centered on the origin
    Cube,
    /// Unit quad in the XZ plane facing +Y
    Plane,
}

#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: BufferId,
    pub(crate) index_buffer: Option<BufferId>,
    pub(crate) vertex_type: VertexType,
    pub(crate) pipeline: Pipeline,
    pub(crate) pipeline_desc: PipelineDesc,
    pub(crate) storage: String,
}

impl Mesh {
    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    pub fn vertex_type(&self) -> VertexType {
        self.vertex_type
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Description the pipeline is re-applied with before each draw
    pub fn pipeline_desc(&self) -> &PipelineDesc {
        &self.pipeline_desc
    }

    /// Name of the storage holding the mesh and its buffers
    pub fn storage_name(&self) -> &str {
        &self.storage
    }

    /// Draw with the material's shader and textures
    ///
    /// `textures` overrides the material's texture list when given.
    pub fn draw(
        &self,
        context: &Context,
        material: &Material,
        textures: Option<Vec<PipelineTexture>>,
    ) -> Result<()> {
        let textures = textures.unwrap_or_else(|| material.textures());
        draw_pipeline(context, &self.pipeline, &self.pipeline_desc, material.shader(), textures)
    }
}

/// Apply `base` with shader and textures replaced, then issue the draw
pub(crate) fn draw_pipeline(
    context: &Context,
    pipeline: &Pipeline,
    base: &PipelineDesc,
    shader: &Arc<Shader>,
    textures: Vec<PipelineTexture>,
) -> Result<()> {
    let desc = PipelineDesc {
        shader: Some(Arc::clone(shader)),
        textures,
        ..base.clone()
    };
    context.apply_pipeline(pipeline, &desc);
    if pipeline.index_buffer().is_some() {
        pipeline.draw_index(context)
    } else {
        pipeline.draw_vertex(context)
    }
}
