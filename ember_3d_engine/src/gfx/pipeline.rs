/// Pipeline: vertex layout, bound buffers, textures, shader and topology
///
/// A pipeline references buffers, textures and the shader through shared
/// handles. Those objects belong to a resource storage and must outlive
/// the pipeline; destroying a pipeline only releases its vertex array.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::gfx::backend::{AttributeFormat, VertexAttribute};
use crate::gfx::gpu_object::{DestroyFlag, GpuObject};
use crate::gfx::table::LAYOUT_TABLE;
use crate::gfx::{Backend, Buffer, Context, Cubemap, GpuHandle, Shader, Texture};
use crate::utils::lock;
use crate::{engine_bail, engine_trace, engine_warn};

/// Maximum textures bound by one pipeline
pub const TEXTURES_MAX: usize = 32;

// ===== LAYOUT =====

/// Vertex attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutType {
    Float1,
    Float2,
    Float3,
    Float4,
    Int1,
    Int2,
    Int3,
    Int4,
    Uint1,
    Uint2,
    Uint3,
    Uint4,
    /// 2x2 float matrix, two attribute slots
    Mat2,
    /// 3x3 float matrix, three attribute slots
    Mat3,
    /// 4x4 float matrix, four attribute slots
    Mat4,
}

impl LayoutType {
    pub fn format(&self) -> Option<AttributeFormat> {
        LAYOUT_TABLE.forward(*self)
    }

    /// Total byte size of the attribute
    pub fn size_bytes(&self) -> usize {
        self.format().map_or(0, |format| format.size_bytes())
    }

    /// Number of attribute slots (one per matrix column)
    pub fn semantic_count(&self) -> u32 {
        self.format().map_or(0, |format| format.semantics)
    }
}

/// One entry of a pipeline's vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDesc {
    pub layout_type: LayoutType,
    /// Instance divisor (0 = per vertex)
    pub instance_rate: u32,
}

impl From<LayoutType> for LayoutDesc {
    fn from(layout_type: LayoutType) -> Self {
        Self { layout_type, instance_rate: 0 }
    }
}

/// Computed vertex layout: one attribute per slot and the shared stride
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: Vec<VertexAttribute>,
}

/// Expand a layout into attribute slots
///
/// Matrix entries take one slot per column, each column advancing the
/// offset by its own size. Slot indices are consecutive across the layout.
pub fn compute_layout(layout: &[LayoutDesc]) -> Result<VertexLayout> {
    let mut attributes = Vec::new();
    let mut offset = 0usize;
    let mut index = 0u32;

    for entry in layout {
        let Some(format) = entry.layout_type.format() else {
            engine_bail!("ember3d::Pipeline", "No attribute format for {:?}", entry.layout_type);
        };
        for _ in 0..format.semantics {
            attributes.push(VertexAttribute {
                index,
                kind: format.kind,
                components: format.components,
                offset,
                divisor: entry.instance_rate,
            });
            index += 1;
            offset += format.semantic_size();
        }
    }

    Ok(VertexLayout { stride: offset, attributes })
}

// ===== DESCRIPTORS =====

/// Draw topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    Point,
    #[default]
    Triangle,
    TriangleStrip,
    Line,
    LineStrip,
}

/// Texture bound by a pipeline
#[derive(Debug, Clone)]
pub enum PipelineTexture {
    Texture(Arc<Texture>),
    Cubemap(Arc<Cubemap>),
}

impl PipelineTexture {
    pub fn handle(&self) -> GpuHandle {
        match self {
            PipelineTexture::Texture(texture) => texture.handle(),
            PipelineTexture::Cubemap(cubemap) => cubemap.handle(),
        }
    }
}

/// Descriptor for creating (and re-applying) a pipeline
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub vertex_buffer: Option<Arc<Buffer>>,
    pub vertices_count: usize,
    pub index_buffer: Option<Arc<Buffer>>,
    pub indices_count: usize,
    pub layout: Vec<LayoutDesc>,
    pub shader: Option<Arc<Shader>>,
    pub textures: Vec<PipelineTexture>,
    pub draw_mode: DrawMode,
    /// Stencil write mask set when the pipeline is applied
    pub stencil_ref: u32,
    /// Constant blend color set when the pipeline is applied
    pub blend_factor: [f32; 4],
}

impl Default for PipelineDesc {
    fn default() -> Self {
        Self {
            vertex_buffer: None,
            vertices_count: 0,
            index_buffer: None,
            indices_count: 0,
            layout: Vec::new(),
            shader: None,
            textures: Vec::new(),
            draw_mode: DrawMode::Triangle,
            stencil_ref: 0xFF,
            blend_factor: [0.0; 4],
        }
    }
}

/// Draw state replaced by `Context::apply_pipeline`
#[derive(Debug, Clone)]
struct DrawState {
    shader: Option<Arc<Shader>>,
    textures: Vec<PipelineTexture>,
    draw_mode: DrawMode,
    vertices_count: usize,
    indices_count: usize,
    stencil_ref: u32,
    blend_factor: [f32; 4],
}

impl DrawState {
    fn from_desc(desc: &PipelineDesc) -> Self {
        let mut textures = desc.textures.clone();
        if textures.len() > TEXTURES_MAX {
            engine_warn!("ember3d::Pipeline",
                "{} textures requested, only the first {} are bound", textures.len(), TEXTURES_MAX);
            textures.truncate(TEXTURES_MAX);
        }
        Self {
            shader: desc.shader.clone(),
            textures,
            draw_mode: desc.draw_mode,
            vertices_count: desc.vertices_count,
            indices_count: desc.indices_count,
            stencil_ref: desc.stencil_ref,
            blend_factor: desc.blend_factor,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug)]
pub struct Pipeline {
    vertex_array: GpuHandle,
    layout: VertexLayout,
    vertex_buffer: Arc<Buffer>,
    index_buffer: Option<Arc<Buffer>>,
    state: Mutex<DrawState>,
    destroyed: DestroyFlag,
}

impl Pipeline {
    /// Build the vertex array and record the draw state
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor has no vertex buffer.
    pub fn create(context: &Context, desc: &PipelineDesc) -> Result<Self> {
        // ========== VALIDATION ==========
        let Some(vertex_buffer) = desc.vertex_buffer.clone() else {
            engine_bail!("ember3d::Pipeline", "Pipeline requires a vertex buffer");
        };
        let layout = compute_layout(&desc.layout)?;

        // ========== VERTEX ARRAY ==========
        let mut device = context.device();
        let vertex_array = device.create_vertex_array()?;
        device.attach_vertex_buffer(vertex_array, vertex_buffer.handle(), layout.stride);
        if let Some(index_buffer) = &desc.index_buffer {
            device.attach_index_buffer(vertex_array, index_buffer.handle());
        }
        for attribute in &layout.attributes {
            device.set_vertex_attribute(vertex_array, attribute);
        }

        Ok(Self {
            vertex_array,
            layout,
            vertex_buffer,
            index_buffer: desc.index_buffer.clone(),
            state: Mutex::new(DrawState::from_desc(desc)),
            destroyed: DestroyFlag::default(),
        })
    }

    // ===== ACCESSORS =====

    pub fn vertex_array(&self) -> GpuHandle {
        self.vertex_array
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    pub fn vertex_buffer(&self) -> &Arc<Buffer> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&Arc<Buffer>> {
        self.index_buffer.as_ref()
    }

    pub fn shader(&self) -> Option<Arc<Shader>> {
        lock(&self.state).shader.clone()
    }

    pub fn draw_mode(&self) -> DrawMode {
        lock(&self.state).draw_mode
    }

    pub fn texture_count(&self) -> usize {
        lock(&self.state).textures.len()
    }

    pub fn vertices_count(&self) -> usize {
        lock(&self.state).vertices_count
    }

    pub fn indices_count(&self) -> usize {
        lock(&self.state).indices_count
    }

    /// Stencil mask and blend color recorded at creation or last apply
    pub fn stencil_and_blend(&self) -> (u32, [f32; 4]) {
        let state = lock(&self.state);
        (state.stencil_ref, state.blend_factor)
    }

    /// Replace the draw state (buffers and layout are fixed at creation)
    pub(crate) fn rebind(&self, desc: &PipelineDesc) {
        *lock(&self.state) = DrawState::from_desc(desc);
    }

    // ===== DRAWS =====

    /// Non-indexed draw of `vertices_count` vertices
    ///
    /// Requires a preceding `Context::apply_pipeline`.
    pub fn draw_vertex(&self, context: &Context) -> Result<()> {
        let state = lock(&self.state).clone();
        let mut device = context.device();
        self.bind_draw_state(&mut *device, &state)?;
        device.draw_arrays(state.draw_mode, 0, state.vertices_count);
        device.bind_vertex_array(GpuHandle::NONE);
        Ok(())
    }

    /// Indexed draw of `indices_count` indices
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline has no shader or no index buffer.
    pub fn draw_index(&self, context: &Context) -> Result<()> {
        if self.index_buffer.is_none() {
            engine_bail!("ember3d::Pipeline", "Indexed draw on a pipeline without index buffer");
        }
        let state = lock(&self.state).clone();
        let mut device = context.device();
        self.bind_draw_state(&mut *device, &state)?;
        device.draw_elements(state.draw_mode, state.indices_count);
        device.bind_vertex_array(GpuHandle::NONE);
        Ok(())
    }

    fn bind_draw_state(&self, device: &mut dyn Backend, state: &DrawState) -> Result<()> {
        let Some(shader) = &state.shader else {
            engine_bail!("ember3d::Pipeline", "Draw on pipeline {} without a shader", self.vertex_array);
        };
        device.use_program(shader.program());
        shader.push_uniform_buffers(device);

        let textures: Vec<GpuHandle> = state.textures.iter().map(PipelineTexture::handle).collect();
        device.bind_textures(0, &textures);

        engine_trace!("ember3d::Pipeline",
            "Draw state bound: program {}, {} textures", shader.program(), textures.len());
        Ok(())
    }
}

impl GpuObject for Pipeline {
    fn label(&self) -> &'static str {
        "Pipeline"
    }

    fn handle(&self) -> GpuHandle {
        self.vertex_array
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.is_set()
    }

    fn destroy(&self, context: &Context) {
        if self.destroyed.mark() {
            lock(&self.state).textures.clear();
            context.device().destroy_vertex_array(self.vertex_array);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
