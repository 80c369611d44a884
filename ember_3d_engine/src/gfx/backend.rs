/// Backend trait - the contract every graphics API binding implements
///
/// The factory objects (Buffer, Texture, Shader, Pipeline) and the Context
/// translate their API-agnostic descriptions into the backend-level types
/// below, then call into a `Backend`. A backend only ever sees translated
/// values: pixel layouts instead of texture formats, sampler filters instead
/// of filter presets, attribute formats instead of layout types.

use std::fmt;

use crate::error::Result;
use crate::gfx::{
    BufferDesc, ClearFlags, GfxStates, DrawMode, ShaderStage, TextureWrap, UniformValue,
    BlendDesc, CullDesc, DepthDesc, StencilDesc,
};

// ============================================================================
// Handles and info
// ============================================================================

/// Opaque backend object name
///
/// `GpuHandle::NONE` (0) never names a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GpuHandle(pub u32);

impl GpuHandle {
    /// The "no object" handle
    pub const NONE: GpuHandle = GpuHandle(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for GpuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identification reported by a backend at context creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub vendor: String,
    pub renderer: String,
    /// API version (major, minor)
    pub version: (u32, u32),
    pub shading_language: String,
}

/// Backend statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Draw calls issued since creation
    pub draw_calls: u64,
    /// Vertices submitted by non-indexed draws
    pub vertices: u64,
    /// Indices submitted by indexed draws
    pub indices: u64,
    pub live_buffers: usize,
    pub live_textures: usize,
    pub live_programs: usize,
    pub live_vertex_arrays: usize,
}

// ============================================================================
// Translated types
// ============================================================================

/// Scalar type of a vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Float,
    Int,
    Uint,
}

/// Backend view of a vertex attribute type
///
/// `semantics` is the number of attribute slots the type occupies (one per
/// matrix column, 1 for scalars and vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat {
    pub kind: ComponentKind,
    pub components: u32,
    pub semantics: u32,
}

impl AttributeFormat {
    /// Byte size of one slot
    pub fn semantic_size(&self) -> usize {
        self.components as usize * 4
    }

    /// Byte size of the whole attribute
    pub fn size_bytes(&self) -> usize {
        self.semantic_size() * self.semantics as usize
    }
}

/// One vertex attribute slot as bound on a vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location
    pub index: u32,
    pub kind: ComponentKind,
    pub components: u32,
    /// Byte offset inside one vertex
    pub offset: usize,
    /// Instance divisor (0 = per vertex)
    pub divisor: u32,
}

/// Pixel storage of a texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    pub channels: u32,
    pub bits_per_channel: u32,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        (self.channels * self.bits_per_channel / 8) as usize
    }
}

/// Minify/magnify filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampler filtering as understood by a backend
///
/// `mipmapped` selects filtering between mip levels (trilinear when the
/// minify filter is linear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerFilter {
    pub min: FilterMode,
    pub mag: FilterMode,
    pub mipmapped: bool,
}

/// Texture target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Texture2D,
    Cubemap,
}

/// Everything a backend needs to allocate or refill a texture
///
/// `layers` holds one slice per depth layer or cubemap face; empty means
/// "allocate without contents".
#[derive(Debug, Clone)]
pub struct TextureUpload<'a> {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub layout: PixelLayout,
    pub filter: SamplerFilter,
    pub wrap: TextureWrap,
    pub layers: Vec<&'a [u8]>,
}

/// Result of a stage compile or program link
///
/// A failed compile still yields a handle; `error` carries the info log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub handle: GpuHandle,
    pub error: Option<String>,
}

// ============================================================================
// Backend trait
// ============================================================================

/// Graphics API backend
///
/// Implemented by `HeadlessBackend` and by any windowed binding. All calls
/// happen on the thread owning the `Context`; the Context serializes access
/// through a mutex.
pub trait Backend: Send {
    /// Identification used for the minimum-version check
    fn info(&self) -> BackendInfo;

    /// Backend statistics
    fn stats(&self) -> BackendStats;

    // ===== GLOBAL STATE =====

    fn set_viewport(&mut self, width: u32, height: u32);

    /// Enable or disable one capability (depth, stencil, blend, msaa, cull)
    fn set_capability(&mut self, state: GfxStates, enabled: bool);

    fn set_depth_state(&mut self, desc: &DepthDesc);

    fn set_stencil_state(&mut self, desc: &StencilDesc);

    fn set_blend_state(&mut self, desc: &BlendDesc);

    fn set_cull_state(&mut self, desc: &CullDesc);

    fn set_stencil_mask(&mut self, mask: u32);

    fn set_blend_color(&mut self, color: [f32; 4]);

    /// 0 disables vsync, 1 enables it
    fn set_swap_interval(&mut self, interval: u32);

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]);

    /// End of frame on the backend side (after the window swap)
    fn present(&mut self);

    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuHandle>;

    fn update_buffer(&mut self, buffer: GpuHandle, offset: usize, data: &[u8]);

    fn destroy_buffer(&mut self, buffer: GpuHandle);

    /// Bind a uniform buffer to a binding point
    fn bind_uniform_buffer(&mut self, slot: u32, buffer: GpuHandle);

    // ===== TEXTURES =====

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<GpuHandle>;

    fn update_texture(&mut self, texture: GpuHandle, upload: &TextureUpload<'_>) -> Result<()>;

    /// Build the mip chain, returning the number of levels
    fn generate_mipmaps(&mut self, texture: GpuHandle) -> u32;

    fn destroy_texture(&mut self, texture: GpuHandle);

    /// Bind textures to consecutive units starting at `first_unit`
    fn bind_textures(&mut self, first_unit: u32, textures: &[GpuHandle]);

    // ===== SHADERS =====

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> CompileOutput;

    fn link_program(&mut self, vertex: GpuHandle, fragment: GpuHandle) -> CompileOutput;

    /// Detach and delete an intermediate stage object
    fn delete_stage(&mut self, stage: GpuHandle);

    fn delete_program(&mut self, program: GpuHandle);

    fn use_program(&mut self, program: GpuHandle);

    fn uniform_location(&self, program: GpuHandle, name: &str) -> Option<u32>;

    fn upload_uniform(&mut self, program: GpuHandle, location: u32, value: &UniformValue);

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<GpuHandle>;

    fn attach_vertex_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle, stride: usize);

    fn attach_index_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle);

    fn set_vertex_attribute(&mut self, vertex_array: GpuHandle, attribute: &VertexAttribute);

    /// Bind a vertex array (`GpuHandle::NONE` unbinds)
    fn bind_vertex_array(&mut self, vertex_array: GpuHandle);

    fn destroy_vertex_array(&mut self, vertex_array: GpuHandle);

    // ===== DRAWS =====

    fn draw_arrays(&mut self, mode: DrawMode, first: usize, count: usize);

    fn draw_elements(&mut self, mode: DrawMode, count: usize);
}
