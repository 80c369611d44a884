/// Headless backend: an in-memory implementation of [`Backend`]
///
/// Keeps every object it creates (buffer bytes, texture layers, programs,
/// vertex arrays) and every state change, so engine behavior can be checked
/// without a GPU. Stage compilation is simulated: a stage compiles when it
/// starts with a `#version` directive and defines `main`. Plain uniforms are
/// discovered from `uniform <type> <name>;` declarations.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::gfx::backend::{
    BackendInfo, BackendStats, CompileOutput, GpuHandle, PixelLayout, SamplerFilter, TextureKind,
    TextureUpload, VertexAttribute,
};
use crate::gfx::{
    Backend, BlendDesc, BufferDesc, BufferType, BufferUsage, ClearFlags, CullDesc, DepthDesc,
    DrawMode, GfxStates, ShaderStage, StencilDesc, TextureWrap, UniformValue, SHADER_STAGE_MARKER,
};
use crate::{engine_trace, engine_warn};

/// Headless backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    pub vendor: String,
    pub renderer: String,
    /// Reported API version
    pub version: (u32, u32),
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            vendor: "Ember3D".to_string(),
            renderer: "Headless".to_string(),
            version: (4, 6),
        }
    }
}

// ===== RECORDS =====

#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    pub buffer_type: BufferType,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub layout: PixelLayout,
    pub filter: SamplerFilter,
    pub wrap: TextureWrap,
    pub layers: Vec<Vec<u8>>,
    pub mip_levels: u32,
}

#[derive(Debug, Clone)]
struct StageRecord {
    stage: ShaderStage,
    compiled: bool,
    uniforms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramRecord {
    pub linked: bool,
    /// Uniform names; the location of a uniform is its index
    pub uniforms: Vec<String>,
    pub values: FxHashMap<u32, UniformValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArrayRecord {
    pub vertex_buffer: GpuHandle,
    pub stride: usize,
    pub index_buffer: Option<GpuHandle>,
    pub attributes: Vec<VertexAttribute>,
}

/// One accepted draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mode: DrawMode,
    pub indexed: bool,
    pub count: usize,
    pub program: GpuHandle,
    pub vertex_array: GpuHandle,
    pub textures: Vec<GpuHandle>,
}

// ============================================================================
// HeadlessBackend
// ============================================================================

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    config: HeadlessConfig,
    next_handle: u32,

    buffers: FxHashMap<GpuHandle, BufferRecord>,
    textures: FxHashMap<GpuHandle, TextureRecord>,
    stages: FxHashMap<GpuHandle, StageRecord>,
    programs: FxHashMap<GpuHandle, ProgramRecord>,
    vertex_arrays: FxHashMap<GpuHandle, VertexArrayRecord>,

    viewport: (u32, u32),
    capabilities: GfxStates,
    swap_interval: u32,
    depth: Option<DepthDesc>,
    stencil: Option<StencilDesc>,
    blend: Option<BlendDesc>,
    cull: Option<CullDesc>,
    stencil_mask: u32,
    blend_color: [f32; 4],

    last_clear: Option<(ClearFlags, [f32; 4])>,
    frames_presented: u64,

    bound_program: GpuHandle,
    bound_vertex_array: GpuHandle,
    bound_textures: Vec<GpuHandle>,
    uniform_slots: FxHashMap<u32, GpuHandle>,

    draws: Vec<DrawCall>,
    rejected_draws: u64,
    stats: BackendStats,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    pub fn with_config(config: HeadlessConfig) -> Self {
        Self {
            config,
            stencil_mask: 0xFF,
            ..Default::default()
        }
    }

    fn allocate_handle(&mut self) -> GpuHandle {
        self.next_handle += 1;
        GpuHandle(self.next_handle)
    }

    // ===== INSPECTION =====

    pub fn buffer(&self, handle: GpuHandle) -> Option<&BufferRecord> {
        self.buffers.get(&handle)
    }

    pub fn texture(&self, handle: GpuHandle) -> Option<&TextureRecord> {
        self.textures.get(&handle)
    }

    pub fn program(&self, handle: GpuHandle) -> Option<&ProgramRecord> {
        self.programs.get(&handle)
    }

    pub fn vertex_array(&self, handle: GpuHandle) -> Option<&VertexArrayRecord> {
        self.vertex_arrays.get(&handle)
    }

    /// Last value uploaded to the uniform `name` of `program`
    pub fn uniform_value(&self, program: GpuHandle, name: &str) -> Option<UniformValue> {
        let record = self.programs.get(&program)?;
        let location = record.uniforms.iter().position(|uniform| uniform == name)? as u32;
        record.values.get(&location).copied()
    }

    /// Live intermediate stage objects (zero once every program is built)
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn capabilities(&self) -> GfxStates {
        self.capabilities
    }

    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    pub fn depth_state(&self) -> Option<DepthDesc> {
        self.depth
    }

    pub fn stencil_state(&self) -> Option<StencilDesc> {
        self.stencil
    }

    pub fn blend_state(&self) -> Option<BlendDesc> {
        self.blend
    }

    pub fn cull_state(&self) -> Option<CullDesc> {
        self.cull
    }

    pub fn stencil_mask(&self) -> u32 {
        self.stencil_mask
    }

    pub fn blend_color(&self) -> [f32; 4] {
        self.blend_color
    }

    pub fn last_clear(&self) -> Option<(ClearFlags, [f32; 4])> {
        self.last_clear
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn bound_program(&self) -> GpuHandle {
        self.bound_program
    }

    pub fn bound_vertex_array(&self) -> GpuHandle {
        self.bound_vertex_array
    }

    /// Buffer bound to a uniform binding point
    pub fn uniform_slot(&self, slot: u32) -> Option<GpuHandle> {
        self.uniform_slots.get(&slot).copied()
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draws refused because no program or vertex array was bound
    pub fn rejected_draws(&self) -> u64 {
        self.rejected_draws
    }

    pub fn clear_draws(&mut self) {
        self.draws.clear();
        self.rejected_draws = 0;
    }

    // ===== SHADER SIMULATION =====

    fn check_stage_source(source: &str) -> Option<String> {
        if !source.trim_start().starts_with(SHADER_STAGE_MARKER) {
            return Some(format!("0:1: error: stage must start with '{}'", SHADER_STAGE_MARKER));
        }
        if !source.contains("void main") {
            return Some("0:0: error: no definition of 'main'".to_string());
        }
        None
    }

    fn parse_uniforms(source: &str) -> Vec<String> {
        source
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("uniform ") && !line.contains('{'))
            .filter_map(|line| {
                let name = line.split_whitespace().nth(2)?;
                let name = name.trim_end_matches(';');
                let name = name.split('[').next().unwrap_or(name);
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect()
    }

    fn record_draw(&mut self, mode: DrawMode, indexed: bool, count: usize) {
        if self.bound_program.is_none() || !self.programs.contains_key(&self.bound_program) {
            engine_warn!("ember3d::HeadlessBackend", "Draw rejected: no program bound");
            self.rejected_draws += 1;
            return;
        }
        let Some(vertex_array) = self.vertex_arrays.get(&self.bound_vertex_array) else {
            engine_warn!("ember3d::HeadlessBackend", "Draw rejected: no vertex array bound");
            self.rejected_draws += 1;
            return;
        };
        if indexed && vertex_array.index_buffer.is_none() {
            engine_warn!("ember3d::HeadlessBackend", "Draw rejected: vertex array has no index buffer");
            self.rejected_draws += 1;
            return;
        }

        self.stats.draw_calls += 1;
        if indexed {
            self.stats.indices += count as u64;
        } else {
            self.stats.vertices += count as u64;
        }
        self.draws.push(DrawCall {
            mode,
            indexed,
            count,
            program: self.bound_program,
            vertex_array: self.bound_vertex_array,
            textures: self.bound_textures.clone(),
        });
    }

    fn texture_record(upload: &TextureUpload<'_>) -> Result<TextureRecord> {
        let layer_size = upload.width as usize * upload.height as usize * upload.layout.bytes_per_pixel();
        if let Some(layer) = upload.layers.iter().find(|layer| layer.len() != layer_size) {
            return Err(Error::BackendError(format!(
                "Texture layer holds {} bytes, expected {}", layer.len(), layer_size
            )));
        }
        Ok(TextureRecord {
            kind: upload.kind,
            width: upload.width,
            height: upload.height,
            depth: upload.depth,
            layout: upload.layout,
            filter: upload.filter,
            wrap: upload.wrap,
            layers: upload.layers.iter().map(|layer| layer.to_vec()).collect(),
            mip_levels: 1,
        })
    }
}

impl Backend for HeadlessBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            vendor: self.config.vendor.clone(),
            renderer: self.config.renderer.clone(),
            version: self.config.version,
            shading_language: format!("{}.{}0", self.config.version.0, self.config.version.1),
        }
    }

    fn stats(&self) -> BackendStats {
        BackendStats {
            live_buffers: self.buffers.len(),
            live_textures: self.textures.len(),
            live_programs: self.programs.len(),
            live_vertex_arrays: self.vertex_arrays.len(),
            ..self.stats
        }
    }

    // ===== GLOBAL STATE =====

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn set_capability(&mut self, state: GfxStates, enabled: bool) {
        self.capabilities.set(state, enabled);
    }

    fn set_depth_state(&mut self, desc: &DepthDesc) {
        self.depth = Some(*desc);
    }

    fn set_stencil_state(&mut self, desc: &StencilDesc) {
        self.stencil = Some(*desc);
    }

    fn set_blend_state(&mut self, desc: &BlendDesc) {
        self.blend = Some(*desc);
    }

    fn set_cull_state(&mut self, desc: &CullDesc) {
        self.cull = Some(*desc);
    }

    fn set_stencil_mask(&mut self, mask: u32) {
        self.stencil_mask = mask;
    }

    fn set_blend_color(&mut self, color: [f32; 4]) {
        self.blend_color = color;
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        self.last_clear = Some((flags, color));
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuHandle> {
        let mut data = desc.data.clone().unwrap_or_default();
        data.resize(desc.size, 0);
        let handle = self.allocate_handle();
        self.buffers.insert(handle, BufferRecord {
            buffer_type: desc.buffer_type,
            usage: desc.usage,
            data,
        });
        engine_trace!("ember3d::HeadlessBackend", "Buffer {} created ({} bytes)", handle, desc.size);
        Ok(handle)
    }

    fn update_buffer(&mut self, buffer: GpuHandle, offset: usize, data: &[u8]) {
        let Some(record) = self.buffers.get_mut(&buffer) else {
            engine_warn!("ember3d::HeadlessBackend", "Update of unknown buffer {}", buffer);
            return;
        };
        let Some(end) = offset.checked_add(data.len()) else {
            engine_warn!("ember3d::HeadlessBackend", "Update of buffer {} overflows at offset {}", buffer, offset);
            return;
        };
        if end > record.data.len() {
            record.data.resize(end, 0);
        }
        record.data[offset..end].copy_from_slice(data);
    }

    fn destroy_buffer(&mut self, buffer: GpuHandle) {
        self.buffers.remove(&buffer);
        self.uniform_slots.retain(|_, bound| *bound != buffer);
    }

    fn bind_uniform_buffer(&mut self, slot: u32, buffer: GpuHandle) {
        self.uniform_slots.insert(slot, buffer);
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<GpuHandle> {
        let record = Self::texture_record(upload)?;
        let handle = self.allocate_handle();
        self.textures.insert(handle, record);
        Ok(handle)
    }

    fn update_texture(&mut self, texture: GpuHandle, upload: &TextureUpload<'_>) -> Result<()> {
        if !self.textures.contains_key(&texture) {
            return Err(Error::BackendError(format!("Unknown texture {}", texture)));
        }
        let record = Self::texture_record(upload)?;
        self.textures.insert(texture, record);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: GpuHandle) -> u32 {
        match self.textures.get_mut(&texture) {
            Some(record) => {
                let largest = record.width.max(record.height).max(1);
                record.mip_levels = 32 - largest.leading_zeros();
                record.mip_levels
            }
            None => 0,
        }
    }

    fn destroy_texture(&mut self, texture: GpuHandle) {
        self.textures.remove(&texture);
        self.bound_textures.retain(|bound| *bound != texture);
    }

    fn bind_textures(&mut self, first_unit: u32, textures: &[GpuHandle]) {
        let first = first_unit as usize;
        self.bound_textures.truncate(first);
        self.bound_textures.resize(first, GpuHandle::NONE);
        self.bound_textures.extend_from_slice(textures);
    }

    // ===== SHADERS =====

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> CompileOutput {
        let error = Self::check_stage_source(source);
        let handle = self.allocate_handle();
        self.stages.insert(handle, StageRecord {
            stage,
            compiled: error.is_none(),
            uniforms: Self::parse_uniforms(source),
        });
        CompileOutput { handle, error }
    }

    fn link_program(&mut self, vertex: GpuHandle, fragment: GpuHandle) -> CompileOutput {
        let mut error = None;
        let mut uniforms: Vec<String> = Vec::new();

        for (handle, expected) in [(vertex, ShaderStage::Vertex), (fragment, ShaderStage::Fragment)] {
            match self.stages.get(&handle) {
                Some(stage) if stage.stage == expected && stage.compiled => {
                    for name in &stage.uniforms {
                        if !uniforms.contains(name) {
                            uniforms.push(name.clone());
                        }
                    }
                }
                Some(stage) if stage.stage != expected => {
                    if error.is_none() {
                        error = Some(format!("stage {} is not a {:?} stage", handle, expected));
                    }
                }
                _ => {
                    if error.is_none() {
                        error = Some(format!("{:?} stage {} is not compiled", expected, handle));
                    }
                }
            }
        }

        let handle = self.allocate_handle();
        self.programs.insert(handle, ProgramRecord {
            linked: error.is_none(),
            uniforms,
            values: FxHashMap::default(),
        });
        CompileOutput { handle, error }
    }

    fn delete_stage(&mut self, stage: GpuHandle) {
        self.stages.remove(&stage);
    }

    fn delete_program(&mut self, program: GpuHandle) {
        self.programs.remove(&program);
        if self.bound_program == program {
            self.bound_program = GpuHandle::NONE;
        }
    }

    fn use_program(&mut self, program: GpuHandle) {
        self.bound_program = program;
    }

    fn uniform_location(&self, program: GpuHandle, name: &str) -> Option<u32> {
        let record = self.programs.get(&program)?;
        record.uniforms.iter().position(|uniform| uniform == name).map(|index| index as u32)
    }

    fn upload_uniform(&mut self, program: GpuHandle, location: u32, value: &UniformValue) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.values.insert(location, *value);
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<GpuHandle> {
        let handle = self.allocate_handle();
        self.vertex_arrays.insert(handle, VertexArrayRecord::default());
        Ok(handle)
    }

    fn attach_vertex_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle, stride: usize) {
        if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
            record.vertex_buffer = buffer;
            record.stride = stride;
        }
    }

    fn attach_index_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle) {
        if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
            record.index_buffer = Some(buffer);
        }
    }

    fn set_vertex_attribute(&mut self, vertex_array: GpuHandle, attribute: &VertexAttribute) {
        if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
            record.attributes.push(*attribute);
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: GpuHandle) {
        self.bound_vertex_array = vertex_array;
    }

    fn destroy_vertex_array(&mut self, vertex_array: GpuHandle) {
        self.vertex_arrays.remove(&vertex_array);
        if self.bound_vertex_array == vertex_array {
            self.bound_vertex_array = GpuHandle::NONE;
        }
    }

    // ===== DRAWS =====

    fn draw_arrays(&mut self, mode: DrawMode, _first: usize, count: usize) {
        self.record_draw(mode, false, count);
    }

    fn draw_elements(&mut self, mode: DrawMode, count: usize) {
        self.record_draw(mode, true, count);
    }
}

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
