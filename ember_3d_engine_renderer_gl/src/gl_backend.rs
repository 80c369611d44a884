/// OpenGL backend - `Backend` implemented over a glow context
///
/// GL object names are used directly as `GpuHandle`s. Buffers are filled
/// through the copy-write binding point so uploads never disturb the index
/// buffer of the bound vertex array. The buffer swap itself belongs to
/// `GlSurface`; the swap interval requested here is handed to it through a
/// shared atomic.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ember_3d_engine::ember3d::gfx::{
    Backend, BackendInfo, BackendStats, BlendDesc, BufferDesc, ClearFlags, CompileOutput,
    ComponentKind, CullDesc, DepthDesc, DrawMode, GfxStates, GpuHandle, ShaderStage, StencilDesc,
    TextureKind, TextureUpload, UniformValue, VertexAttribute,
};
use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::{engine_debug, engine_error, engine_info, engine_warn};
use glow::HasContext;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::gl_format;

#[derive(Debug, Clone, Copy)]
struct BufferMeta {
    usage: u32,
    size: usize,
}

#[derive(Debug, Clone, Copy)]
struct TextureMeta {
    target: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct VertexArrayMeta {
    vertex_buffer: Option<glow::NativeBuffer>,
    stride: i32,
}

fn handle(name: NonZeroU32) -> GpuHandle {
    GpuHandle(name.get())
}

fn native<T>(handle: GpuHandle, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(handle.0).map(wrap)
}

fn backend_error(message: String) -> Error {
    engine_error!("ember3d::gl", "{}", message);
    Error::BackendError(message)
}

/// OpenGL 4.2 core backend
pub struct GlBackend {
    gl: glow::Context,
    info: BackendInfo,
    stats: BackendStats,
    swap_interval: Arc<AtomicU32>,
    buffers: FxHashMap<GpuHandle, BufferMeta>,
    textures: FxHashMap<GpuHandle, TextureMeta>,
    programs: FxHashSet<GpuHandle>,
    vertex_arrays: FxHashMap<GpuHandle, VertexArrayMeta>,
    bound_program: GpuHandle,
    bound_vertex_array: GpuHandle,
}

impl GlBackend {
    /// Wrap a glow context that is current on the calling thread
    ///
    /// `swap_interval` is written by `set_swap_interval` and read by whoever
    /// presents the surface.
    pub fn new(gl: glow::Context, swap_interval: Arc<AtomicU32>) -> Self {
        let info = unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            BackendInfo {
                vendor: gl.get_parameter_string(glow::VENDOR),
                renderer: gl.get_parameter_string(glow::RENDERER),
                version: (gl.version().major, gl.version().minor),
                shading_language: gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION),
            }
        };
        engine_info!("ember3d::gl", "OpenGL {}.{} on {} ({})",
            info.version.0, info.version.1, info.renderer, info.vendor);

        Self {
            gl,
            info,
            stats: BackendStats::default(),
            swap_interval,
            buffers: FxHashMap::default(),
            textures: FxHashMap::default(),
            programs: FxHashSet::default(),
            vertex_arrays: FxHashMap::default(),
            bound_program: GpuHandle::NONE,
            bound_vertex_array: GpuHandle::NONE,
        }
    }

    /// The swap interval last requested through the engine
    pub fn swap_interval(&self) -> u32 {
        self.swap_interval.load(Ordering::Relaxed)
    }

    fn restore_vertex_array(&self) {
        unsafe {
            self.gl.bind_vertex_array(native(self.bound_vertex_array, glow::NativeVertexArray));
        }
    }

    /// Reallocate the buffer bound to COPY_WRITE_BUFFER, keeping its contents
    fn grow_bound_buffer(&mut self, meta: BufferMeta, size: usize) -> Result<()> {
        unsafe {
            if meta.size == 0 {
                self.gl.buffer_data_size(glow::COPY_WRITE_BUFFER, size as i32, meta.usage);
                return Ok(());
            }
            let scratch = self.gl.create_buffer()
                .map_err(|e| backend_error(format!("Failed to create scratch buffer: {}", e)))?;
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, Some(scratch));
            self.gl.buffer_data_size(glow::COPY_READ_BUFFER, meta.size as i32, glow::STREAM_COPY);
            self.gl.copy_buffer_sub_data(glow::COPY_WRITE_BUFFER, glow::COPY_READ_BUFFER, 0, 0, meta.size as i32);
            self.gl.buffer_data_size(glow::COPY_WRITE_BUFFER, size as i32, meta.usage);
            self.gl.copy_buffer_sub_data(glow::COPY_READ_BUFFER, glow::COPY_WRITE_BUFFER, 0, 0, meta.size as i32);
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, None);
            self.gl.delete_buffer(scratch);
        }
        Ok(())
    }

    fn upload_texture(&mut self, texture: glow::NativeTexture, upload: &TextureUpload<'_>) -> Result<TextureMeta> {
        let format = gl_format::pixel_format(upload.layout)
            .ok_or_else(|| backend_error(format!("Unsupported pixel layout {:?}", upload.layout)))?;
        let layer_size = upload.width as usize * upload.height as usize * upload.layout.bytes_per_pixel();
        if let Some(layer) = upload.layers.iter().find(|layer| layer.len() != layer_size) {
            return Err(backend_error(format!(
                "Texture layer holds {} bytes, expected {}", layer.len(), layer_size
            )));
        }

        let target = gl_format::texture_target(upload.kind, upload.depth);
        let (width, height) = (upload.width as i32, upload.height as i32);
        let internal = format.internal as i32;

        unsafe {
            self.gl.bind_texture(target, Some(texture));
            match upload.kind {
                TextureKind::Cubemap => {
                    for face in 0..6u32 {
                        self.gl.tex_image_2d(
                            glow::TEXTURE_CUBE_MAP_POSITIVE_X + face, 0, internal, width, height, 0,
                            format.format, format.component, glow::PixelUnpackData::Slice(upload.layers.get(face as usize).copied()),
                        );
                    }
                }
                TextureKind::Texture2D if target == glow::TEXTURE_2D_ARRAY => {
                    // Partial layer sets allocate storage only
                    let pixels = (upload.layers.len() == upload.depth as usize).then(|| upload.layers.concat());
                    if pixels.is_none() && !upload.layers.is_empty() {
                        engine_warn!("ember3d::gl", "{} layers given for a depth of {}, contents dropped",
                            upload.layers.len(), upload.depth);
                    }
                    self.gl.tex_image_3d(
                        target, 0, internal, width, height, upload.depth as i32, 0,
                        format.format, format.component, glow::PixelUnpackData::Slice(pixels.as_deref()),
                    );
                }
                TextureKind::Texture2D => {
                    self.gl.tex_image_2d(
                        target, 0, internal, width, height, 0,
                        format.format, format.component, glow::PixelUnpackData::Slice(upload.layers.first().copied()),
                    );
                }
            }
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, 0);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, gl_format::min_filter(upload.filter) as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, gl_format::mag_filter(upload.filter) as i32);
            let wrap = gl_format::wrap_mode(upload.wrap) as i32;
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap);
            self.gl.bind_texture(target, None);
        }

        Ok(TextureMeta { target, width: upload.width, height: upload.height })
    }
}

impl Backend for GlBackend {
    fn info(&self) -> BackendInfo {
        self.info.clone()
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
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    fn set_capability(&mut self, state: GfxStates, enabled: bool) {
        let Some(capability) = gl_format::capability(state) else {
            return;
        };
        unsafe {
            if enabled {
                self.gl.enable(capability);
            } else {
                self.gl.disable(capability);
            }
        }
    }

    fn set_depth_state(&mut self, desc: &DepthDesc) {
        unsafe {
            self.gl.depth_func(gl_format::compare_func(desc.compare));
            self.gl.depth_mask(desc.write);
        }
    }

    fn set_stencil_state(&mut self, desc: &StencilDesc) {
        unsafe {
            self.gl.stencil_func(gl_format::compare_func(desc.compare), desc.reference as i32, desc.mask);
            self.gl.stencil_op(
                gl_format::stencil_op(desc.stencil_fail),
                gl_format::stencil_op(desc.depth_fail),
                gl_format::stencil_op(desc.depth_pass),
            );
        }
    }

    fn set_blend_state(&mut self, desc: &BlendDesc) {
        unsafe {
            self.gl.blend_func_separate(
                gl_format::blend_factor(desc.src_color),
                gl_format::blend_factor(desc.dst_color),
                gl_format::blend_factor(desc.src_alpha),
                gl_format::blend_factor(desc.dst_alpha),
            );
        }
        self.set_blend_color(desc.blend_color);
    }

    fn set_cull_state(&mut self, desc: &CullDesc) {
        unsafe {
            self.gl.cull_face(gl_format::cull_face(desc.face));
            self.gl.front_face(gl_format::front_face(desc.front));
        }
    }

    fn set_stencil_mask(&mut self, mask: u32) {
        unsafe { self.gl.stencil_mask(mask) };
    }

    fn set_blend_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.blend_color(color[0], color[1], color[2], color[3]) };
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval.store(interval, Ordering::Relaxed);
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        unsafe {
            if flags.contains(ClearFlags::COLOR) {
                self.gl.clear_color(color[0], color[1], color[2], color[3]);
            }
            self.gl.clear(gl_format::clear_mask(flags));
        }
    }

    fn present(&mut self) {
        // GlSurface swaps after the engine presents.
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuHandle> {
        let target = gl_format::buffer_target(desc.buffer_type);
        let usage = gl_format::buffer_usage(desc.usage);
        let size = desc.size.max(desc.data.as_ref().map_or(0, Vec::len));

        let buffer = unsafe { self.gl.create_buffer() }
            .map_err(|e| backend_error(format!("Failed to create buffer: {}", e)))?;
        unsafe {
            // Binding an index buffer would attach it to the bound vertex array
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_size(target, size as i32, usage);
            if let Some(data) = desc.data.as_deref().filter(|data| !data.is_empty()) {
                self.gl.buffer_sub_data_u8_slice(target, 0, data);
            }
            self.gl.bind_buffer(target, None);
        }
        self.restore_vertex_array();

        let handle = handle(buffer.0);
        self.buffers.insert(handle, BufferMeta { usage, size });
        Ok(handle)
    }

    fn update_buffer(&mut self, buffer: GpuHandle, offset: usize, data: &[u8]) {
        let (Some(name), Some(meta)) = (native(buffer, glow::NativeBuffer), self.buffers.get(&buffer).copied()) else {
            engine_warn!("ember3d::gl", "Update of unknown buffer {}", buffer);
            return;
        };
        let Some(end) = offset.checked_add(data.len()) else {
            engine_warn!("ember3d::gl", "Update of buffer {} overflows at offset {}", buffer, offset);
            return;
        };

        unsafe { self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(name)) };
        if end > meta.size {
            if let Err(err) = self.grow_bound_buffer(meta, end) {
                engine_warn!("ember3d::gl", "Buffer {} kept at {} bytes: {}", buffer, meta.size, err);
                unsafe { self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None) };
                return;
            }
            self.buffers.insert(buffer, BufferMeta { size: end, ..meta });
        }
        unsafe {
            self.gl.buffer_sub_data_u8_slice(glow::COPY_WRITE_BUFFER, offset as i32, data);
            self.gl.bind_buffer(glow::COPY_WRITE_BUFFER, None);
        }
    }

    fn destroy_buffer(&mut self, buffer: GpuHandle) {
        if self.buffers.remove(&buffer).is_none() {
            return;
        }
        if let Some(name) = native(buffer, glow::NativeBuffer) {
            unsafe { self.gl.delete_buffer(name) };
        }
    }

    fn bind_uniform_buffer(&mut self, slot: u32, buffer: GpuHandle) {
        unsafe {
            self.gl.bind_buffer_base(glow::UNIFORM_BUFFER, slot, native(buffer, glow::NativeBuffer));
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> Result<GpuHandle> {
        let texture = unsafe { self.gl.create_texture() }
            .map_err(|e| backend_error(format!("Failed to create texture: {}", e)))?;
        match self.upload_texture(texture, upload) {
            Ok(meta) => {
                let handle = handle(texture.0);
                self.textures.insert(handle, meta);
                Ok(handle)
            }
            Err(err) => {
                unsafe { self.gl.delete_texture(texture) };
                Err(err)
            }
        }
    }

    fn update_texture(&mut self, texture: GpuHandle, upload: &TextureUpload<'_>) -> Result<()> {
        let Some(name) = native(texture, glow::NativeTexture).filter(|_| self.textures.contains_key(&texture)) else {
            return Err(Error::BackendError(format!("Unknown texture {}", texture)));
        };
        let meta = self.upload_texture(name, upload)?;
        self.textures.insert(texture, meta);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: GpuHandle) -> u32 {
        let Some(meta) = self.textures.get(&texture).copied() else {
            return 0;
        };
        let levels = gl_format::mip_levels(meta.width, meta.height);
        unsafe {
            self.gl.bind_texture(meta.target, native(texture, glow::NativeTexture));
            self.gl.tex_parameter_i32(meta.target, glow::TEXTURE_MAX_LEVEL, levels as i32 - 1);
            self.gl.generate_mipmap(meta.target);
            self.gl.bind_texture(meta.target, None);
        }
        engine_debug!("ember3d::gl", "Texture {} has {} mip levels", texture, levels);
        levels
    }

    fn destroy_texture(&mut self, texture: GpuHandle) {
        if self.textures.remove(&texture).is_none() {
            return;
        }
        if let Some(name) = native(texture, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(name) };
        }
    }

    fn bind_textures(&mut self, first_unit: u32, textures: &[GpuHandle]) {
        for (unit, texture) in (first_unit..).zip(textures) {
            let Some(meta) = self.textures.get(texture) else {
                continue;
            };
            unsafe {
                self.gl.active_texture(glow::TEXTURE0 + unit);
                self.gl.bind_texture(meta.target, native(*texture, glow::NativeTexture));
            }
        }
        unsafe { self.gl.active_texture(glow::TEXTURE0) };
    }

    // ===== SHADERS =====

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> CompileOutput {
        let shader = match unsafe { self.gl.create_shader(gl_format::shader_stage(stage)) } {
            Ok(shader) => shader,
            Err(err) => return CompileOutput { handle: GpuHandle::NONE, error: Some(err) },
        };
        let error = unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                None
            } else {
                Some(self.gl.get_shader_info_log(shader))
            }
        };
        CompileOutput { handle: handle(shader.0), error }
    }

    fn link_program(&mut self, vertex: GpuHandle, fragment: GpuHandle) -> CompileOutput {
        let (Some(vertex), Some(fragment)) = (native(vertex, glow::NativeShader), native(fragment, glow::NativeShader)) else {
            return CompileOutput { handle: GpuHandle::NONE, error: Some("Missing shader stage".to_string()) };
        };
        let program = match unsafe { self.gl.create_program() } {
            Ok(program) => program,
            Err(err) => return CompileOutput { handle: GpuHandle::NONE, error: Some(err) },
        };
        let error = unsafe {
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            let error = if self.gl.get_program_link_status(program) {
                None
            } else {
                Some(self.gl.get_program_info_log(program))
            };
            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            error
        };

        let handle = handle(program.0);
        self.programs.insert(handle);
        CompileOutput { handle, error }
    }

    fn delete_stage(&mut self, stage: GpuHandle) {
        if let Some(shader) = native(stage, glow::NativeShader) {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn delete_program(&mut self, program: GpuHandle) {
        if !self.programs.remove(&program) {
            return;
        }
        if self.bound_program == program {
            self.use_program(GpuHandle::NONE);
        }
        if let Some(name) = native(program, glow::NativeProgram) {
            unsafe { self.gl.delete_program(name) };
        }
    }

    fn use_program(&mut self, program: GpuHandle) {
        if self.bound_program == program {
            return;
        }
        unsafe { self.gl.use_program(native(program, glow::NativeProgram)) };
        self.bound_program = program;
    }

    fn uniform_location(&self, program: GpuHandle, name: &str) -> Option<u32> {
        let program = native(program, glow::NativeProgram)?;
        unsafe { self.gl.get_uniform_location(program, name) }.map(|location| location.0)
    }

    fn upload_uniform(&mut self, program: GpuHandle, location: u32, value: &UniformValue) {
        let previous = self.bound_program;
        self.use_program(program);
        let location = glow::NativeUniformLocation(location);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, *v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, *v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array()),
            }
        }
        self.use_program(previous);
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<GpuHandle> {
        let vertex_array = unsafe { self.gl.create_vertex_array() }
            .map_err(|e| backend_error(format!("Failed to create vertex array: {}", e)))?;
        let handle = handle(vertex_array.0);
        self.vertex_arrays.insert(handle, VertexArrayMeta::default());
        Ok(handle)
    }

    fn attach_vertex_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle, stride: usize) {
        match self.vertex_arrays.get_mut(&vertex_array) {
            Some(meta) => {
                meta.vertex_buffer = native(buffer, glow::NativeBuffer);
                meta.stride = stride as i32;
            }
            None => engine_warn!("ember3d::gl", "Vertex buffer attached to unknown vertex array {}", vertex_array),
        }
    }

    fn attach_index_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle) {
        if !self.vertex_arrays.contains_key(&vertex_array) {
            engine_warn!("ember3d::gl", "Index buffer attached to unknown vertex array {}", vertex_array);
            return;
        }
        unsafe {
            self.gl.bind_vertex_array(native(vertex_array, glow::NativeVertexArray));
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, native(buffer, glow::NativeBuffer));
        }
        self.restore_vertex_array();
    }

    fn set_vertex_attribute(&mut self, vertex_array: GpuHandle, attribute: &VertexAttribute) {
        let Some(meta) = self.vertex_arrays.get(&vertex_array).copied() else {
            engine_warn!("ember3d::gl", "Attribute set on unknown vertex array {}", vertex_array);
            return;
        };
        let kind = gl_format::component_type(attribute.kind);
        let components = attribute.components as i32;
        let offset = attribute.offset as i32;
        unsafe {
            self.gl.bind_vertex_array(native(vertex_array, glow::NativeVertexArray));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, meta.vertex_buffer);
            match attribute.kind {
                ComponentKind::Float => self.gl.vertex_attrib_pointer_f32(
                    attribute.index, components, kind, false, meta.stride, offset,
                ),
                ComponentKind::Int | ComponentKind::Uint => self.gl.vertex_attrib_pointer_i32(
                    attribute.index, components, kind, meta.stride, offset,
                ),
            }
            self.gl.enable_vertex_attrib_array(attribute.index);
            self.gl.vertex_attrib_divisor(attribute.index, attribute.divisor);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        self.restore_vertex_array();
    }

    fn bind_vertex_array(&mut self, vertex_array: GpuHandle) {
        unsafe { self.gl.bind_vertex_array(native(vertex_array, glow::NativeVertexArray)) };
        self.bound_vertex_array = vertex_array;
    }

    fn destroy_vertex_array(&mut self, vertex_array: GpuHandle) {
        if self.vertex_arrays.remove(&vertex_array).is_none() {
            return;
        }
        if self.bound_vertex_array == vertex_array {
            self.bind_vertex_array(GpuHandle::NONE);
        }
        if let Some(name) = native(vertex_array, glow::NativeVertexArray) {
            unsafe { self.gl.delete_vertex_array(name) };
        }
    }

    // ===== DRAWS =====

    fn draw_arrays(&mut self, mode: DrawMode, first: usize, count: usize) {
        unsafe { self.gl.draw_arrays(gl_format::draw_mode(mode), first as i32, count as i32) };
        self.stats.draw_calls += 1;
        self.stats.vertices += count as u64;
    }

    fn draw_elements(&mut self, mode: DrawMode, count: usize) {
        unsafe { self.gl.draw_elements(gl_format::draw_mode(mode), count as i32, glow::UNSIGNED_INT, 0) };
        self.stats.draw_calls += 1;
        self.stats.indices += count as u64;
    }
}
