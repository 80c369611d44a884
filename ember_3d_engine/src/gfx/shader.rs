/// Shader programs built from one combined source blob
///
/// The blob holds the vertex stage followed by the fragment stage; the
/// fragment stage starts at the second `#version` directive. Compile and
/// link failures never abort creation: they are logged as warnings and
/// reported through [`ShaderStatus`]. `Shader::create_strict` turns them
/// into errors for callers that prefer a hard failure.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::{Error, Result};
use crate::gfx::gpu_object::{DestroyFlag, GpuObject};
use crate::gfx::{Buffer, Context, GpuHandle};
use crate::utils::lock;
use crate::{engine_debug, engine_error, engine_warn};

/// Directive that opens each stage in a combined source
pub const SHADER_STAGE_MARKER: &str = "#version";

/// Maximum uniform buffers attached to one stage
pub const UNIFORM_BUFFERS_MAX: usize = 8;

// ===== STAGES =====

/// Programmable stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn index(&self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
        }
    }
}

/// Binding point of a stage slot
///
/// Vertex slots map to `0..UNIFORM_BUFFERS_MAX`, fragment slots to the
/// range right after it.
pub fn uniform_binding(stage: ShaderStage, slot: u32) -> u32 {
    (stage.index() * UNIFORM_BUFFERS_MAX) as u32 + slot
}

type UniformSlots = [Option<Arc<Buffer>>; UNIFORM_BUFFERS_MAX];

fn empty_slots() -> UniformSlots {
    std::array::from_fn(|_| None)
}

fn is_attached(slot: &Option<Arc<Buffer>>, buffer: &Arc<Buffer>) -> bool {
    slot.as_ref().is_some_and(|attached| Arc::ptr_eq(attached, buffer))
}

// ===== SOURCE SPLIT =====

/// Byte spans of a combined source
///
/// `vertex`, `separator` and `fragment` are contiguous and together cover
/// the whole input. The separator is the newline right before the second
/// stage marker (empty when the marker is not preceded by one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSplit {
    pub vertex: Range<usize>,
    pub separator: Range<usize>,
    pub fragment: Range<usize>,
}

impl ShaderSplit {
    pub fn vertex_source<'a>(&self, source: &'a str) -> &'a str {
        &source[self.vertex.clone()]
    }

    pub fn fragment_source<'a>(&self, source: &'a str) -> &'a str {
        &source[self.fragment.clone()]
    }
}

/// Split a combined source at the second stage marker
///
/// Returns `None` when the source holds fewer than two markers.
pub fn split_source(source: &str) -> Option<ShaderSplit> {
    let first = source.find(SHADER_STAGE_MARKER)?;
    let search_from = first + SHADER_STAGE_MARKER.len();
    let second = search_from + source[search_from..].find(SHADER_STAGE_MARKER)?;

    let separator_start = if source[..second].ends_with('\n') { second - 1 } else { second };

    Some(ShaderSplit {
        vertex: 0..separator_start,
        separator: separator_start..second,
        fragment: second..source.len(),
    })
}

// ===== STATUS =====

/// Outcome of building a shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderStatus {
    /// Both stages compiled and the program linked
    Ready,
    /// The source does not contain two stages
    MissingStage,
    /// A stage failed to compile (info log attached)
    CompileFailed { stage: ShaderStage, log: String },
    /// Linking failed (info log attached)
    LinkFailed { log: String },
}

impl ShaderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ShaderStatus::Ready)
    }
}

// ===== UNIFORM VALUES =====

/// Value of a plain (non-block) uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

// ============================================================================
// Shader
// ============================================================================

/// Linked shader program plus its attached uniform buffers
#[derive(Debug)]
pub struct Shader {
    program: GpuHandle,
    status: ShaderStatus,
    uniform_buffers: Mutex<[UniformSlots; 2]>,
    destroyed: DestroyFlag,
}

impl Shader {
    /// Build a program from a combined source
    ///
    /// Failures are logged and reflected in [`Shader::status`].
    pub fn create(context: &Context, source: &str) -> Self {
        let Some(split) = split_source(source) else {
            engine_warn!("ember3d::Shader",
                "Source holds fewer than two '{}' markers, no program built", SHADER_STAGE_MARKER);
            return Self::with_status(GpuHandle::NONE, ShaderStatus::MissingStage);
        };

        let mut device = context.device();
        let mut status = ShaderStatus::Ready;

        let vertex = device.compile_stage(ShaderStage::Vertex, split.vertex_source(source));
        if let Some(log) = &vertex.error {
            engine_warn!("ember3d::Shader", "Vertex stage failed to compile: {}", log);
            status = ShaderStatus::CompileFailed { stage: ShaderStage::Vertex, log: log.clone() };
        }

        let fragment = device.compile_stage(ShaderStage::Fragment, split.fragment_source(source));
        if let Some(log) = &fragment.error {
            engine_warn!("ember3d::Shader", "Fragment stage failed to compile: {}", log);
            if status.is_ready() {
                status = ShaderStatus::CompileFailed { stage: ShaderStage::Fragment, log: log.clone() };
            }
        }

        let program = device.link_program(vertex.handle, fragment.handle);
        if let Some(log) = &program.error {
            engine_warn!("ember3d::Shader", "Program failed to link: {}", log);
            if status.is_ready() {
                status = ShaderStatus::LinkFailed { log: log.clone() };
            }
        }

        device.delete_stage(vertex.handle);
        device.delete_stage(fragment.handle);

        engine_debug!("ember3d::Shader", "Program {} built ({:?})", program.handle, status);
        Self::with_status(program.handle, status)
    }

    /// Build a program, failing if any stage or the link failed
    pub fn create_strict(context: &Context, source: &str) -> Result<Self> {
        let shader = Self::create(context, source);
        if shader.status.is_ready() {
            return Ok(shader);
        }
        let status = shader.status.clone();
        shader.destroy(context);
        engine_error!("ember3d::Shader", "Strict shader creation failed: {:?}", status);
        Err(Error::InvalidResource(format!("Shader not usable: {:?}", status)))
    }

    fn with_status(program: GpuHandle, status: ShaderStatus) -> Self {
        Self {
            program,
            status,
            uniform_buffers: Mutex::new([empty_slots(), empty_slots()]),
            destroyed: DestroyFlag::default(),
        }
    }

    pub fn status(&self) -> &ShaderStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    pub fn program(&self) -> GpuHandle {
        self.program
    }

    // ===== UNIFORM BUFFERS =====

    /// Attach a uniform buffer to the first free slot of `stage`
    ///
    /// Returns the slot. Re-attaching a buffer returns its existing slot;
    /// a full stage logs an error and returns `None`.
    pub fn attach_uniform(&self, context: &Context, stage: ShaderStage, buffer: &Arc<Buffer>) -> Option<u32> {
        let mut device = context.device();
        let mut slots = lock(&self.uniform_buffers);
        let list = &mut slots[stage.index()];

        if let Some(slot) = list.iter().position(|attached| is_attached(attached, buffer)) {
            return Some(slot as u32);
        }
        let Some(slot) = list.iter().position(Option::is_none) else {
            engine_error!("ember3d::Shader",
                "{:?} stage already holds {} uniform buffers", stage, UNIFORM_BUFFERS_MAX);
            return None;
        };

        list[slot] = Some(Arc::clone(buffer));
        device.bind_uniform_buffer(uniform_binding(stage, slot as u32), buffer.handle());
        Some(slot as u32)
    }

    /// Attach a uniform buffer to a given slot of `stage`, replacing its occupant
    ///
    /// A slot past [`UNIFORM_BUFFERS_MAX`] logs an error and returns `None`.
    pub fn attach_uniform_at(
        &self,
        context: &Context,
        stage: ShaderStage,
        slot: u32,
        buffer: &Arc<Buffer>,
    ) -> Option<u32> {
        if slot as usize >= UNIFORM_BUFFERS_MAX {
            engine_error!("ember3d::Shader",
                "Uniform slot {} out of range ({} per stage)", slot, UNIFORM_BUFFERS_MAX);
            return None;
        }

        let mut device = context.device();
        let mut slots = lock(&self.uniform_buffers);
        slots[stage.index()][slot as usize] = Some(Arc::clone(buffer));
        device.bind_uniform_buffer(uniform_binding(stage, slot), buffer.handle());
        Some(slot)
    }

    /// Buffer attached to `slot` of `stage`
    pub fn uniform_buffer(&self, stage: ShaderStage, slot: u32) -> Option<Arc<Buffer>> {
        lock(&self.uniform_buffers)[stage.index()].get(slot as usize).cloned().flatten()
    }

    /// Number of uniform buffers attached to `stage`
    pub fn uniform_buffer_count(&self, stage: ShaderStage) -> usize {
        lock(&self.uniform_buffers)[stage.index()].iter().flatten().count()
    }

    /// Re-bind every attached uniform buffer and push its CPU contents
    pub(crate) fn push_uniform_buffers(&self, device: &mut dyn crate::gfx::Backend) {
        let slots = lock(&self.uniform_buffers);
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            for (slot, buffer) in slots[stage.index()].iter().enumerate() {
                let Some(buffer) = buffer else { continue };
                device.bind_uniform_buffer(uniform_binding(stage, slot as u32), buffer.handle());
                buffer.with_contents(|contents| device.update_buffer(buffer.handle(), 0, contents));
            }
        }
    }

    // ===== PLAIN UNIFORMS =====

    /// Location of a uniform, warning when the program has none by that name
    pub fn uniform_location(&self, context: &Context, name: &str) -> Option<u32> {
        let location = context.device().uniform_location(self.program, name);
        if location.is_none() {
            engine_warn!("ember3d::Shader", "Uniform '{}' not found in program {}", name, self.program);
        }
        location
    }

    /// Upload a value to a known location
    pub fn upload_uniform(&self, context: &Context, location: u32, value: &UniformValue) {
        context.device().upload_uniform(self.program, location, value);
    }

    /// Look up `name` and upload `value`; unknown names are a no-op
    pub fn set_uniform(&self, context: &Context, name: &str, value: impl Into<UniformValue>) {
        if let Some(location) = self.uniform_location(context, name) {
            self.upload_uniform(context, location, &value.into());
        }
    }
}

impl GpuObject for Shader {
    fn label(&self) -> &'static str {
        "Shader"
    }

    fn handle(&self) -> GpuHandle {
        self.program
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.is_set()
    }

    fn destroy(&self, context: &Context) {
        if self.destroyed.mark() {
            *lock(&self.uniform_buffers) = [empty_slots(), empty_slots()];
            if !self.program.is_none() {
                context.device().delete_program(self.program);
            }
        }
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
