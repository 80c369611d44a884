//! Engine enums to OpenGL enums
//!
//! Pure mappings with no GL calls, so they are testable without a context.

use ember_3d_engine::ember3d::gfx::{
    BlendFactor, BufferType, BufferUsage, ClearFlags, CompareFunc, ComponentKind, CullFace,
    DrawMode, FilterMode, FrontFace, GfxStates, PixelLayout, SamplerFilter, ShaderStage,
    StencilOp, TextureKind, TextureWrap,
};

/// Internal format, pixel format and component type of a texture upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GlPixelFormat {
    pub internal: u32,
    pub format: u32,
    pub component: u32,
}

pub(crate) fn pixel_format(layout: PixelLayout) -> Option<GlPixelFormat> {
    let (internal, format) = match (layout.channels, layout.bits_per_channel) {
        (1, 8) => (glow::R8, glow::RED),
        (1, 16) => (glow::R16, glow::RED),
        (2, 8) => (glow::RG8, glow::RG),
        (2, 16) => (glow::RG16, glow::RG),
        (4, 8) => (glow::RGBA8, glow::RGBA),
        (4, 16) => (glow::RGBA16, glow::RGBA),
        _ => return None,
    };
    let component = if layout.bits_per_channel == 16 { glow::UNSIGNED_SHORT } else { glow::UNSIGNED_BYTE };
    Some(GlPixelFormat { internal, format, component })
}

/// `depth > 1` on a 2D texture selects an array texture
pub(crate) fn texture_target(kind: TextureKind, depth: u32) -> u32 {
    match kind {
        TextureKind::Cubemap => glow::TEXTURE_CUBE_MAP,
        TextureKind::Texture2D if depth > 1 => glow::TEXTURE_2D_ARRAY,
        TextureKind::Texture2D => glow::TEXTURE_2D,
    }
}

pub(crate) fn min_filter(filter: SamplerFilter) -> u32 {
    match (filter.min, filter.mipmapped) {
        (FilterMode::Nearest, false) => glow::NEAREST,
        (FilterMode::Linear, false) => glow::LINEAR,
        (FilterMode::Nearest, true) => glow::NEAREST_MIPMAP_LINEAR,
        (FilterMode::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub(crate) fn mag_filter(filter: SamplerFilter) -> u32 {
    match filter.mag {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear => glow::LINEAR,
    }
}

pub(crate) fn wrap_mode(wrap: TextureWrap) -> u32 {
    match wrap {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
    }
}

/// Number of levels in a full mip chain
pub(crate) fn mip_levels(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// `None` for states that are not GL capabilities (vsync)
pub(crate) fn capability(state: GfxStates) -> Option<u32> {
    if state == GfxStates::DEPTH {
        Some(glow::DEPTH_TEST)
    } else if state == GfxStates::STENCIL {
        Some(glow::STENCIL_TEST)
    } else if state == GfxStates::BLEND {
        Some(glow::BLEND)
    } else if state == GfxStates::MSAA {
        Some(glow::MULTISAMPLE)
    } else if state == GfxStates::CULL {
        Some(glow::CULL_FACE)
    } else {
        None
    }
}

pub(crate) fn clear_mask(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

pub(crate) fn compare_func(func: CompareFunc) -> u32 {
    match func {
        CompareFunc::Always => glow::ALWAYS,
        CompareFunc::Never => glow::NEVER,
        CompareFunc::Less => glow::LESS,
        CompareFunc::LessEqual => glow::LEQUAL,
        CompareFunc::Greater => glow::GREATER,
        CompareFunc::GreaterEqual => glow::GEQUAL,
        CompareFunc::Equal => glow::EQUAL,
        CompareFunc::NotEqual => glow::NOTEQUAL,
    }
}

pub(crate) fn stencil_op(op: StencilOp) -> u32 {
    match op {
        StencilOp::Keep => glow::KEEP,
        StencilOp::Zero => glow::ZERO,
        StencilOp::Replace => glow::REPLACE,
        StencilOp::Increment => glow::INCR,
        StencilOp::IncrementWrap => glow::INCR_WRAP,
        StencilOp::Decrement => glow::DECR,
        StencilOp::DecrementWrap => glow::DECR_WRAP,
        StencilOp::Invert => glow::INVERT,
    }
}

pub(crate) fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
    }
}

pub(crate) fn cull_face(face: CullFace) -> u32 {
    match face {
        CullFace::Front => glow::FRONT,
        CullFace::Back => glow::BACK,
        CullFace::FrontAndBack => glow::FRONT_AND_BACK,
    }
}

pub(crate) fn front_face(front: FrontFace) -> u32 {
    match front {
        FrontFace::Clockwise => glow::CW,
        FrontFace::CounterClockwise => glow::CCW,
    }
}

pub(crate) fn buffer_target(buffer_type: BufferType) -> u32 {
    match buffer_type {
        BufferType::Vertex => glow::ARRAY_BUFFER,
        BufferType::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferType::Uniform => glow::UNIFORM_BUFFER,
    }
}

pub(crate) fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        BufferUsage::DynamicRead => glow::DYNAMIC_READ,
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::StaticRead => glow::STATIC_READ,
    }
}

pub(crate) fn draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Point => glow::POINTS,
        DrawMode::Triangle => glow::TRIANGLES,
        DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
        DrawMode::Line => glow::LINES,
        DrawMode::LineStrip => glow::LINE_STRIP,
    }
}

pub(crate) fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub(crate) fn component_type(kind: ComponentKind) -> u32 {
    match kind {
        ComponentKind::Float => glow::FLOAT,
        ComponentKind::Int => glow::INT,
        ComponentKind::Uint => glow::UNSIGNED_INT,
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
