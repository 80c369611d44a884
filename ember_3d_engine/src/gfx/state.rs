/// Global render state: flags, clear bits and fixed-function parameters

use bitflags::bitflags;

bitflags! {
    /// Toggleable render states
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GfxStates: u32 {
        /// Depth testing
        const DEPTH = 1 << 0;
        /// Stencil testing
        const STENCIL = 1 << 1;
        /// Color blending
        const BLEND = 1 << 2;
        /// Multisampling
        const MSAA = 1 << 3;
        /// Face culling
        const CULL = 1 << 4;
        /// Vertical sync on present
        const VSYNC = 1 << 5;
    }
}

bitflags! {
    /// Buffers cleared by `Context::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Depth/stencil comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Always,
    Never,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

/// Stencil buffer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Increment,
    IncrementWrap,
    Decrement,
    DecrementWrap,
    Invert,
}

/// Blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
}

/// Faces removed by culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

/// Winding of front faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

// ===== PARAMETER BLOCKS =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthDesc {
    pub compare: CompareFunc,
    /// Depth writes enabled
    pub write: bool,
}

impl Default for DepthDesc {
    fn default() -> Self {
        Self { compare: CompareFunc::Less, write: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilDesc {
    pub compare: CompareFunc,
    pub reference: u32,
    pub mask: u32,
    pub stencil_fail: StencilOp,
    pub depth_fail: StencilOp,
    pub depth_pass: StencilOp,
}

impl Default for StencilDesc {
    fn default() -> Self {
        Self {
            compare: CompareFunc::Always,
            reference: 1,
            mask: 0xFF,
            stencil_fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            depth_pass: StencilOp::Replace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendDesc {
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub blend_color: [f32; 4],
}

impl Default for BlendDesc {
    fn default() -> Self {
        Self {
            src_color: BlendFactor::SrcAlpha,
            dst_color: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            blend_color: [0.0; 4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullDesc {
    pub face: CullFace,
    pub front: FrontFace,
}

impl Default for CullDesc {
    fn default() -> Self {
        Self { face: CullFace::Back, front: FrontFace::CounterClockwise }
    }
}
