/// Bidirectional lookup tables between abstract enums and backend values
///
/// One table per enumeration. Factory code translates with `forward`,
/// loaders go the other way with `reverse` (e.g. channel count to format).

use crate::gfx::backend::{AttributeFormat, ComponentKind, FilterMode, PixelLayout, SamplerFilter};
use crate::gfx::{LayoutType, TextureFilter, TextureFormat};

/// Static pair list searchable from either side
#[derive(Debug, Clone, Copy)]
pub struct LookupTable<A: 'static, B: 'static> {
    pairs: &'static [(A, B)],
}

impl<A: Copy + PartialEq, B: Copy + PartialEq> LookupTable<A, B> {
    pub const fn new(pairs: &'static [(A, B)]) -> Self {
        Self { pairs }
    }

    /// Abstract value to backend value
    pub fn forward(&self, key: A) -> Option<B> {
        self.pairs.iter().find(|(a, _)| *a == key).map(|(_, b)| *b)
    }

    /// Backend value to abstract value (first match)
    pub fn reverse(&self, value: B) -> Option<A> {
        self.pairs.iter().find(|(_, b)| *b == value).map(|(a, _)| *a)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(A, B)> {
        self.pairs.iter()
    }
}

const fn pixels(channels: u32, bits_per_channel: u32) -> PixelLayout {
    PixelLayout { channels, bits_per_channel }
}

const fn sampler(min: FilterMode, mag: FilterMode, mipmapped: bool) -> SamplerFilter {
    SamplerFilter { min, mag, mipmapped }
}

const fn attribute(kind: ComponentKind, components: u32, semantics: u32) -> AttributeFormat {
    AttributeFormat { kind, components, semantics }
}

// ===== TEXTURE FORMATS =====

static FORMAT_PAIRS: [(TextureFormat, PixelLayout); 6] = [
    (TextureFormat::R8, pixels(1, 8)),
    (TextureFormat::R16, pixels(1, 16)),
    (TextureFormat::Rg8, pixels(2, 8)),
    (TextureFormat::Rg16, pixels(2, 16)),
    (TextureFormat::Rgba8, pixels(4, 8)),
    (TextureFormat::Rgba16, pixels(4, 16)),
];

pub static FORMAT_TABLE: LookupTable<TextureFormat, PixelLayout> = LookupTable::new(&FORMAT_PAIRS);

// ===== TEXTURE FILTERS =====

static FILTER_PAIRS: [(TextureFilter, SamplerFilter); 6] = [
    (TextureFilter::MinMagLinear, sampler(FilterMode::Linear, FilterMode::Linear, false)),
    (TextureFilter::MinMagNearest, sampler(FilterMode::Nearest, FilterMode::Nearest, false)),
    (TextureFilter::MinLinearMagNearest, sampler(FilterMode::Linear, FilterMode::Nearest, false)),
    (TextureFilter::MinNearestMagLinear, sampler(FilterMode::Nearest, FilterMode::Linear, false)),
    (TextureFilter::MinTrilinearMagLinear, sampler(FilterMode::Linear, FilterMode::Linear, true)),
    (TextureFilter::MinTrilinearMagNearest, sampler(FilterMode::Linear, FilterMode::Nearest, true)),
];

pub static FILTER_TABLE: LookupTable<TextureFilter, SamplerFilter> = LookupTable::new(&FILTER_PAIRS);

// ===== VERTEX LAYOUT TYPES =====

static LAYOUT_PAIRS: [(LayoutType, AttributeFormat); 15] = [
    (LayoutType::Float1, attribute(ComponentKind::Float, 1, 1)),
    (LayoutType::Float2, attribute(ComponentKind::Float, 2, 1)),
    (LayoutType::Float3, attribute(ComponentKind::Float, 3, 1)),
    (LayoutType::Float4, attribute(ComponentKind::Float, 4, 1)),
    (LayoutType::Int1, attribute(ComponentKind::Int, 1, 1)),
    (LayoutType::Int2, attribute(ComponentKind::Int, 2, 1)),
    (LayoutType::Int3, attribute(ComponentKind::Int, 3, 1)),
    (LayoutType::Int4, attribute(ComponentKind::Int, 4, 1)),
    (LayoutType::Uint1, attribute(ComponentKind::Uint, 1, 1)),
    (LayoutType::Uint2, attribute(ComponentKind::Uint, 2, 1)),
    (LayoutType::Uint3, attribute(ComponentKind::Uint, 3, 1)),
    (LayoutType::Uint4, attribute(ComponentKind::Uint, 4, 1)),
    (LayoutType::Mat2, attribute(ComponentKind::Float, 2, 2)),
    (LayoutType::Mat3, attribute(ComponentKind::Float, 3, 3)),
    (LayoutType::Mat4, attribute(ComponentKind::Float, 4, 4)),
];

pub static LAYOUT_TABLE: LookupTable<LayoutType, AttributeFormat> = LookupTable::new(&LAYOUT_PAIRS);

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
