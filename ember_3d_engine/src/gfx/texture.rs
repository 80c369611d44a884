/// Textures and cubemaps
///
/// Both kinds translate their format and filter through the lookup tables
/// and regenerate the mip chain on creation and on every update.

use std::sync::Mutex;

use crate::error::Result;
use crate::engine_bail;
use crate::gfx::backend::{PixelLayout, SamplerFilter, TextureKind, TextureUpload};
use crate::gfx::gpu_object::{DestroyFlag, GpuObject};
use crate::gfx::table::{FILTER_TABLE, FORMAT_TABLE};
use crate::gfx::{Context, GpuHandle};
use crate::utils::lock;

/// Maximum number of faces in a cubemap
pub const CUBEMAP_FACES_MAX: usize = 6;

// ===== ENUMS =====

/// Pixel format: channel count and bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 1 channel, 8 bits
    R8,
    /// 1 channel, 16 bits
    R16,
    /// 2 channels, 8 bits
    Rg8,
    /// 2 channels, 16 bits
    Rg16,
    /// 4 channels, 8 bits
    Rgba8,
    /// 4 channels, 16 bits
    Rgba16,
}

impl TextureFormat {
    /// Backend pixel layout of the format
    pub fn layout(&self) -> Option<PixelLayout> {
        FORMAT_TABLE.forward(*self)
    }

    /// Format storing `channels` channels of `bits_per_channel` bits
    pub fn from_layout(channels: u32, bits_per_channel: u32) -> Option<TextureFormat> {
        FORMAT_TABLE.reverse(PixelLayout { channels, bits_per_channel })
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.layout().map_or(0, |layout| layout.bytes_per_pixel())
    }
}

/// Minify/magnify filter presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    MinMagLinear,
    MinMagNearest,
    MinLinearMagNearest,
    MinNearestMagLinear,
    /// Trilinear minify, linear magnify
    MinTrilinearMagLinear,
    /// Trilinear minify, nearest magnify
    MinTrilinearMagNearest,
}

impl TextureFilter {
    pub fn sampler(&self) -> Option<SamplerFilter> {
        FILTER_TABLE.forward(*self)
    }
}

/// Addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

// ===== DESCRIPTORS =====

/// Descriptor for creating a 2D (or layered) texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    /// Number of layers (0 and 1 both mean a plain 2D texture)
    pub depth: u32,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    /// Tightly packed pixels for every layer
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Empty RGBA8 texture with linear filtering
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
            format: TextureFormat::Rgba8,
            filter: TextureFilter::MinMagLinear,
            wrap: TextureWrap::Repeat,
            data: None,
        }
    }
}

/// Observable description of a live texture (no pixel data)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    pub mip_levels: u32,
}

/// Descriptor for creating a cubemap
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    /// One pixel buffer per face, in +X, -X, +Y, -Y, +Z, -Z order
    pub faces: Vec<Vec<u8>>,
}

// ===== TRANSLATION =====

fn translate(
    source: &'static str,
    format: TextureFormat,
    filter: TextureFilter,
) -> Result<(PixelLayout, SamplerFilter)> {
    let layout = format.layout().ok_or_else(|| {
        crate::engine_err!(source, "No pixel layout for format {:?}", format)
    })?;
    let sampler = filter.sampler().ok_or_else(|| {
        crate::engine_err!(source, "No sampler filter for {:?}", filter)
    })?;
    Ok((layout, sampler))
}

fn check_size(source: &'static str, what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(crate::engine_err!(source,
            "{} holds {} bytes, expected {}", what, actual, expected));
    }
    Ok(())
}

// ============================================================================
// Texture
// ============================================================================

/// 2D texture
#[derive(Debug)]
pub struct Texture {
    handle: GpuHandle,
    info: Mutex<TextureInfo>,
    destroyed: DestroyFlag,
}

impl Texture {
    /// Create a texture and generate its mip chain
    pub fn create(context: &Context, desc: &TextureDesc) -> Result<Self> {
        let (layout, filter) = Self::validate(desc)?;
        let upload = Self::upload(desc, layout, filter);

        let mut device = context.device();
        let handle = device.create_texture(&upload)?;
        let mip_levels = device.generate_mipmaps(handle);

        Ok(Self {
            handle,
            info: Mutex::new(Self::info_from(desc, mip_levels)),
            destroyed: DestroyFlag::default(),
        })
    }

    /// Replace dimensions, sampling state and contents, then regenerate mipmaps
    pub fn update(&self, context: &Context, desc: &TextureDesc) -> Result<()> {
        let (layout, filter) = Self::validate(desc)?;
        let upload = Self::upload(desc, layout, filter);

        let mut device = context.device();
        device.update_texture(self.handle, &upload)?;
        let mip_levels = device.generate_mipmaps(self.handle);
        *lock(&self.info) = Self::info_from(desc, mip_levels);
        Ok(())
    }

    pub fn info(&self) -> TextureInfo {
        *lock(&self.info)
    }

    pub fn width(&self) -> u32 {
        self.info().width
    }

    pub fn height(&self) -> u32 {
        self.info().height
    }

    pub fn depth(&self) -> u32 {
        self.info().depth
    }

    pub fn format(&self) -> TextureFormat {
        self.info().format
    }

    pub fn filter(&self) -> TextureFilter {
        self.info().filter
    }

    pub fn wrap(&self) -> TextureWrap {
        self.info().wrap
    }

    // ========== VALIDATION ==========

    fn validate(desc: &TextureDesc) -> Result<(PixelLayout, SamplerFilter)> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("ember3d::Texture",
                "Texture dimensions must be non-zero ({}x{})", desc.width, desc.height);
        }
        let translated = translate("ember3d::Texture", desc.format, desc.filter)?;
        if let Some(data) = &desc.data {
            let expected = desc.width as usize
                * desc.height as usize
                * desc.depth.max(1) as usize
                * translated.0.bytes_per_pixel();
            check_size("ember3d::Texture", "Texture data", data.len(), expected)?;
        }
        Ok(translated)
    }

    fn upload(desc: &TextureDesc, layout: PixelLayout, filter: SamplerFilter) -> TextureUpload<'_> {
        let depth = desc.depth.max(1);
        let layers = match &desc.data {
            Some(data) => {
                let layer_size = data.len() / depth as usize;
                data.chunks(layer_size.max(1)).collect()
            }
            None => Vec::new(),
        };
        TextureUpload {
            kind: TextureKind::Texture2D,
            width: desc.width,
            height: desc.height,
            depth,
            layout,
            filter,
            wrap: desc.wrap,
            layers,
        }
    }

    fn info_from(desc: &TextureDesc, mip_levels: u32) -> TextureInfo {
        TextureInfo {
            width: desc.width,
            height: desc.height,
            depth: desc.depth,
            format: desc.format,
            filter: desc.filter,
            wrap: desc.wrap,
            mip_levels,
        }
    }
}

impl GpuObject for Texture {
    fn label(&self) -> &'static str {
        "Texture"
    }

    fn handle(&self) -> GpuHandle {
        self.handle
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.is_set()
    }

    fn destroy(&self, context: &Context) {
        if self.destroyed.mark() {
            context.device().destroy_texture(self.handle);
        }
    }
}

// ============================================================================
// Cubemap
// ============================================================================

/// Cubemap texture (up to six faces sharing one size and format)
#[derive(Debug)]
pub struct Cubemap {
    handle: GpuHandle,
    info: Mutex<TextureInfo>,
    faces_count: Mutex<usize>,
    destroyed: DestroyFlag,
}

impl Cubemap {
    /// Create a cubemap and generate its mip chain
    pub fn create(context: &Context, desc: &CubemapDesc) -> Result<Self> {
        let (layout, filter) = Self::validate(desc)?;
        let upload = Self::upload(desc, layout, filter);

        let mut device = context.device();
        let handle = device.create_texture(&upload)?;
        let mip_levels = device.generate_mipmaps(handle);

        Ok(Self {
            handle,
            info: Mutex::new(Self::info_from(desc, mip_levels)),
            faces_count: Mutex::new(desc.faces.len()),
            destroyed: DestroyFlag::default(),
        })
    }

    /// Replace every face, then regenerate mipmaps
    pub fn update(&self, context: &Context, desc: &CubemapDesc) -> Result<()> {
        let (layout, filter) = Self::validate(desc)?;
        let upload = Self::upload(desc, layout, filter);

        let mut device = context.device();
        device.update_texture(self.handle, &upload)?;
        let mip_levels = device.generate_mipmaps(self.handle);
        *lock(&self.info) = Self::info_from(desc, mip_levels);
        *lock(&self.faces_count) = desc.faces.len();
        Ok(())
    }

    pub fn info(&self) -> TextureInfo {
        *lock(&self.info)
    }

    pub fn width(&self) -> u32 {
        self.info().width
    }

    pub fn height(&self) -> u32 {
        self.info().height
    }

    pub fn format(&self) -> TextureFormat {
        self.info().format
    }

    pub fn faces_count(&self) -> usize {
        *lock(&self.faces_count)
    }

    // ========== VALIDATION ==========

    fn validate(desc: &CubemapDesc) -> Result<(PixelLayout, SamplerFilter)> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("ember3d::Cubemap",
                "Cubemap dimensions must be non-zero ({}x{})", desc.width, desc.height);
        }
        if desc.faces.is_empty() || desc.faces.len() > CUBEMAP_FACES_MAX {
            engine_bail!("ember3d::Cubemap",
                "Cubemap needs 1 to {} faces, got {}", CUBEMAP_FACES_MAX, desc.faces.len());
        }
        let translated = translate("ember3d::Cubemap", desc.format, desc.filter)?;
        let expected = desc.width as usize * desc.height as usize * translated.0.bytes_per_pixel();
        for (index, face) in desc.faces.iter().enumerate() {
            check_size("ember3d::Cubemap", &format!("Face {}", index), face.len(), expected)?;
        }
        Ok(translated)
    }

    fn upload(desc: &CubemapDesc, layout: PixelLayout, filter: SamplerFilter) -> TextureUpload<'_> {
        TextureUpload {
            kind: TextureKind::Cubemap,
            width: desc.width,
            height: desc.height,
            depth: desc.faces.len() as u32,
            layout,
            filter,
            wrap: desc.wrap,
            layers: desc.faces.iter().map(|face| face.as_slice()).collect(),
        }
    }

    fn info_from(desc: &CubemapDesc, mip_levels: u32) -> TextureInfo {
        TextureInfo {
            width: desc.width,
            height: desc.height,
            depth: 1,
            format: desc.format,
            filter: desc.filter,
            wrap: desc.wrap,
            mip_levels,
        }
    }
}

impl GpuObject for Cubemap {
    fn label(&self) -> &'static str {
        "Cubemap"
    }

    fn handle(&self) -> GpuHandle {
        self.handle
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.is_set()
    }

    fn destroy(&self, context: &Context) {
        if self.destroyed.mark() {
            context.device().destroy_texture(self.handle);
        }
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
