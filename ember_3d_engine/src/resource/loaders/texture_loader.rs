/// Container texture body to `TextureDesc`

use crate::error::Result;
use crate::engine_bail;
use crate::gfx::{TextureDesc, TextureFilter, TextureFormat, TextureWrap};
use crate::resource::nbr::NbrTexture;

/// Sampling options for file-backed textures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    /// Forced format; derived from the channel count when `None`
    pub format: Option<TextureFormat>,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            format: None,
            filter: TextureFilter::MinTrilinearMagLinear,
            wrap: TextureWrap::Repeat,
        }
    }
}

/// 8-bit format matching a channel count
pub(crate) fn format_for_channels(source: &'static str, channels: u8) -> Result<TextureFormat> {
    match TextureFormat::from_layout(u32::from(channels), 8) {
        Some(format) => Ok(format),
        None => engine_bail!(source, "No texture format with {} channels", channels),
    }
}

pub(crate) fn load(texture: NbrTexture, options: &TextureOptions) -> Result<TextureDesc> {
    let format = match options.format {
        Some(format) => format,
        None => format_for_channels("ember3d::TextureLoader", texture.channels)?,
    };
    Ok(TextureDesc {
        width: texture.width,
        height: texture.height,
        depth: 1,
        format,
        filter: options.filter,
        wrap: options.wrap,
        data: Some(texture.pixels),
    })
}
