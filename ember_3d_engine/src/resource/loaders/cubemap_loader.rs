/// Container cubemap body to `CubemapDesc`

use crate::error::Result;
use crate::gfx::{CubemapDesc, TextureFilter, TextureWrap};
use crate::resource::loaders::texture_loader::format_for_channels;
use crate::resource::nbr::NbrCubemap;

/// Sampling options for file-backed cubemaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubemapOptions {
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

impl Default for CubemapOptions {
    fn default() -> Self {
        Self { filter: TextureFilter::MinMagLinear, wrap: TextureWrap::ClampToEdge }
    }
}

pub(crate) fn load(cubemap: NbrCubemap, options: &CubemapOptions) -> Result<CubemapDesc> {
    let format = format_for_channels("ember3d::CubemapLoader", cubemap.channels)?;
    Ok(CubemapDesc {
        width: cubemap.width,
        height: cubemap.height,
        format,
        filter: options.filter,
        wrap: options.wrap,
        faces: cubemap.faces,
    })
}
