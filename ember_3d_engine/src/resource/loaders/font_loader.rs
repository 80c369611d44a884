/// Font assembly: one R8 texture per visible glyph

use glam::{IVec2, UVec2};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::gfx::{TextureDesc, TextureFilter, TextureFormat, TextureWrap};
use crate::resource::nbr::NbrFont;
use crate::resource::{Font, Glyph, ResourceStorage};
use crate::{engine_debug, engine_warn};

pub(crate) fn load(storage: &mut ResourceStorage, font: NbrFont) -> Result<Font> {
    let mut glyphs = FxHashMap::default();

    for glyph in font.glyphs {
        let Some(character) = char::from_u32(glyph.codepoint) else {
            engine_warn!("ember3d::FontLoader", "Skipping invalid codepoint 0x{:X}", glyph.codepoint);
            continue;
        };

        let texture = if glyph.width > 0 && glyph.height > 0 {
            let desc = TextureDesc {
                width: glyph.width,
                height: glyph.height,
                depth: 1,
                format: TextureFormat::R8,
                filter: TextureFilter::MinMagLinear,
                wrap: TextureWrap::ClampToEdge,
                data: Some(glyph.pixels),
            };
            Some(storage.push_texture(&desc)?)
        } else {
            None
        };

        glyphs.insert(character, Glyph {
            texture,
            size: UVec2::new(glyph.width, glyph.height),
            bearing: IVec2::new(glyph.left, glyph.top),
            advance: glyph.advance,
        });
    }

    engine_debug!("ember3d::FontLoader", "Font loaded: {} glyphs at {}px", glyphs.len(), font.size);
    Ok(Font {
        size: font.size,
        glyphs,
        storage: storage.name().to_string(),
    })
}
