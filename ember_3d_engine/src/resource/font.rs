/// Font: one R8 texture per glyph plus layout metrics

use glam::{IVec2, UVec2};
use rustc_hash::FxHashMap;

use crate::resource::TextureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// `None` for glyphs without coverage (space)
    pub texture: Option<TextureId>,
    pub size: UVec2,
    /// Offset from the pen position to the top-left of the glyph
    pub bearing: IVec2,
    /// Pen advance in pixels
    pub advance: u32,
}

#[derive(Debug, Clone)]
pub struct Font {
    pub(crate) size: u32,
    pub(crate) glyphs: FxHashMap<char, Glyph>,
    pub(crate) storage: String,
}

impl Font {
    /// Pixel size the glyphs were rasterized at
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.get(&character)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Width (sum of advances) and height (tallest glyph) of a line
    ///
    /// Characters the font does not contain are skipped.
    pub fn measure(&self, text: &str) -> UVec2 {
        text.chars()
            .filter_map(|character| self.glyphs.get(&character))
            .fold(UVec2::ZERO, |extent, glyph| {
                UVec2::new(extent.x + glyph.advance, extent.y.max(glyph.size.y))
            })
    }

    pub fn storage_name(&self) -> &str {
        &self.storage
    }
}
