//! Unit tests for the lookup tables

use crate::gfx::backend::{ComponentKind, FilterMode, PixelLayout};
use crate::gfx::table::{FILTER_TABLE, FORMAT_TABLE, LAYOUT_TABLE};
use crate::gfx::{LayoutType, TextureFilter, TextureFormat};

#[test]
fn test_format_table_round_trips_every_entry() {
    for (format, layout) in FORMAT_TABLE.iter() {
        assert_eq!(FORMAT_TABLE.forward(*format), Some(*layout));
        assert_eq!(FORMAT_TABLE.reverse(*layout), Some(*format));
    }
    assert_eq!(FORMAT_TABLE.len(), 6);
}

#[test]
fn test_format_reverse_by_channel_count() {
    assert_eq!(TextureFormat::from_layout(1, 8), Some(TextureFormat::R8));
    assert_eq!(TextureFormat::from_layout(4, 16), Some(TextureFormat::Rgba16));
    assert_eq!(TextureFormat::from_layout(3, 8), None);
    assert_eq!(FORMAT_TABLE.reverse(PixelLayout { channels: 2, bits_per_channel: 8 }), Some(TextureFormat::Rg8));
}

#[test]
fn test_filter_table() {
    let trilinear = FILTER_TABLE.forward(TextureFilter::MinTrilinearMagNearest).unwrap();
    assert!(trilinear.mipmapped);
    assert_eq!(trilinear.min, FilterMode::Linear);
    assert_eq!(trilinear.mag, FilterMode::Nearest);

    let nearest = TextureFilter::MinMagNearest.sampler().unwrap();
    assert!(!nearest.mipmapped);
    assert_eq!(FILTER_TABLE.reverse(nearest), Some(TextureFilter::MinMagNearest));
}

#[test]
fn test_layout_table_covers_every_type() {
    assert_eq!(LAYOUT_TABLE.len(), 15);
    let mat4 = LAYOUT_TABLE.forward(LayoutType::Mat4).unwrap();
    assert_eq!(mat4.kind, ComponentKind::Float);
    assert_eq!(mat4.semantics, 4);
    assert_eq!(mat4.size_bytes(), 64);
    assert_eq!(LayoutType::Uint3.size_bytes(), 12);
    assert_eq!(LayoutType::Mat3.semantic_count(), 3);
}
