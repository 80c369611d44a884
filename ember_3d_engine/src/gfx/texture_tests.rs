//! Unit tests for Texture and Cubemap

use crate::gfx::backend::TextureKind;
use crate::gfx::{
    Cubemap, CubemapDesc, GpuObject, Texture, TextureDesc, TextureFilter, TextureFormat,
    TextureWrap,
};
use crate::test_support::Fixture;

fn rgba_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc {
        data: Some(vec![0x80; (width * height * 4) as usize]),
        ..TextureDesc::new(width, height)
    }
}

fn cubemap_desc(size: u32, faces: usize) -> CubemapDesc {
    CubemapDesc {
        width: size,
        height: size,
        format: TextureFormat::R8,
        filter: TextureFilter::MinTrilinearMagLinear,
        wrap: TextureWrap::ClampToEdge,
        faces: vec![vec![0xFF; (size * size) as usize]; faces],
    }
}

// ============================================================================
// Texture
// ============================================================================

#[test]
fn test_texture_create_reports_info() {
    let fixture = Fixture::new();
    let texture = Texture::create(&fixture.context, &rgba_desc(16, 8)).unwrap();

    let info = texture.info();
    assert_eq!((info.width, info.height, info.depth), (16, 8, 1));
    assert_eq!(info.format, TextureFormat::Rgba8);
    assert_eq!(info.mip_levels, 5);

    let backend = fixture.backend();
    let record = backend.texture(texture.handle()).unwrap();
    assert_eq!(record.kind, TextureKind::Texture2D);
    assert_eq!(record.layers.len(), 1);
    assert_eq!(record.mip_levels, 5);
}

#[test]
fn test_texture_without_data() {
    let fixture = Fixture::new();
    let texture = Texture::create(&fixture.context, &TextureDesc::new(4, 4)).unwrap();
    assert_eq!(texture.width(), 4);
    assert!(fixture.backend().texture(texture.handle()).unwrap().layers.is_empty());
}

#[test]
fn test_texture_layers_split_by_depth() {
    let fixture = Fixture::new();
    let desc = TextureDesc {
        depth: 3,
        format: TextureFormat::Rg16,
        data: Some(vec![1; 2 * 2 * 4 * 3]),
        ..TextureDesc::new(2, 2)
    };
    let texture = Texture::create(&fixture.context, &desc).unwrap();
    assert_eq!(texture.depth(), 3);
    assert_eq!(fixture.backend().texture(texture.handle()).unwrap().layers.len(), 3);
}

#[test]
fn test_texture_depth_zero_kept_as_given() {
    let fixture = Fixture::new();
    let desc = TextureDesc { depth: 0, data: Some(vec![7; 2 * 2 * 4]), ..TextureDesc::new(2, 2) };
    let texture = Texture::create(&fixture.context, &desc).unwrap();

    assert_eq!(texture.depth(), 0);
    assert_eq!(fixture.backend().texture(texture.handle()).unwrap().layers.len(), 1);
}

#[test]
fn test_texture_rejects_bad_sizes() {
    let fixture = Fixture::new();
    assert!(Texture::create(&fixture.context, &TextureDesc::new(0, 4)).is_err());

    let mut desc = rgba_desc(4, 4);
    desc.data = Some(vec![0; 3]);
    assert!(Texture::create(&fixture.context, &desc).is_err());
}

#[test]
fn test_texture_update_regenerates_mipmaps() {
    let fixture = Fixture::new();
    let texture = Texture::create(&fixture.context, &rgba_desc(4, 4)).unwrap();
    assert_eq!(texture.info().mip_levels, 3);

    let mut desc = rgba_desc(64, 32);
    desc.wrap = TextureWrap::MirroredRepeat;
    texture.update(&fixture.context, &desc).unwrap();

    assert_eq!(texture.width(), 64);
    assert_eq!(texture.wrap(), TextureWrap::MirroredRepeat);
    assert_eq!(texture.info().mip_levels, 7);
}

#[test]
fn test_texture_destroy() {
    let fixture = Fixture::new();
    let texture = Texture::create(&fixture.context, &rgba_desc(2, 2)).unwrap();
    texture.destroy(&fixture.context);
    texture.destroy(&fixture.context);
    assert!(texture.is_destroyed());
    assert!(fixture.backend().texture(texture.handle()).is_none());
}

// ============================================================================
// Cubemap
// ============================================================================

#[test]
fn test_cubemap_create() {
    let fixture = Fixture::new();
    let cubemap = Cubemap::create(&fixture.context, &cubemap_desc(8, 6)).unwrap();

    assert_eq!(cubemap.faces_count(), 6);
    assert_eq!(cubemap.format(), TextureFormat::R8);
    let backend = fixture.backend();
    let record = backend.texture(cubemap.handle()).unwrap();
    assert_eq!(record.kind, TextureKind::Cubemap);
    assert_eq!(record.layers.len(), 6);
}

#[test]
fn test_cubemap_face_count_bounds() {
    let fixture = Fixture::new();
    assert!(Cubemap::create(&fixture.context, &cubemap_desc(4, 0)).is_err());
    assert!(Cubemap::create(&fixture.context, &cubemap_desc(4, 7)).is_err());
    assert!(Cubemap::create(&fixture.context, &cubemap_desc(4, 1)).is_ok());
}

#[test]
fn test_cubemap_rejects_uneven_faces() {
    let fixture = Fixture::new();
    let mut desc = cubemap_desc(4, 6);
    desc.faces[2].pop();
    assert!(Cubemap::create(&fixture.context, &desc).is_err());
}

#[test]
fn test_cubemap_update_and_destroy() {
    let fixture = Fixture::new();
    let cubemap = Cubemap::create(&fixture.context, &cubemap_desc(4, 6)).unwrap();
    cubemap.update(&fixture.context, &cubemap_desc(16, 2)).unwrap();
    assert_eq!(cubemap.width(), 16);
    assert_eq!(cubemap.faces_count(), 2);

    cubemap.destroy(&fixture.context);
    assert!(fixture.backend().texture(cubemap.handle()).is_none());
}
