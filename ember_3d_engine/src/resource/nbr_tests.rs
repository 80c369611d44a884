//! Unit tests for the NBR container codec

use crate::error::Error;
use crate::resource::nbr::{
    NbrBody, NbrCubemap, NbrFile, NbrFont, NbrGlyph, NbrMaterial, NbrMesh, NbrModel, NbrShader,
    NbrTexture, ResourceType, NBR_IDENTIFIER,
};

fn texture(width: u32, height: u32, channels: u8) -> NbrTexture {
    NbrTexture {
        width,
        height,
        channels,
        pixels: (0..width * height * channels as u32).map(|i| i as u8).collect(),
    }
}

fn model() -> NbrModel {
    NbrModel {
        meshes: vec![NbrMesh {
            vertices: (0..24).map(|i| i as f32 * 0.5).collect(),
            indices: vec![0, 1, 2],
            material_index: 0,
        }],
        materials: vec![NbrMaterial {
            ambient: [0.1, 0.1, 0.1],
            diffuse: [1.0, 0.0, 0.0],
            specular: [0.5, 0.5, 0.5],
            diffuse_texture: Some(0),
            specular_texture: None,
        }],
        textures: vec![texture(2, 2, 4)],
    }
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_header_layout() {
    let bytes = NbrFile::new(NbrBody::Texture(texture(1, 1, 1))).encode();
    assert_eq!(&bytes[0..2], &NBR_IDENTIFIER.to_le_bytes());
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), ResourceType::Texture.tag());
    assert_eq!(bytes.len(), 8 + 4 + 4 + 1 + 1);
}

#[test]
fn test_unknown_identifier() {
    let mut bytes = NbrFile::new(NbrBody::Texture(texture(1, 1, 1))).encode();
    bytes[0] = 0;
    assert!(matches!(NbrFile::decode(&bytes), Err(Error::MalformedContainer(_))));
}

#[test]
fn test_unsupported_major_version() {
    let mut file = NbrFile::new(NbrBody::Shader(NbrShader { source: String::new() }));
    file.major = 9;
    assert!(matches!(NbrFile::decode(&file.encode()), Err(Error::MalformedContainer(_))));
}

#[test]
fn test_unknown_resource_type() {
    let mut bytes = NbrFile::new(NbrBody::Texture(texture(1, 1, 1))).encode();
    bytes[6] = 42;
    assert!(matches!(NbrFile::decode(&bytes), Err(Error::MalformedContainer(_))));
}

// ============================================================================
// Bodies
// ============================================================================

#[test]
fn test_decode_each_body_kind() {
    let bodies = vec![
        NbrBody::Texture(texture(3, 2, 2)),
        NbrBody::Cubemap(NbrCubemap {
            width: 2,
            height: 2,
            channels: 4,
            faces: vec![vec![7; 16]; 6],
        }),
        NbrBody::Shader(NbrShader { source: "#version 420\n#version 420\n".to_string() }),
        NbrBody::Model(model()),
        NbrBody::Font(NbrFont {
            size: 24,
            glyphs: vec![
                NbrGlyph { codepoint: 'A' as u32, width: 2, height: 3, left: 1, top: 3, advance: 4, pixels: vec![255; 6] },
                NbrGlyph { codepoint: ' ' as u32, width: 0, height: 0, left: 0, top: 0, advance: 3, pixels: Vec::new() },
            ],
        }),
    ];

    for body in bodies {
        let file = NbrFile::new(body);
        let decoded = NbrFile::decode(&file.encode()).unwrap();
        assert_eq!(decoded, file);
    }
}

#[test]
fn test_truncated_body() {
    let bytes = NbrFile::new(NbrBody::Model(model())).encode();
    let result = NbrFile::decode(&bytes[..bytes.len() - 3]);
    assert!(matches!(result, Err(Error::MalformedContainer(_))));
}

#[test]
fn test_trailing_bytes_are_rejected() {
    let mut bytes = NbrFile::new(NbrBody::Texture(texture(1, 1, 4))).encode();
    bytes.push(0);
    assert!(matches!(NbrFile::decode(&bytes), Err(Error::MalformedContainer(_))));
}

#[test]
fn test_huge_counts_do_not_allocate() {
    let mut bytes = NbrFile::new(NbrBody::Model(NbrModel {
        meshes: Vec::new(),
        materials: Vec::new(),
        textures: Vec::new(),
    }))
    .encode();
    bytes.truncate(8);
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(NbrFile::decode(&bytes), Err(Error::MalformedContainer(_))));
}

#[test]
fn test_missing_material_texture_uses_sentinel() {
    let file = NbrFile::new(NbrBody::Model(model()));
    let decoded = NbrFile::decode(&file.encode()).unwrap().into_model().unwrap();
    assert_eq!(decoded.materials[0].diffuse_texture, Some(0));
    assert_eq!(decoded.materials[0].specular_texture, None);
}

// ============================================================================
// Typed access
// ============================================================================

#[test]
fn test_type_mismatch() {
    let file = NbrFile::new(NbrBody::Texture(texture(1, 1, 1)));
    let err = file.into_cubemap().unwrap_err();
    assert_eq!(
        err,
        Error::ResourceTypeMismatch { expected: "CUBEMAP".to_string(), found: "TEXTURE".to_string() }
    );
}

#[test]
fn test_load_missing_file() {
    let result = NbrFile::load(std::path::Path::new("does/not/exist.nbr"));
    assert!(matches!(result, Err(Error::Io { .. })));
}
