/// NBR binary resource container
///
/// Little-endian layout. Every file starts with an 8-byte header:
///
/// | field           | type | value                                   |
/// |-----------------|------|-----------------------------------------|
/// | `identifier`    | u16  | `0x4E42`                                |
/// | `major`         | u16  | [`NBR_VERSION_MAJOR`]                   |
/// | `minor`         | u16  | any                                     |
/// | `resource_type` | u16  | Texture=1, Cubemap=2, Shader=3, Model=4, Font=5 |
///
/// followed by the body of that resource type. Model vertices are
/// interleaved position (3), normal (3) and uv (2) floats.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::engine_error;

/// Magic value opening every container ("NB")
pub const NBR_IDENTIFIER: u16 = 0x4E42;

/// Major version written and accepted
pub const NBR_VERSION_MAJOR: u16 = 0;

/// Minor version written
pub const NBR_VERSION_MINOR: u16 = 1;

/// Floats per model vertex
pub const NBR_MODEL_VERTEX_FLOATS: usize = 8;

/// Texture reference meaning "none" in a model material
const NO_TEXTURE: u32 = u32::MAX;

/// Kind tag stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Texture,
    Cubemap,
    Shader,
    Model,
    Font,
}

impl ResourceType {
    pub fn tag(&self) -> u16 {
        match self {
            ResourceType::Texture => 1,
            ResourceType::Cubemap => 2,
            ResourceType::Shader => 3,
            ResourceType::Model => 4,
            ResourceType::Font => 5,
        }
    }

    pub fn from_tag(tag: u16) -> Option<ResourceType> {
        match tag {
            1 => Some(ResourceType::Texture),
            2 => Some(ResourceType::Cubemap),
            3 => Some(ResourceType::Shader),
            4 => Some(ResourceType::Model),
            5 => Some(ResourceType::Font),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Texture => "TEXTURE",
            ResourceType::Cubemap => "CUBEMAP",
            ResourceType::Shader => "SHADER",
            ResourceType::Model => "MODEL",
            ResourceType::Font => "FONT",
        };
        f.write_str(name)
    }
}

// ===== BODIES =====

#[derive(Debug, Clone, PartialEq)]
pub struct NbrTexture {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrCubemap {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub faces: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrShader {
    /// Combined vertex + fragment source
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrMesh {
    /// Interleaved vertices, [`NBR_MODEL_VERTEX_FLOATS`] floats each
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// Index into [`NbrModel::materials`]
    pub material_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrMaterial {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    /// Index into [`NbrModel::textures`]
    pub diffuse_texture: Option<u32>,
    pub specular_texture: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrModel {
    pub meshes: Vec<NbrMesh>,
    pub materials: Vec<NbrMaterial>,
    pub textures: Vec<NbrTexture>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrGlyph {
    pub codepoint: u32,
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the pen position
    pub left: i32,
    /// Vertical offset from the baseline
    pub top: i32,
    /// Pen advance in pixels
    pub advance: u32,
    /// R8 coverage, `width * height` bytes
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbrFont {
    /// Pixel size the glyphs were rasterized at
    pub size: u32,
    pub glyphs: Vec<NbrGlyph>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NbrBody {
    Texture(NbrTexture),
    Cubemap(NbrCubemap),
    Shader(NbrShader),
    Model(NbrModel),
    Font(NbrFont),
}

impl NbrBody {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            NbrBody::Texture(_) => ResourceType::Texture,
            NbrBody::Cubemap(_) => ResourceType::Cubemap,
            NbrBody::Shader(_) => ResourceType::Shader,
            NbrBody::Model(_) => ResourceType::Model,
            NbrBody::Font(_) => ResourceType::Font,
        }
    }
}

// ============================================================================
// NbrFile
// ============================================================================

/// Decoded container
#[derive(Debug, Clone, PartialEq)]
pub struct NbrFile {
    pub major: u16,
    pub minor: u16,
    pub body: NbrBody,
}

impl NbrFile {
    /// Container holding `body` at the current version
    pub fn new(body: NbrBody) -> Self {
        Self { major: NBR_VERSION_MAJOR, minor: NBR_VERSION_MINOR, body }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.body.resource_type()
    }

    /// Read and decode a container file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            engine_error!("ember3d::Nbr", "Failed to read '{}': {}", path.display(), err);
            Error::Io { path: path.display().to_string(), message: err.to_string() }
        })?;
        Self::decode(&bytes).map_err(|err| {
            engine_error!("ember3d::Nbr", "Failed to decode '{}': {}", path.display(), err);
            err
        })
    }

    /// Decode a container from memory
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        // ========== HEADER ==========
        let identifier = reader.u16()?;
        if identifier != NBR_IDENTIFIER {
            return Err(Error::MalformedContainer(format!(
                "Unknown identifier 0x{:04X}", identifier
            )));
        }
        let major = reader.u16()?;
        let minor = reader.u16()?;
        if major != NBR_VERSION_MAJOR {
            return Err(Error::MalformedContainer(format!(
                "Unsupported version {}.{}", major, minor
            )));
        }
        let tag = reader.u16()?;
        let Some(resource_type) = ResourceType::from_tag(tag) else {
            return Err(Error::MalformedContainer(format!("Unknown resource type {}", tag)));
        };

        // ========== BODY ==========
        let body = match resource_type {
            ResourceType::Texture => NbrBody::Texture(read_texture(&mut reader)?),
            ResourceType::Cubemap => NbrBody::Cubemap(read_cubemap(&mut reader)?),
            ResourceType::Shader => NbrBody::Shader(read_shader(&mut reader)?),
            ResourceType::Model => NbrBody::Model(read_model(&mut reader)?),
            ResourceType::Font => NbrBody::Font(read_font(&mut reader)?),
        };
        if !reader.is_at_end() {
            return Err(Error::MalformedContainer(format!(
                "{} trailing bytes after the {} body", reader.remaining(), resource_type
            )));
        }

        Ok(Self { major, minor, body })
    }

    /// Serialize the container
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::default();
        writer.u16(NBR_IDENTIFIER);
        writer.u16(self.major);
        writer.u16(self.minor);
        writer.u16(self.resource_type().tag());

        match &self.body {
            NbrBody::Texture(texture) => write_texture(&mut writer, texture),
            NbrBody::Cubemap(cubemap) => {
                writer.u32(cubemap.width);
                writer.u32(cubemap.height);
                writer.u8(cubemap.channels);
                writer.u8(cubemap.faces.len() as u8);
                for face in &cubemap.faces {
                    writer.bytes(face);
                }
            }
            NbrBody::Shader(shader) => {
                writer.u32(shader.source.len() as u32);
                writer.bytes(shader.source.as_bytes());
            }
            NbrBody::Model(model) => {
                writer.u32(model.meshes.len() as u32);
                for mesh in &model.meshes {
                    writer.u32((mesh.vertices.len() / NBR_MODEL_VERTEX_FLOATS) as u32);
                    mesh.vertices.iter().for_each(|value| writer.f32(*value));
                    writer.u32(mesh.indices.len() as u32);
                    mesh.indices.iter().for_each(|index| writer.u32(*index));
                    writer.u32(mesh.material_index);
                }
                writer.u32(model.materials.len() as u32);
                for material in &model.materials {
                    for color in [material.ambient, material.diffuse, material.specular] {
                        color.iter().for_each(|value| writer.f32(*value));
                    }
                    writer.u32(material.diffuse_texture.unwrap_or(NO_TEXTURE));
                    writer.u32(material.specular_texture.unwrap_or(NO_TEXTURE));
                }
                writer.u32(model.textures.len() as u32);
                for texture in &model.textures {
                    write_texture(&mut writer, texture);
                }
            }
            NbrBody::Font(font) => {
                writer.u32(font.size);
                writer.u32(font.glyphs.len() as u32);
                for glyph in &font.glyphs {
                    writer.u32(glyph.codepoint);
                    writer.u32(glyph.width);
                    writer.u32(glyph.height);
                    writer.i32(glyph.left);
                    writer.i32(glyph.top);
                    writer.u32(glyph.advance);
                    writer.bytes(&glyph.pixels);
                }
            }
        }
        writer.finish()
    }

    // ===== TYPED ACCESS =====

    pub fn into_texture(self) -> Result<NbrTexture> {
        match self.body {
            NbrBody::Texture(texture) => Ok(texture),
            other => Err(mismatch(ResourceType::Texture, other.resource_type())),
        }
    }

    pub fn into_cubemap(self) -> Result<NbrCubemap> {
        match self.body {
            NbrBody::Cubemap(cubemap) => Ok(cubemap),
            other => Err(mismatch(ResourceType::Cubemap, other.resource_type())),
        }
    }

    pub fn into_shader(self) -> Result<NbrShader> {
        match self.body {
            NbrBody::Shader(shader) => Ok(shader),
            other => Err(mismatch(ResourceType::Shader, other.resource_type())),
        }
    }

    pub fn into_model(self) -> Result<NbrModel> {
        match self.body {
            NbrBody::Model(model) => Ok(model),
            other => Err(mismatch(ResourceType::Model, other.resource_type())),
        }
    }

    pub fn into_font(self) -> Result<NbrFont> {
        match self.body {
            NbrBody::Font(font) => Ok(font),
            other => Err(mismatch(ResourceType::Font, other.resource_type())),
        }
    }
}

fn mismatch(expected: ResourceType, found: ResourceType) -> Error {
    engine_error!("ember3d::Nbr", "Expected a {} container, found {}", expected, found);
    Error::ResourceTypeMismatch { expected: expected.to_string(), found: found.to_string() }
}

// ===== BODY READERS =====

fn read_texture(reader: &mut Reader<'_>) -> Result<NbrTexture> {
    let width = reader.u32()?;
    let height = reader.u32()?;
    let channels = reader.u8()?;
    let size = pixel_bytes(width, height, channels)?;
    let pixels = reader.bytes(size)?.to_vec();
    Ok(NbrTexture { width, height, channels, pixels })
}

fn read_cubemap(reader: &mut Reader<'_>) -> Result<NbrCubemap> {
    let width = reader.u32()?;
    let height = reader.u32()?;
    let channels = reader.u8()?;
    let faces_count = reader.u8()?;
    let size = pixel_bytes(width, height, channels)?;
    let faces = (0..faces_count)
        .map(|_| reader.bytes(size).map(<[u8]>::to_vec))
        .collect::<Result<Vec<_>>>()?;
    Ok(NbrCubemap { width, height, channels, faces })
}

fn read_shader(reader: &mut Reader<'_>) -> Result<NbrShader> {
    let length = reader.u32()? as usize;
    let bytes = reader.bytes(length)?;
    let source = String::from_utf8(bytes.to_vec())
        .map_err(|err| Error::MalformedContainer(format!("Shader source is not UTF-8: {}", err)))?;
    Ok(NbrShader { source })
}

fn read_model(reader: &mut Reader<'_>) -> Result<NbrModel> {
    let meshes_count = reader.u32()?;
    let mut meshes = Vec::new();
    for _ in 0..meshes_count {
        let vertices_count = reader.u32()? as usize;
        let vertices = reader.f32s(vertices_count * NBR_MODEL_VERTEX_FLOATS)?;
        let indices_count = reader.u32()? as usize;
        let indices = reader.u32s(indices_count)?;
        let material_index = reader.u32()?;
        meshes.push(NbrMesh { vertices, indices, material_index });
    }

    let materials_count = reader.u32()?;
    let mut materials = Vec::new();
    for _ in 0..materials_count {
        let ambient = reader.vec3()?;
        let diffuse = reader.vec3()?;
        let specular = reader.vec3()?;
        let diffuse_texture = Some(reader.u32()?).filter(|index| *index != NO_TEXTURE);
        let specular_texture = Some(reader.u32()?).filter(|index| *index != NO_TEXTURE);
        materials.push(NbrMaterial { ambient, diffuse, specular, diffuse_texture, specular_texture });
    }

    let textures_count = reader.u32()?;
    let textures = (0..textures_count)
        .map(|_| read_texture(reader))
        .collect::<Result<Vec<_>>>()?;

    Ok(NbrModel { meshes, materials, textures })
}

fn read_font(reader: &mut Reader<'_>) -> Result<NbrFont> {
    let size = reader.u32()?;
    let glyphs_count = reader.u32()?;
    let mut glyphs = Vec::new();
    for _ in 0..glyphs_count {
        let codepoint = reader.u32()?;
        let width = reader.u32()?;
        let height = reader.u32()?;
        let left = reader.i32()?;
        let top = reader.i32()?;
        let advance = reader.u32()?;
        let pixels = reader.bytes(pixel_bytes(width, height, 1)?)?.to_vec();
        glyphs.push(NbrGlyph { codepoint, width, height, left, top, advance, pixels });
    }
    Ok(NbrFont { size, glyphs })
}

fn write_texture(writer: &mut Writer, texture: &NbrTexture) {
    writer.u32(texture.width);
    writer.u32(texture.height);
    writer.u8(texture.channels);
    writer.bytes(&texture.pixels);
}

fn pixel_bytes(width: u32, height: u32, channels: u8) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels as usize))
        .ok_or_else(|| Error::MalformedContainer(format!(
            "Image size {}x{}x{} overflows", width, height, channels
        )))
}

// ===== BYTE CURSORS =====

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::MalformedContainer(format!(
                "Truncated: needed {} bytes at offset {}, {} left", count, self.position, self.remaining()
            )));
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.bytes(N)?);
        Ok(array)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    fn f32s(&mut self, count: usize) -> Result<Vec<f32>> {
        self.check_count(count, 4)?;
        (0..count).map(|_| self.f32()).collect()
    }

    fn u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        self.check_count(count, 4)?;
        (0..count).map(|_| self.u32()).collect()
    }

    /// Reject counts that cannot fit before allocating for them
    fn check_count(&self, count: usize, element_size: usize) -> Result<()> {
        match count.checked_mul(element_size) {
            Some(size) if size <= self.remaining() => Ok(()),
            _ => Err(Error::MalformedContainer(format!(
                "Truncated: {} elements of {} bytes at offset {}", count, element_size, self.position
            ))),
        }
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
#[path = "nbr_tests.rs"]
mod tests;
