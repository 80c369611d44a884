//! Unit tests for HeadlessBackend

use crate::gfx::backend::{PixelLayout, TextureKind, TextureUpload};
use crate::gfx::{
    Backend, BufferDesc, BufferType, BufferUsage, DrawMode, GpuHandle, HeadlessBackend,
    ShaderStage, TextureFilter, TextureWrap,
};

const VERTEX: &str = "#version 420\nuniform mat4 u_model;\nuniform Matrices { mat4 vp; };\nvoid main() {}";
const FRAGMENT: &str = "#version 420\nuniform sampler2D u_textures[4];\nuniform mat4 u_model;\nvoid main() {}";

fn upload(width: u32, height: u32, layers: Vec<&[u8]>) -> TextureUpload<'_> {
    TextureUpload {
        kind: TextureKind::Texture2D,
        width,
        height,
        depth: 1,
        layout: PixelLayout { channels: 1, bits_per_channel: 8 },
        filter: TextureFilter::MinMagLinear.sampler().unwrap(),
        wrap: TextureWrap::Repeat,
        layers,
    }
}

#[test]
fn test_handles_start_at_one() {
    let mut backend = HeadlessBackend::new();
    let desc = BufferDesc::new(BufferType::Vertex, BufferUsage::StaticDraw, 4);
    assert_eq!(backend.create_buffer(&desc).unwrap(), GpuHandle(1));
    assert_eq!(backend.create_buffer(&desc).unwrap(), GpuHandle(2));
    assert_eq!(backend.stats().live_buffers, 2);
}

#[test]
fn test_compile_and_link_collects_uniforms() {
    let mut backend = HeadlessBackend::new();
    let vertex = backend.compile_stage(ShaderStage::Vertex, VERTEX);
    let fragment = backend.compile_stage(ShaderStage::Fragment, FRAGMENT);
    assert!(vertex.error.is_none());
    assert!(fragment.error.is_none());

    let program = backend.link_program(vertex.handle, fragment.handle);
    assert!(program.error.is_none());
    let record = backend.program(program.handle).unwrap();
    assert_eq!(record.uniforms, vec!["u_model".to_string(), "u_textures".to_string()]);
    assert_eq!(backend.uniform_location(program.handle, "u_textures"), Some(1));
    assert_eq!(backend.uniform_location(program.handle, "vp"), None);
}

#[test]
fn test_compile_errors() {
    let mut backend = HeadlessBackend::new();
    assert!(backend.compile_stage(ShaderStage::Vertex, "void main() {}").error.is_some());
    assert!(backend.compile_stage(ShaderStage::Vertex, "#version 420\n").error.is_some());
}

#[test]
fn test_link_rejects_swapped_stages() {
    let mut backend = HeadlessBackend::new();
    let vertex = backend.compile_stage(ShaderStage::Vertex, VERTEX);
    let fragment = backend.compile_stage(ShaderStage::Fragment, FRAGMENT);
    let program = backend.link_program(fragment.handle, vertex.handle);
    assert!(program.error.is_some());
    assert!(!backend.program(program.handle).unwrap().linked);
}

#[test]
fn test_texture_layer_size_is_checked() {
    let mut backend = HeadlessBackend::new();
    let pixels = [0u8; 4];
    assert!(backend.create_texture(&upload(2, 2, vec![&pixels[..]])).is_ok());
    assert!(backend.create_texture(&upload(4, 4, vec![&pixels[..]])).is_err());
}

#[test]
fn test_mipmap_levels() {
    let mut backend = HeadlessBackend::new();
    let texture = backend.create_texture(&upload(1, 1, Vec::new())).unwrap();
    assert_eq!(backend.generate_mipmaps(texture), 1);
    assert_eq!(backend.generate_mipmaps(GpuHandle(999)), 0);
}

#[test]
fn test_draw_rejected_without_bindings() {
    let mut backend = HeadlessBackend::new();
    backend.draw_arrays(DrawMode::Triangle, 0, 3);
    assert_eq!(backend.rejected_draws(), 1);

    let vertex = backend.compile_stage(ShaderStage::Vertex, VERTEX);
    let fragment = backend.compile_stage(ShaderStage::Fragment, FRAGMENT);
    let program = backend.link_program(vertex.handle, fragment.handle);
    let vertex_array = backend.create_vertex_array().unwrap();
    backend.use_program(program.handle);
    backend.bind_vertex_array(vertex_array);

    backend.draw_elements(DrawMode::Triangle, 6);
    assert_eq!(backend.rejected_draws(), 2);

    backend.draw_arrays(DrawMode::Point, 0, 4);
    assert_eq!(backend.draws().len(), 1);
    assert_eq!(backend.stats().draw_calls, 1);
    assert_eq!(backend.stats().vertices, 4);

    backend.clear_draws();
    assert!(backend.draws().is_empty());
    assert_eq!(backend.rejected_draws(), 0);
}

#[test]
fn test_destroy_unbinds() {
    let mut backend = HeadlessBackend::new();
    let desc = BufferDesc::new(BufferType::Uniform, BufferUsage::DynamicDraw, 16);
    let buffer = backend.create_buffer(&desc).unwrap();
    backend.bind_uniform_buffer(0, buffer);
    backend.destroy_buffer(buffer);
    assert_eq!(backend.uniform_slot(0), None);

    let vertex_array = backend.create_vertex_array().unwrap();
    backend.bind_vertex_array(vertex_array);
    backend.destroy_vertex_array(vertex_array);
    assert!(backend.bound_vertex_array().is_none());
}

#[test]
fn test_update_buffer_overflow_ignored() {
    let mut backend = HeadlessBackend::new();
    let desc = BufferDesc::new(BufferType::Vertex, BufferUsage::DynamicDraw, 4);
    let buffer = backend.create_buffer(&desc).unwrap();

    backend.update_buffer(buffer, usize::MAX - 1, &[1, 2, 3]);
    assert_eq!(backend.buffer(buffer).unwrap().data, vec![0; 4]);
}
