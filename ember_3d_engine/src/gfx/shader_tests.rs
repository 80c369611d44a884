//! Unit tests for shader source splitting, program creation and uniforms

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::gfx::{
    split_source, Backend, Buffer, BufferDesc, BufferType, BufferUsage, GpuObject, Shader, ShaderStage,
    ShaderStatus, UniformValue, uniform_binding, UNIFORM_BUFFERS_MAX,
};
use crate::test_support::{Fixture, TRIANGLE_SHADER};

// ============================================================================
// Source split
// ============================================================================

#[test]
fn test_split_spans_cover_input() {
    let split = split_source(TRIANGLE_SHADER).unwrap();

    assert_eq!(split.vertex.start, 0);
    assert_eq!(split.vertex.end, split.separator.start);
    assert_eq!(split.separator.end, split.fragment.start);
    assert_eq!(split.fragment.end, TRIANGLE_SHADER.len());
    assert!(!split.vertex.is_empty());
    assert!(!split.fragment.is_empty());
    assert_eq!(&TRIANGLE_SHADER[split.separator.clone()], "\n");
    assert!(split.fragment_source(TRIANGLE_SHADER).starts_with("#version"));
    assert!(split.vertex_source(TRIANGLE_SHADER).contains("a_position"));
}

#[test]
fn test_split_without_newline_separator() {
    let source = "#version 1 void main(){}#version 1 void main(){}";
    let split = split_source(source).unwrap();
    assert!(split.separator.is_empty());
    assert_eq!(split.fragment_source(source), "#version 1 void main(){}");
}

#[test]
fn test_split_single_stage() {
    assert!(split_source("#version 420\nvoid main() {}").is_none());
    assert!(split_source("").is_none());
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_links_program_and_drops_stages() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);

    assert!(shader.is_ready());
    assert!(!shader.program().is_none());
    let backend = fixture.backend();
    assert!(backend.program(shader.program()).unwrap().linked);
    assert_eq!(backend.stage_count(), 0);
}

#[test]
fn test_create_missing_stage() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, "#version 420\nvoid main() {}");
    assert_eq!(*shader.status(), ShaderStatus::MissingStage);
    assert!(shader.program().is_none());
}

#[test]
fn test_create_compile_failure_is_reported() {
    let fixture = Fixture::new();
    let source = "#version 420\nvoid main() {}\n#version 420\nint broken;";
    let shader = Shader::create(&fixture.context, source);

    assert!(matches!(
        shader.status(),
        ShaderStatus::CompileFailed { stage: ShaderStage::Fragment, .. }
    ));
    assert!(!shader.is_ready());
    assert_eq!(fixture.backend().stage_count(), 0);
}

#[test]
fn test_create_strict_fails_and_cleans_up() {
    let fixture = Fixture::new();
    let source = "#version 420\nint broken;\n#version 420\nvoid main() {}";
    assert!(Shader::create_strict(&fixture.context, source).is_err());

    assert_eq!(fixture.backend().stats().live_programs, 0);
}

// ============================================================================
// Uniform buffers
// ============================================================================

fn uniform_buffer(fixture: &Fixture) -> Arc<Buffer> {
    let desc = BufferDesc::new(BufferType::Uniform, BufferUsage::DynamicDraw, 64);
    Arc::new(Buffer::create(&fixture.context, &desc).unwrap())
}

#[test]
fn test_attach_uniform_assigns_slots() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    let first = uniform_buffer(&fixture);
    let second = uniform_buffer(&fixture);

    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &first), Some(0));
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &second), Some(1));
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Fragment, &first), Some(0));
    assert_eq!(shader.uniform_buffer_count(ShaderStage::Vertex), 2);
    assert_eq!(shader.uniform_buffer_count(ShaderStage::Fragment), 1);
}

#[test]
fn test_attach_uniform_twice_is_noop() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    let buffer = uniform_buffer(&fixture);

    shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &buffer);
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &buffer), Some(0));
    assert_eq!(shader.uniform_buffer_count(ShaderStage::Vertex), 1);
}

#[test]
fn test_attach_uniform_past_limit_is_ignored() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    for _ in 0..UNIFORM_BUFFERS_MAX {
        let buffer = uniform_buffer(&fixture);
        assert!(shader.attach_uniform(&fixture.context, ShaderStage::Fragment, &buffer).is_some());
    }

    let extra = uniform_buffer(&fixture);
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Fragment, &extra), None);
    assert_eq!(shader.uniform_buffer_count(ShaderStage::Fragment), UNIFORM_BUFFERS_MAX);
}

#[test]
fn test_attach_uniform_at_replaces_slot() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    let first = uniform_buffer(&fixture);
    let second = uniform_buffer(&fixture);

    assert_eq!(shader.attach_uniform_at(&fixture.context, ShaderStage::Vertex, 3, &first), Some(3));
    assert_eq!(shader.attach_uniform_at(&fixture.context, ShaderStage::Vertex, 3, &second), Some(3));

    assert_eq!(shader.uniform_buffer_count(ShaderStage::Vertex), 1);
    assert!(Arc::ptr_eq(&shader.uniform_buffer(ShaderStage::Vertex, 3).unwrap(), &second));
    assert_eq!(fixture.backend().uniform_slot(3), Some(second.handle()));
    assert_eq!(
        shader.attach_uniform_at(&fixture.context, ShaderStage::Vertex, UNIFORM_BUFFERS_MAX as u32, &first),
        None
    );
}

#[test]
fn test_attach_uniform_fills_gaps() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    let fixed = uniform_buffer(&fixture);
    let next = uniform_buffer(&fixture);

    shader.attach_uniform_at(&fixture.context, ShaderStage::Vertex, 1, &fixed);
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &next), Some(0));
    assert_eq!(shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &fixed), Some(1));
}

#[test]
fn test_stages_use_separate_bindings() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    let vertex = uniform_buffer(&fixture);
    let fragment = uniform_buffer(&fixture);

    shader.attach_uniform(&fixture.context, ShaderStage::Vertex, &vertex);
    shader.attach_uniform(&fixture.context, ShaderStage::Fragment, &fragment);
    {
        let mut device = fixture.context.device();
        shader.push_uniform_buffers(&mut *device);
    }

    let backend = fixture.backend();
    assert_eq!(uniform_binding(ShaderStage::Vertex, 0), 0);
    assert_eq!(uniform_binding(ShaderStage::Fragment, 0), UNIFORM_BUFFERS_MAX as u32);
    assert_eq!(backend.uniform_slot(0), Some(vertex.handle()));
    assert_eq!(backend.uniform_slot(UNIFORM_BUFFERS_MAX as u32), Some(fragment.handle()));
}

// ============================================================================
// Plain uniforms
// ============================================================================

#[test]
fn test_set_uniform_uploads_value() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);

    shader.set_uniform(&fixture.context, "u_model", Mat4::IDENTITY);
    shader.set_uniform(&fixture.context, "u_diffuse_color", Vec3::new(1.0, 0.5, 0.25));

    let backend = fixture.backend();
    assert_eq!(backend.uniform_value(shader.program(), "u_model"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
    assert_eq!(
        backend.uniform_value(shader.program(), "u_diffuse_color"),
        Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)))
    );
}

#[test]
fn test_unknown_uniform_is_noop() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);

    assert_eq!(shader.uniform_location(&fixture.context, "u_missing"), None);
    shader.set_uniform(&fixture.context, "u_missing", 1.0f32);
    assert!(fixture.backend().program(shader.program()).unwrap().values.is_empty());
}

#[test]
fn test_destroy_deletes_program_once() {
    let fixture = Fixture::new();
    let shader = Shader::create(&fixture.context, TRIANGLE_SHADER);
    shader.destroy(&fixture.context);
    shader.destroy(&fixture.context);
    assert!(shader.is_destroyed());
    assert!(fixture.backend().program(shader.program()).is_none());
}
