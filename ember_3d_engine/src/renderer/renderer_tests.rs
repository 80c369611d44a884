//! Unit tests for Renderer

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};

use crate::gfx::{CubemapDesc, GpuObject, TextureFilter, TextureFormat, TextureWrap, UniformValue};
use crate::renderer::render_command::DrawKey;
use crate::renderer::{RenderCommand, Renderable, Renderer, RENDERER_STORAGE_NAME};
use crate::resource::nbr::{NbrBody, NbrMaterial, NbrMesh, NbrModel};
use crate::resource::{
    MaterialDesc, MaterialId, MeshId, MeshType, SharedStorage, StorageManager, StorageManagerConfig,
    MATERIAL_MATRICES_BUFFER_INDEX, MATERIAL_UNIFORM_DIFFUSE_COLOR, MATERIAL_UNIFORM_MODEL_MATRIX,
};
use crate::test_support::{scratch_dir, write_nbr, Fixture, TRIANGLE_SHADER};
use crate::utils::lock;

struct Scene {
    fixture: Fixture,
    manager: StorageManager,
    renderer: Renderer,
    storage: SharedStorage,
    material: MaterialId,
    cube: MeshId,
}

fn scene() -> Scene {
    let fixture = Fixture::new();
    let mut manager =
        StorageManager::init(Arc::clone(&fixture.context), StorageManagerConfig::default()).unwrap();
    let renderer = Renderer::new(Arc::clone(&fixture.context), &mut manager).unwrap();
    let storage = manager.create_storage("scene", "res/");
    let (material, cube) = {
        let mut guard = lock(&storage);
        let shader = guard.push_shader(TRIANGLE_SHADER).unwrap();
        let material = guard.push_material(&MaterialDesc::new(shader)).unwrap();
        let cube = guard.push_mesh_type(MeshType::Cube).unwrap();
        (material, cube)
    };
    fixture.backend().clear_draws();
    Scene { fixture, manager, renderer, storage, material, cube }
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn test_new_creates_renderer_storage() {
    let scene = scene();

    let storage = scene.manager.storage(RENDERER_STORAGE_NAME).unwrap();
    assert!(Arc::ptr_eq(&storage, scene.renderer.storage()));
    assert_eq!(lock(&storage).buffer_count(), 1);
    assert_eq!(scene.renderer.matrices_buffer().size(), 64);
}

#[test]
fn test_begin_pass_clears_and_uploads() {
    let mut scene = scene();
    let view_projection = Mat4::perspective_rh(1.0, 4.0 / 3.0, 0.1, 100.0);
    scene.renderer.set_clear_color(Vec4::new(0.1, 0.2, 0.3, 1.0));

    scene.renderer.begin_pass(view_projection);

    let (_, color) = scene.fixture.backend().last_clear().unwrap();
    assert_eq!(color, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(
        scene.renderer.matrices_buffer().contents(),
        bytemuck::bytes_of(&view_projection).to_vec()
    );
}

// ============================================================================
// Passes
// ============================================================================

#[test]
fn test_mesh_command_draws() {
    let mut scene = scene();
    let transform = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));

    scene.renderer.begin_pass(Mat4::IDENTITY);
    scene.renderer.queue(
        RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage)
            .with_transform(transform),
    );
    let stats = scene.renderer.end_pass().unwrap();

    assert_eq!(stats.commands, 1);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(scene.renderer.queued(), 0);
    assert_eq!(scene.renderer.last_stats(), stats);

    let storage = lock(&scene.storage);
    let material = storage.get_material(scene.material).unwrap();
    assert!(Arc::ptr_eq(
        material.uniform_buffer(MATERIAL_MATRICES_BUFFER_INDEX).unwrap(),
        scene.renderer.matrices_buffer()
    ));
    assert_eq!(material.model_matrix, transform);

    let backend = scene.fixture.backend();
    let draws = backend.draws();
    assert_eq!(draws.len(), 1);
    assert!(draws[0].indexed);
    assert_eq!(draws[0].count, 36);
    assert_eq!(
        backend.uniform_value(material.shader().program(), MATERIAL_UNIFORM_MODEL_MATRIX),
        Some(UniformValue::Mat4(transform))
    );
}

#[test]
fn test_missing_resources_are_skipped() {
    let mut scene = scene();

    scene.renderer.begin_pass(Mat4::IDENTITY);
    scene.renderer.queue(RenderCommand::new(Renderable::Mesh(MeshId::default()), scene.material, &scene.storage));
    scene.renderer.queue(RenderCommand::new(Renderable::Mesh(scene.cube), MaterialId::default(), &scene.storage));
    scene.renderer.queue(RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage));
    let stats = scene.renderer.end_pass().unwrap();

    assert_eq!(stats.commands, 3);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.draw_calls, 1);
}

#[test]
fn test_pass_order_meshes_models_skybox() {
    let mut scene = scene();
    let dir = scratch_dir("renderer_order");
    let quad: Vec<f32> = vec![0.0; 4 * 8];
    write_nbr(&dir, "model.nbr", NbrBody::Model(NbrModel {
        meshes: vec![
            NbrMesh { vertices: quad.clone(), indices: vec![0, 1, 2], material_index: 0 },
            NbrMesh { vertices: quad, indices: vec![0, 2, 3], material_index: 0 },
        ],
        materials: vec![NbrMaterial {
            ambient: [0.0; 3],
            diffuse: [0.0, 1.0, 0.0],
            specular: [0.0; 3],
            diffuse_texture: None,
            specular_texture: None,
        }],
        textures: Vec::new(),
    }));
    let (skybox, skybox_array, model, cube_array) = {
        let mut guard = lock(&scene.storage);
        let cubemap = guard
            .push_cubemap(&CubemapDesc {
                width: 1,
                height: 1,
                format: TextureFormat::Rgba8,
                filter: TextureFilter::MinMagLinear,
                wrap: TextureWrap::ClampToEdge,
                faces: vec![vec![0; 4]; 6],
            })
            .unwrap();
        let skybox = guard.push_skybox(cubemap).unwrap();
        let model = guard.push_model(dir.join("model.nbr")).unwrap();
        let skybox_array = guard.get_skybox(skybox).unwrap().pipeline().handle();
        let cube_array = guard.get_mesh(scene.cube).unwrap().pipeline().handle();
        (skybox, skybox_array, model, cube_array)
    };

    scene.renderer.begin_pass(Mat4::IDENTITY);
    scene.renderer.queue(RenderCommand::new(Renderable::Skybox(skybox), scene.material, &scene.storage));
    scene.renderer.queue(RenderCommand::new(Renderable::Model(model), scene.material, &scene.storage));
    scene.renderer.queue(RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage));
    let stats = scene.renderer.end_pass().unwrap();

    assert_eq!(stats.draw_calls, 4);
    let backend = scene.fixture.backend();
    let draws = backend.draws();
    assert_eq!(draws[0].vertex_array, cube_array);
    assert_eq!((draws[1].count, draws[2].count), (3, 3));
    assert_eq!(draws[3].vertex_array, skybox_array);
    assert!(!draws[3].indexed);
    assert_eq!(draws[3].count, 36);
    assert_eq!(draws[3].textures.len(), 1);

    // The skybox is drawn last, with the material colors restored
    let storage = lock(&scene.storage);
    let program = storage.get_material(scene.material).unwrap().shader().program();
    assert_eq!(
        backend.uniform_value(program, MATERIAL_UNIFORM_DIFFUSE_COLOR),
        Some(UniformValue::Vec3(Vec3::ONE))
    );
}

#[test]
fn test_end_pass_without_begin_still_draws() {
    let mut scene = scene();
    scene.renderer.queue(RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage));

    let stats = scene.renderer.end_pass().unwrap();

    assert_eq!(stats.draw_calls, 1);
}

#[test]
fn test_present_counts_frames() {
    let scene = scene();
    scene.renderer.present();
    scene.renderer.present();
    assert_eq!(scene.fixture.backend().frames_presented(), 2);
}

// ============================================================================
// Sort keys
// ============================================================================

#[test]
fn test_draw_key_orders_by_pass_then_material() {
    let scene = scene();
    let skybox = RenderCommand::new(Renderable::Skybox(Default::default()), scene.material, &scene.storage);
    let mesh = RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage);
    let model = RenderCommand::new(Renderable::Model(Default::default()), scene.material, &scene.storage);

    let skybox_key = DrawKey::new(&skybox, 0);
    let mesh_key = DrawKey::new(&mesh, 1);
    let model_key = DrawKey::new(&model, 2);
    let later_mesh_key = DrawKey::new(&mesh, 3);

    assert!(mesh_key.key < model_key.key);
    assert!(model_key.key < skybox_key.key);
    assert!(mesh_key.key < later_mesh_key.key);
}
