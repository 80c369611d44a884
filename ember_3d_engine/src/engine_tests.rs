//! Unit tests for Engine
//!
//! The logger is process-wide: tests that install one are marked
//! `#[serial]` and only inspect entries from their own log source.

use std::sync::{Arc, Mutex};

use glam::Mat4;
use serial_test::serial;

use crate::ember3d::log::{LogSeverity, MemoryLogger};
use crate::ember3d::{Engine, EngineDesc, Error};
use crate::event::{Event, EventType};
use crate::gfx::{Backend, HeadlessBackend, HeadlessConfig};
use crate::renderer::{RenderCommand, Renderable, RENDERER_STORAGE_NAME};
use crate::resource::{MaterialDesc, MeshType};
use crate::test_support::TRIANGLE_SHADER;
use crate::utils::lock;
use crate::window::HeadlessWindow;

fn engine() -> (Engine, Arc<Mutex<HeadlessBackend>>, Arc<HeadlessWindow>) {
    let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
    let window = Arc::new(HeadlessWindow::new(640, 480));
    let engine = Engine::new(backend.clone(), window.clone(), EngineDesc::default()).unwrap();
    (engine, backend, window)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_new_wires_subsystems() {
    let (engine, _, _) = engine();

    assert!(engine.context().is_alive());
    assert_eq!(engine.context().viewport(), (640, 480));
    assert_eq!(lock(engine.storages().cache()).name(), "cache");
    assert!(engine.storages().storage(RENDERER_STORAGE_NAME).is_some());
    assert_eq!(engine.events().listener_count(EventType::FramebufferResized), 1);
}

#[test]
fn test_new_rejects_old_backend() {
    let backend = Arc::new(Mutex::new(HeadlessBackend::with_config(HeadlessConfig {
        version: (3, 3),
        ..HeadlessConfig::default()
    })));
    let window = Arc::new(HeadlessWindow::new(640, 480));

    let result = Engine::new(backend, window, EngineDesc::default());

    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_dispatch_resizes_viewport() {
    let (mut engine, backend, _) = engine();

    engine.dispatch(&Event::FramebufferResized { width: 1024, height: 768 });

    assert_eq!(engine.context().viewport(), (1024, 768));
    assert_eq!(lock(&backend).viewport(), (1024, 768));
}

#[test]
fn test_frame_then_shutdown_releases_everything() {
    let (mut engine, backend, window) = engine();
    let storage = engine.storages_mut().create_storage("scene", "res/");
    let (material, cube) = {
        let mut guard = lock(&storage);
        let shader = guard.push_shader(TRIANGLE_SHADER).unwrap();
        let material = guard.push_material(&MaterialDesc::new(shader)).unwrap();
        (material, guard.push_mesh_type(MeshType::Cube).unwrap())
    };

    let renderer = engine.renderer_mut();
    renderer.begin_pass(Mat4::IDENTITY);
    renderer.queue(RenderCommand::new(Renderable::Mesh(cube), material, &storage));
    let stats = renderer.end_pass().unwrap();
    renderer.present();

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(window.swap_count(), 1);

    let context = Arc::clone(engine.context());
    engine.shutdown();

    assert!(!context.is_alive());
    assert!(lock(&storage).is_destroyed());
    let live = lock(&backend).stats();
    assert_eq!(live.live_buffers, 0);
    assert_eq!(live.live_programs, 0);
    assert_eq!(live.live_vertex_arrays, 0);
}

// ============================================================================
// Logger
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_entries() {
    let logger = MemoryLogger::new();
    Engine::set_logger(logger.clone());

    Engine::log(LogSeverity::Warn, "ember3d::engine_tests", "first".to_string());
    Engine::log_detailed(LogSeverity::Error, "ember3d::engine_tests", "second".to_string(), "here.rs", 7);

    let entries: Vec<_> = logger
        .entries()
        .into_iter()
        .filter(|entry| entry.source == "ember3d::engine_tests")
        .collect();
    Engine::reset_logger();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, LogSeverity::Warn);
    assert_eq!(entries[1].file, Some("here.rs"));
    assert_eq!(entries[1].line, Some(7));
}

#[test]
#[serial]
fn test_reset_logger_detaches_memory_logger() {
    let logger = MemoryLogger::new();
    Engine::set_logger(logger.clone());
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "ember3d::engine_tests", "after reset".to_string());

    assert!(!logger.contains(LogSeverity::Info, "after reset"));
}

#[test]
#[serial]
fn test_failures_are_logged_as_errors() {
    let logger = MemoryLogger::new();
    Engine::set_logger(logger.clone());

    let backend = Arc::new(Mutex::new(HeadlessBackend::with_config(HeadlessConfig {
        version: (2, 1),
        ..HeadlessConfig::default()
    })));
    let result = Engine::new(backend, Arc::new(HeadlessWindow::new(1, 1)), EngineDesc::default());
    let logged = logger
        .entries()
        .into_iter()
        .any(|entry| entry.source == "ember3d::Context" && entry.severity == LogSeverity::Error
            && entry.message.contains("2.1"));
    Engine::reset_logger();

    assert!(result.is_err());
    assert!(logged);
}
