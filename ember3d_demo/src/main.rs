//! Ember3D demo: a winit window driving the engine on the OpenGL backend
//!
//! Opens a window, fills a scene storage with a cube and a floor plane,
//! and renders them every frame until the window is closed. Falls back to
//! `HeadlessBackend` when no OpenGL 4.2 context can be created. Frame
//! statistics are logged.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use ember_3d_engine::ember3d::event::Event;
use ember_3d_engine::ember3d::gfx::{Backend, HeadlessBackend};
use ember_3d_engine::ember3d::render::{RenderCommand, Renderable};
use ember_3d_engine::ember3d::resource::{MaterialDesc, MaterialId, MeshId, MeshType, SharedStorage};
use ember_3d_engine::ember3d::window::Window as EngineWindow;
use ember_3d_engine::ember3d::{Engine, EngineDesc, Result};
use ember_3d_engine::{engine_error, engine_info, engine_warn};
use ember_3d_engine_renderer_gl::GlSurface;
use glam::{Mat4, Vec3, Vec4};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const SHADER_SOURCE: &str = "#version 420 core
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(std140, binding = 0) uniform Matrices { mat4 view_projection; };
uniform mat4 u_model;
out vec3 v_normal;
void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = view_projection * u_model * vec4(a_position, 1.0);
}
#version 420 core
in vec3 v_normal;
uniform vec3 u_ambient_color;
uniform vec3 u_diffuse_color;
out vec4 frag_color;
void main() {
    float light = max(dot(normalize(v_normal), normalize(vec3(0.3, 1.0, 0.5))), 0.0);
    frag_color = vec4(u_ambient_color + u_diffuse_color * light, 1.0);
}
";

struct Scene {
    storage: SharedStorage,
    material: MaterialId,
    cube: MeshId,
    floor: MeshId,
}

struct App {
    window: Option<Arc<Window>>,
    surface: Option<GlSurface>,
    engine: Option<Engine>,
    scene: Option<Scene>,
    started: Instant,
    frames: u64,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            surface: None,
            engine: None,
            scene: None,
            started: Instant::now(),
            frames: 0,
        }
    }

    fn load_scene(engine: &mut Engine) -> Result<Scene> {
        let storage = engine.storages_mut().create_storage("scene", "assets/");
        let mut guard = storage.lock().map_err(|_| {
            ember_3d_engine::engine_err!("ember3d::Demo", "Scene storage lock poisoned")
        })?;

        let shader = guard.push_shader(SHADER_SOURCE)?;
        let material = guard.push_material(&MaterialDesc::new(shader))?;
        if let Some(material) = guard.get_material_mut(material) {
            material.diffuse_color = Vec3::new(0.9, 0.45, 0.2);
        }
        let cube = guard.push_mesh_type(MeshType::Cube)?;
        let floor = guard.push_mesh_type(MeshType::Plane)?;
        drop(guard);

        Ok(Scene { storage, material, cube, floor })
    }

    fn render(&mut self) -> Result<()> {
        let (Some(engine), Some(scene), Some(window)) = (&mut self.engine, &self.scene, &self.window) else {
            return Ok(());
        };

        let time = self.started.elapsed().as_secs_f32();
        let projection = Mat4::perspective_rh(45f32.to_radians(), window.aspect_ratio(), 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(3.0, 2.5, 4.0), Vec3::ZERO, Vec3::Y);

        let renderer = engine.renderer_mut();
        renderer.begin_pass(projection * view);
        renderer.queue(
            RenderCommand::new(Renderable::Mesh(scene.cube), scene.material, &scene.storage)
                .with_transform(Mat4::from_rotation_y(time)),
        );
        renderer.queue(
            RenderCommand::new(Renderable::Mesh(scene.floor), scene.material, &scene.storage)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0)) * Mat4::from_scale(Vec3::splat(8.0))),
        );
        let stats = renderer.end_pass()?;
        renderer.present();
        if let Some(surface) = &mut self.surface {
            surface.swap_buffers()?;
        }

        self.frames += 1;
        if self.frames % 300 == 0 {
            engine_info!("ember3d::Demo", "Frame {}: {:?}", self.frames, stats);
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title("Ember3D Demo");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                engine_error!("ember3d::Demo", "Window creation failed: {}", err);
                event_loop.exit();
                return;
            }
        };

        let backend: Arc<Mutex<dyn Backend>> = match GlSurface::new(&window) {
            Ok(surface) => {
                let backend = surface.create_backend();
                self.surface = Some(surface);
                Arc::new(Mutex::new(backend))
            }
            Err(err) => {
                engine_warn!("ember3d::Demo", "OpenGL unavailable ({}), using the headless backend", err);
                Arc::new(Mutex::new(HeadlessBackend::new()))
            }
        };
        let engine_window: Arc<dyn EngineWindow> = window.clone();
        let mut engine = match Engine::new(backend, engine_window, EngineDesc::default()) {
            Ok(engine) => engine,
            Err(err) => {
                engine_error!("ember3d::Demo", "Engine initialization failed: {}", err);
                event_loop.exit();
                return;
            }
        };
        engine.renderer_mut().set_clear_color(Vec4::new(0.05, 0.06, 0.08, 1.0));

        match Self::load_scene(&mut engine) {
            Ok(scene) => self.scene = Some(scene),
            Err(err) => engine_error!("ember3d::Demo", "Scene loading failed: {}", err),
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let (Some(engine), Some(translated)) = (&mut self.engine, Event::from_winit(&event)) {
            engine.dispatch(&translated);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(surface) = &self.surface {
                    surface.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.render() {
                    engine_error!("ember3d::Demo", "Frame failed: {}", err);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scene = None;
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
        self.surface = None;
        engine_info!("ember3d::Demo", "Rendered {} frames", self.frames);
    }
}

fn main() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            engine_error!("ember3d::Demo", "Event loop creation failed: {}", err);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(err) = event_loop.run_app(&mut app) {
        engine_error!("ember3d::Demo", "Event loop error: {}", err);
    }
}
