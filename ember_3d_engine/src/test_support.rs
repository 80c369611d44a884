//! Shared fixtures for unit tests: a headless context on a headless window

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::event::EventBus;
use crate::gfx::{Backend, Context, ContextDesc, HeadlessBackend};
use crate::resource::nbr::{NbrBody, NbrFile};
use crate::resource::ResourceStorage;
use crate::utils::lock;
use crate::window::HeadlessWindow;

pub(crate) struct Fixture {
    pub context: Arc<Context>,
    pub backend: Arc<Mutex<HeadlessBackend>>,
    pub window: Arc<HeadlessWindow>,
    pub events: EventBus,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_desc(ContextDesc::default())
    }

    pub fn with_desc(desc: ContextDesc) -> Self {
        let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
        let window = Arc::new(HeadlessWindow::new(800, 600));
        let mut events = EventBus::new();
        let shared: Arc<Mutex<dyn Backend>> = backend.clone();
        let context = Context::new(shared, window.clone(), desc, &mut events)
            .expect("headless context");
        Self { context, backend, window, events }
    }

    /// Inspect the backend (do not hold across context calls)
    pub fn backend(&self) -> MutexGuard<'_, HeadlessBackend> {
        lock(&self.backend)
    }

    /// Standalone storage on this fixture's context
    pub fn storage(&self, name: &str, parent_dir: impl Into<PathBuf>) -> ResourceStorage {
        ResourceStorage::new(name, parent_dir, Arc::clone(&self.context))
    }
}

/// Fresh directory under the system temp dir, unique per test and process
pub(crate) fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ember3d_{}_{}", test, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

/// Encode `body` into `dir/file`
pub(crate) fn write_nbr(dir: &Path, file: &str, body: NbrBody) {
    std::fs::write(dir.join(file), NbrFile::new(body).encode()).expect("write container");
}

pub(crate) const TRIANGLE_SHADER: &str = "#version 420 core
layout(location = 0) in vec3 a_position;
uniform mat4 u_model;
void main() { gl_Position = u_model * vec4(a_position, 1.0); }
#version 420 core
uniform vec3 u_diffuse_color;
out vec4 frag_color;
void main() { frag_color = vec4(u_diffuse_color, 1.0); }
";
