/// Ember3D Engine - subsystem owner and process-wide logger
///
/// `Engine` bundles the event bus, the graphics context, the storage
/// manager and the renderer, and tears them down in dependency order.
/// The logger is the only process-wide state: the `engine_*` macros route
/// through `Engine::log` / `Engine::log_detailed`.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;

use crate::error::Result;
use crate::event::{Event, EventBus};
use crate::gfx::{Backend, Context, ContextDesc};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::renderer::Renderer;
use crate::resource::{StorageManager, StorageManagerConfig};
use crate::window::Window;
use crate::engine_info;

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== CONFIGURATION =====

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineDesc {
    pub context: ContextDesc,
    pub storage: StorageManagerConfig,
}

// ===== PUBLIC API =====

/// Owner of the engine subsystems
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use ember_3d_engine::ember3d::{Engine, EngineDesc};
/// use ember_3d_engine::ember3d::gfx::HeadlessBackend;
/// use ember_3d_engine::ember3d::window::HeadlessWindow;
///
/// let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
/// let window = Arc::new(HeadlessWindow::new(1280, 720));
/// let engine = Engine::new(backend, window, EngineDesc::default())?;
///
/// engine.shutdown();
/// # Ok::<(), ember_3d_engine::ember3d::Error>(())
/// ```
pub struct Engine {
    events: EventBus,
    context: Arc<Context>,
    storages: StorageManager,
    renderer: Renderer,
}

impl Engine {
    /// Create the context, the storage manager and the renderer
    ///
    /// # Errors
    ///
    /// Propagates context initialization failures (backend too old) and
    /// renderer setup failures.
    pub fn new(
        backend: Arc<Mutex<dyn Backend>>,
        window: Arc<dyn Window>,
        desc: EngineDesc,
    ) -> Result<Self> {
        let mut events = EventBus::new();
        let context = Context::new(backend, window, desc.context, &mut events)?;
        let mut storages = StorageManager::init(Arc::clone(&context), desc.storage)?;
        let renderer = Renderer::new(Arc::clone(&context), &mut storages)?;

        engine_info!("ember3d::Engine", "Engine initialized");
        Ok(Self { events, context, storages, renderer })
    }

    /// Forward a window-layer event to every subscriber
    pub fn dispatch(&mut self, event: &Event) -> bool {
        self.events.dispatch(event)
    }

    // ===== ACCESSORS =====

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn storages(&self) -> &StorageManager {
        &self.storages
    }

    pub fn storages_mut(&mut self) -> &mut StorageManager {
        &mut self.storages
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Tear everything down
    ///
    /// Storages go first (their objects live on the context), then the
    /// resize subscription, then the context itself.
    pub fn shutdown(self) {
        let Self { mut events, context, storages, renderer } = self;
        drop(renderer);
        storages.shutdown();
        events.unlisten(context.resize_listener());
        context.shutdown();
        engine_info!("ember3d::Engine", "Engine shut down");
    }

    // ===== LOGGER =====

    /// Replace the process-wide logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ember_3d_engine::ember3d::Engine;
    /// use ember_3d_engine::ember3d::log::{LogSeverity, DefaultLogger};
    ///
    /// Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Warn));
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Log without call-site details
    ///
    /// Used by `engine_trace!` through `engine_warn!`.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line of the call site
    ///
    /// Used by `engine_error!`.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
