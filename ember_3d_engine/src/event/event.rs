/// Engine events and their winit translation

use winit::event::WindowEvent;

/// Kind of an event, used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    WindowResized,
    FramebufferResized,
    WindowClosed,
    WindowFocused,
    AppQuit,
}

/// Event payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Logical window size changed
    WindowResized { width: u32, height: u32 },
    /// Drawable size changed (drives the viewport)
    FramebufferResized { width: u32, height: u32 },
    WindowClosed,
    WindowFocused(bool),
    AppQuit,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::WindowResized { .. } => EventType::WindowResized,
            Event::FramebufferResized { .. } => EventType::FramebufferResized,
            Event::WindowClosed => EventType::WindowClosed,
            Event::WindowFocused(_) => EventType::WindowFocused,
            Event::AppQuit => EventType::AppQuit,
        }
    }

    /// Translate a winit window event
    ///
    /// winit reports physical sizes, so `Resized` becomes a framebuffer
    /// resize. Events the engine does not model yield `None`.
    pub fn from_winit(event: &WindowEvent) -> Option<Event> {
        match event {
            WindowEvent::Resized(size) => Some(Event::FramebufferResized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::CloseRequested => Some(Event::WindowClosed),
            WindowEvent::Focused(focused) => Some(Event::WindowFocused(*focused)),
            WindowEvent::Destroyed => Some(Event::AppQuit),
            _ => None,
        }
    }
}
