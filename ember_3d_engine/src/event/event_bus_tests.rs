//! Unit tests for EventBus and Event

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

use crate::event::{Event, EventBus, EventType};

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_dispatch_reaches_matching_listeners_only() {
    let mut bus = EventBus::new();
    let resized = Arc::new(AtomicU32::new(0));
    let closed = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&resized);
    bus.listen(EventType::FramebufferResized, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });
    let counter = Arc::clone(&closed);
    bus.listen(EventType::WindowClosed, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });

    bus.dispatch(&Event::FramebufferResized { width: 10, height: 20 });
    bus.dispatch(&Event::FramebufferResized { width: 30, height: 40 });

    assert_eq!(resized.load(Ordering::SeqCst), 2);
    assert_eq!(closed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_consuming_listener_stops_propagation() {
    let mut bus = EventBus::new();
    let second = Arc::new(AtomicU32::new(0));

    bus.listen(EventType::AppQuit, |_| true);
    let counter = Arc::clone(&second);
    bus.listen(EventType::AppQuit, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });

    assert!(bus.dispatch(&Event::AppQuit));
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn test_dispatch_without_listeners() {
    let mut bus = EventBus::new();
    assert!(!bus.dispatch(&Event::WindowFocused(true)));
}

#[test]
fn test_unlisten() {
    let mut bus = EventBus::new();
    let id = bus.listen(EventType::WindowClosed, |_| false);
    assert_eq!(bus.listener_count(EventType::WindowClosed), 1);

    assert!(bus.unlisten(id));
    assert!(!bus.unlisten(id));
    assert_eq!(bus.listener_count(EventType::WindowClosed), 0);
}

#[test]
fn test_listener_receives_payload() {
    let mut bus = EventBus::new();
    let width = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&width);
    bus.listen(EventType::FramebufferResized, move |event| {
        if let Event::FramebufferResized { width, .. } = *event {
            seen.store(width, Ordering::SeqCst);
        }
        false
    });

    bus.dispatch(&Event::FramebufferResized { width: 1920, height: 1080 });
    assert_eq!(width.load(Ordering::SeqCst), 1920);
}

// ============================================================================
// winit translation
// ============================================================================

#[test]
fn test_from_winit_resized() {
    let event = Event::from_winit(&WindowEvent::Resized(PhysicalSize::new(640, 480)));
    assert_eq!(event, Some(Event::FramebufferResized { width: 640, height: 480 }));
}

#[test]
fn test_from_winit_close_and_focus() {
    assert_eq!(Event::from_winit(&WindowEvent::CloseRequested), Some(Event::WindowClosed));
    assert_eq!(Event::from_winit(&WindowEvent::Focused(false)), Some(Event::WindowFocused(false)));
    assert_eq!(Event::from_winit(&WindowEvent::RedrawRequested), None);
}

#[test]
fn test_event_type_mapping() {
    assert_eq!(Event::AppQuit.event_type(), EventType::AppQuit);
    assert_eq!(
        Event::WindowResized { width: 1, height: 1 }.event_type(),
        EventType::WindowResized
    );
}
