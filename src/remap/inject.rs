use super::clock::Clock;
use crate::input::KeyAction;

use bitflags::bitflags;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

bitflags! {
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct KeyFlags: u32 {
        /// The key was released as part of a gesture that got superseded, consumers
        /// must not act on it
        const CANCELED = 0x20;
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EventSource {
    VirtualKeyboard,
}

/// A standard key event produced by the remapper
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct OutputKeyEvent {
    pub key_code: u16,
    pub action: KeyAction,
    pub flags: KeyFlags,
    pub down_time: Duration,
    pub event_time: Duration,
    pub source: EventSource,
}

/// Delivers synthesized events to the rest of the platform. Fire-and-forget,
/// implementations must not block the caller.
pub trait InjectionSink: Send + Sync {
    fn inject(&self, event: OutputKeyEvent);
}

impl InjectionSink for Sender<OutputKeyEvent> {
    fn inject(&self, event: OutputKeyEvent) {
        if let Err(e) = self.send(event) {
            error!("Failed to write OutputKeyEvent into the channel: {}", e);
        }
    }
}

/// Stamps and delivers synthesized key events. Cheap to clone so that deferred
/// callbacks can carry their own copy.
#[derive(Clone)]
pub struct Injector {
    sink: Arc<dyn InjectionSink>,
    clock: Arc<dyn Clock>,
}

impl Injector {
    pub fn new(sink: Arc<dyn InjectionSink>, clock: Arc<dyn Clock>) -> Injector {
        Injector { sink, clock }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn inject(&self, key_code: u16, action: KeyAction, flags: KeyFlags) {
        let now = self.clock.now();
        trace!("inject key {} {:?} {:?}", key_code, action, flags);
        self.sink.inject(OutputKeyEvent {
            key_code,
            action,
            flags,
            down_time: now,
            event_time: now,
            source: EventSource::VirtualKeyboard,
        });
    }

    /// DOWN immediately followed by UP
    pub fn tap(&self, key_code: u16) {
        self.inject(key_code, KeyAction::Down, KeyFlags::empty());
        self.inject(key_code, KeyAction::Up, KeyFlags::empty());
    }
}
