use super::clock::{Clock, MonotonicClock};
use super::config::RemapConfig;
use super::inject::{InjectionSink, Injector, KeyFlags};
use super::registry::{Button, KeyRegistry};
use super::timer::{Scheduler, ThreadScheduler, TimerToken};
use crate::input::calibration::ProcKeypad;
use crate::input::ecodes;
use crate::input::scan::{DeviceNameResolver, EvDevsScan, SCAN};
use crate::input::{KeyAction, RawKeyEvent};

use std::sync::Arc;
use std::time::Duration;

/// The pending deferred home release
pub const HOME_TAP: TimerToken = TimerToken("home_tap");

/// Turns classified sensor events into navigation key events.
///
/// The back sensor reports a DOWN and an UP for every touch, so only the UP is
/// looked at: a tap is BACK, a tap within the double tap window of the previous
/// one is APP_SWITCH. The home button goes DOWN right away but its UP is held
/// for the single tap timeout; a back tap arriving meanwhile cancels it, the
/// home key then being released with `KeyFlags::CANCELED`.
///
/// Events must be fed in arrival order from a single thread. The deferred home
/// release only owns a copy of the injector, so the registry and the tap time
/// are never touched from the scheduler's thread.
pub struct DebounceDispatcher<R> {
    registry: KeyRegistry<R>,
    injector: Injector,
    scheduler: Arc<dyn Scheduler>,
    single_tap_timeout: Duration,
    double_tap_timeout: Duration,
    last_back_tap: Duration,
}

impl DebounceDispatcher<&'static EvDevsScan> {
    /// Wires the dispatcher to the real calibration files, the evdev scan,
    /// `CLOCK_MONOTONIC` and a thread backed scheduler
    pub fn for_host(
        config: &RemapConfig,
        sink: Arc<dyn InjectionSink>,
    ) -> DebounceDispatcher<&'static EvDevsScan> {
        let calibration = ProcKeypad::new(config.calibration_root.clone());
        let registry = KeyRegistry::load(&calibration, &*SCAN);
        DebounceDispatcher::new(
            registry,
            config,
            sink,
            Arc::new(ThreadScheduler::new()),
            Arc::new(MonotonicClock),
        )
    }
}

impl<R: DeviceNameResolver> DebounceDispatcher<R> {
    pub fn new(
        registry: KeyRegistry<R>,
        config: &RemapConfig,
        sink: Arc<dyn InjectionSink>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> DebounceDispatcher<R> {
        DebounceDispatcher {
            registry,
            injector: Injector::new(sink, clock),
            scheduler,
            single_tap_timeout: config.single_tap_timeout,
            double_tap_timeout: config.double_tap_timeout,
            last_back_tap: Duration::from_millis(0),
        }
    }

    pub fn registry(&self) -> &KeyRegistry<R> {
        &self.registry
    }

    /// Returns whether the event was consumed
    pub fn handle(&mut self, event: &RawKeyEvent) -> bool {
        start_bench!(stopwatch, handle_key_event);
        let mut handled = self.handle_back(event);
        handled = self.handle_home(event) || handled;
        end_bench!(handle_key_event);
        handled
    }

    /// Hands the event back when it was not consumed, so the host can pass it on
    pub fn filter(&mut self, event: RawKeyEvent) -> Option<RawKeyEvent> {
        if self.handle(&event) {
            None
        } else {
            Some(event)
        }
    }

    fn handle_back(&mut self, event: &RawKeyEvent) -> bool {
        // The sensor reports fake DOWN and UP per taps
        if event.action != KeyAction::Up {
            return false;
        }
        let button = match self.registry.classify_among(&Button::BACK_SENSORS, event) {
            Some(button) => button,
            None => return false,
        };

        self.cancel_home_tap();

        let now = self.injector.now();
        let elapsed = now.checked_sub(self.last_back_tap).unwrap_or_default();
        if elapsed < self.double_tap_timeout {
            debug!("{:?} double tap after {:?}", button, elapsed);
            self.injector.tap(ecodes::KEY_APPSELECT);
        } else {
            debug!("{:?} tap", button);
            self.injector.tap(ecodes::KEY_BACK);
        }
        self.last_back_tap = now;
        true
    }

    fn handle_home(&mut self, event: &RawKeyEvent) -> bool {
        if self
            .registry
            .classify_among(&[Button::Home], event)
            .is_none()
        {
            return false;
        }
        let key_code = self
            .registry
            .descriptor(Button::Home)
            .output_key_code()
            .unwrap_or(event.key_code);

        match event.action {
            KeyAction::Down => {
                self.injector
                    .inject(key_code, KeyAction::Down, KeyFlags::empty());
            }
            KeyAction::Up => {
                let injector = self.injector.clone();
                self.scheduler.schedule_after(
                    self.single_tap_timeout,
                    HOME_TAP,
                    Box::new(move || injector.inject(key_code, KeyAction::Up, KeyFlags::empty())),
                );
            }
        }
        true
    }

    /// Drops the deferred home release and releases home as cancelled. Nothing is
    /// injected while no home event has ever matched, since the key is unknown.
    fn cancel_home_tap(&mut self) {
        if self.scheduler.cancel(HOME_TAP) {
            debug!("home tap superseded by a back tap");
        }
        if let Some(key_code) = self.registry.descriptor(Button::Home).output_key_code() {
            self.injector
                .inject(key_code, KeyAction::Up, KeyFlags::CANCELED);
        }
    }
}
