use super::clock::Clock;
use super::inject::{InjectionSink, OutputKeyEvent};
use super::timer::{Callback, Scheduler, TimerSlot, TimerTable, TimerToken};
use crate::input::scan::DeviceNameResolver;
use crate::input::DeviceId;

use fxhash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new(now: Duration) -> ManualClock {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}

/// Runs callbacks on the test thread when the shared clock is advanced past
/// their deadline
pub struct ManualScheduler {
    clock: Arc<ManualClock>,
    table: TimerTable,
    queue: Mutex<Vec<(Duration, TimerToken, Arc<TimerSlot>)>>,
}

impl ManualScheduler {
    pub fn new(clock: Arc<ManualClock>) -> ManualScheduler {
        ManualScheduler {
            clock,
            table: TimerTable::default(),
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.table.is_pending(token)
    }

    pub fn advance(&self, by: Duration) {
        let target = self.clock.now() + by;
        loop {
            let next = {
                let mut queue = self.queue.lock().unwrap();
                queue.sort_by_key(|(due, _, _)| *due);
                if queue.first().map_or(false, |(due, _, _)| *due <= target) {
                    Some(queue.remove(0))
                } else {
                    None
                }
            };
            match next {
                Some((due, token, slot)) => {
                    self.clock.set(due);
                    slot.fire();
                    self.table.retire(token, &slot);
                }
                None => break,
            }
        }
        self.clock.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, token: TimerToken, action: Callback) {
        let slot = self.table.arm(token, action);
        let due = self.clock.now() + delay;
        self.queue.lock().unwrap().push((due, token, slot));
    }

    fn cancel(&self, token: TimerToken) -> bool {
        self.table.cancel(token)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OutputKeyEvent>>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    pub fn take(&self) -> Vec<OutputKeyEvent> {
        std::mem::replace(&mut *self.events.lock().unwrap(), Vec::new())
    }
}

impl InjectionSink for RecordingSink {
    fn inject(&self, event: OutputKeyEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fixed id -> name table that counts lookups
#[derive(Default)]
pub struct StaticNames {
    names: FxHashMap<DeviceId, String>,
    lookups: Mutex<usize>,
}

impl StaticNames {
    pub fn new(names: &[(u32, &str)]) -> StaticNames {
        StaticNames {
            names: names
                .iter()
                .map(|(id, name)| (DeviceId(*id), name.to_string()))
                .collect(),
            lookups: Mutex::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

impl DeviceNameResolver for StaticNames {
    fn name_of(&self, device_id: DeviceId) -> Option<String> {
        *self.lookups.lock().unwrap() += 1;
        self.names.get(&device_id).cloned()
    }
}
