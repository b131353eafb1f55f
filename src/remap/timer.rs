use fxhash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Names a class of deferred callbacks. At most one callback per token is pending.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct TimerToken(pub &'static str);

pub type Callback = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Runs `action` once `delay` has passed, unless cancelled first. A callback
    /// still pending under the same token is cancelled.
    fn schedule_after(&self, delay: Duration, token: TimerToken, action: Callback);

    /// Returns whether a pending callback was dropped. Once this returns, the
    /// callback for `token` has either run to completion or never will.
    fn cancel(&self, token: TimerToken) -> bool;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One scheduled callback. Firing and cancelling take the same lock, and the
/// callback runs while it is held.
pub(crate) struct TimerSlot {
    action: Mutex<Option<Callback>>,
}

impl TimerSlot {
    fn new(action: Callback) -> Arc<TimerSlot> {
        Arc::new(TimerSlot {
            action: Mutex::new(Some(action)),
        })
    }

    pub(crate) fn fire(&self) -> bool {
        let mut action = lock(&self.action);
        match action.take() {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    fn cancel(&self) -> bool {
        lock(&self.action).take().is_some()
    }
}

/// Token bookkeeping shared by the scheduler implementations
#[derive(Default)]
pub(crate) struct TimerTable {
    slots: Mutex<FxHashMap<TimerToken, Arc<TimerSlot>>>,
}

impl TimerTable {
    pub(crate) fn arm(&self, token: TimerToken, action: Callback) -> Arc<TimerSlot> {
        let slot = TimerSlot::new(action);
        let mut slots = lock(&self.slots);
        if let Some(previous) = slots.insert(token, Arc::clone(&slot)) {
            if previous.cancel() {
                debug!("{:?} rescheduled, dropped the pending callback", token);
            }
        }
        slot
    }

    pub(crate) fn cancel(&self, token: TimerToken) -> bool {
        let slot = lock(&self.slots).remove(&token);
        match slot {
            Some(slot) => slot.cancel(),
            None => false,
        }
    }

    /// Forget `slot` after it fired, unless the token was re-armed meanwhile
    pub(crate) fn retire(&self, token: TimerToken, slot: &Arc<TimerSlot>) {
        let mut slots = lock(&self.slots);
        if slots.get(&token).map_or(false, |s| Arc::ptr_eq(s, slot)) {
            slots.remove(&token);
        }
    }

    pub(crate) fn is_pending(&self, token: TimerToken) -> bool {
        lock(&self.slots)
            .get(&token)
            .map_or(false, |s| lock(&s.action).is_some())
    }
}

/// Sleeps on a dedicated thread per callback.
///
/// Meant for low frequency timers such as one pending home release. Every
/// `schedule_after` spawns a thread, and a cancelled callback's thread still
/// sleeps out its full delay before it finds the slot empty and exits.
#[derive(Default, Clone)]
pub struct ThreadScheduler {
    table: Arc<TimerTable>,
}

impl ThreadScheduler {
    pub fn new() -> ThreadScheduler {
        ThreadScheduler::default()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.table.is_pending(token)
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_after(&self, delay: Duration, token: TimerToken, action: Callback) {
        let slot = self.table.arm(token, action);
        let table = Arc::clone(&self.table);
        let _ = std::thread::spawn(move || {
            std::thread::sleep(delay);
            slot.fire();
            table.retire(token, &slot);
        });
    }

    fn cancel(&self, token: TimerToken) -> bool {
        self.table.cancel(token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;

    const TOKEN: TimerToken = TimerToken("test");

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Callback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let make = move || -> Callback {
            let c = Arc::clone(&c);
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, make)
    }

    #[test]
    fn rearming_cancels_the_previous_callback() {
        let table = TimerTable::default();
        let (count, make) = counter();

        let first = table.arm(TOKEN, make());
        let second = table.arm(TOKEN, make());
        assert!(!first.fire());
        assert!(second.fire());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_slot_never_fires() {
        let table = TimerTable::default();
        let (count, make) = counter();

        let slot = table.arm(TOKEN, make());
        assert!(table.is_pending(TOKEN));
        assert!(table.cancel(TOKEN));
        assert!(!table.cancel(TOKEN));
        assert!(!slot.fire());
        assert!(!table.is_pending(TOKEN));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn retire_keeps_a_newer_slot() {
        let table = TimerTable::default();
        let (_, make) = counter();

        let old = table.arm(TOKEN, make());
        let _new = table.arm(TOKEN, make());
        table.retire(TOKEN, &old);
        assert!(table.is_pending(TOKEN));
    }

    #[test]
    fn thread_scheduler_fires_after_delay() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = channel();
        scheduler.schedule_after(
            Duration::from_millis(10),
            TOKEN,
            Box::new(move || tx.send(()).unwrap()),
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn thread_scheduler_cancel() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = channel();
        scheduler.schedule_after(
            Duration::from_millis(50),
            TOKEN,
            Box::new(move || tx.send(()).unwrap()),
        );
        assert!(scheduler.cancel(TOKEN));
        assert!(!scheduler.is_pending(TOKEN));
        // the sender was dropped with the callback
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn cancelled_sleeper_leaves_a_newer_callback_alone() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = channel();
        let old_tx = tx.clone();
        scheduler.schedule_after(
            Duration::from_millis(100),
            TOKEN,
            Box::new(move || old_tx.send("old").unwrap()),
        );
        assert!(scheduler.cancel(TOKEN));

        // the cancelled thread is still asleep while the token is armed again
        scheduler.schedule_after(
            Duration::from_millis(300),
            TOKEN,
            Box::new(move || tx.send("new").unwrap()),
        );
        std::thread::sleep(Duration::from_millis(150));
        assert!(scheduler.is_pending(TOKEN));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("new"));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!scheduler.is_pending(TOKEN));
    }
}
