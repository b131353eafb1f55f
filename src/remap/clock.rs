use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Time since an arbitrary fixed point, never going backwards
    fn now(&self) -> Duration;
}

/// `CLOCK_MONOTONIC`, i.e. uptime excluding suspend
#[derive(Debug, Default, Copy, Clone)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // Cannot fail for CLOCK_MONOTONIC with a valid pointer
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }
        Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
    }
}
