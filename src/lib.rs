#[cfg(not(feature = "enable-runtime-benchmarking"))]
#[macro_export]
macro_rules! start_bench {
    ($stopwatch_path:ident, $name:ident) => {};
}

#[cfg(not(feature = "enable-runtime-benchmarking"))]
#[macro_export]
macro_rules! end_bench {
    ($name:expr) => {};
}

#[cfg(feature = "enable-runtime-benchmarking")]
#[macro_export]
macro_rules! start_bench {
    ($stopwatch_path:ident, $name:ident) => {
        let $name = $stopwatch_path::Stopwatch::start_new();
    };
}

#[cfg(feature = "enable-runtime-benchmarking")]
#[macro_export]
macro_rules! end_bench {
    ($name:ident) => {
        let dur = $name.elapsed();
        let s = dur.as_secs();
        let mut us = dur.subsec_nanos() / 1000;
        let ms = us / 1000;
        us -= ms * 1000;
        debug!("'{}' took {}s {}ms {}us", stringify!($name), s, ms, us);
    };
}

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

extern crate fxhash;
extern crate libc;

pub extern crate epoll;
pub extern crate evdev;
pub extern crate stopwatch;

/// Raw key events: decoding evdev records, enumerating the sensor devices
/// and reading the per-button calibration
pub mod input;

/// The remapping core. `KeyRegistry` resolves which logical button produced a
/// raw event and `DebounceDispatcher` turns those into BACK / APP_SWITCH / HOME
/// taps, holding back the home release long enough for a back tap to cancel it.
pub mod remap;
