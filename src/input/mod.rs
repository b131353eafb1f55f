/// Reads the per-button scan codes the firmware reports
pub mod calibration;

/// Linux input event codes used by the sensors and the synthesized output
pub mod ecodes;

/// Contains the epoll code to read from the device when the worker thread is woken up by the
/// kernel upon new data to consume
pub mod ev;

/// Enumerates the evdev nodes and resolves device ids to the names the drivers report
pub mod scan;

use evdev::raw::input_event;
use std::time::Duration;

/// Identity of the input device an event came from. For evdev nodes this is
/// the `eventN` index plus one, so that no real device ever has id 0.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct DeviceId(pub u32);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input device #{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum KeyAction {
    Down,
    Up,
}

/// A key record as delivered by the driver, before any remapping
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct RawKeyEvent {
    pub device_id: DeviceId,
    /// Hardware code of the sensor, as listed in the calibration files. Kept at the
    /// full width `MSC_SCAN` carries.
    pub scan_code: i32,
    /// Key code the driver translated the scan code into
    pub key_code: u16,
    pub action: KeyAction,
    pub time: Duration,
}

/// Per device decoding state. The drivers report `MSC_SCAN` right before the key record
/// it belongs to, so the value is held until the next `EV_KEY`.
#[derive(Debug, Default)]
pub struct ScanState {
    pending_scan: Option<i32>,
}

impl ScanState {
    pub fn new() -> ScanState {
        ScanState::default()
    }
}

pub fn decode(
    ev: &input_event,
    device_id: DeviceId,
    state: &mut ScanState,
) -> Option<RawKeyEvent> {
    match ev._type {
        ecodes::EV_SYN => {
            /* safely ignored. sync event*/
            None
        }
        ecodes::EV_MSC => {
            if ev.code == ecodes::MSC_SCAN {
                state.pending_scan = Some(ev.value);
            }
            None
        }
        ecodes::EV_KEY => {
            let scan_code = state
                .pending_scan
                .take()
                .unwrap_or_else(|| i32::from(ev.code));
            let action = match ev.value {
                0 => KeyAction::Up,
                1 => KeyAction::Down,
                // autorepeat carries nothing the remapper uses
                _ => return None,
            };
            Some(RawKeyEvent {
                device_id,
                scan_code,
                key_code: ev.code,
                action,
                time: Duration::new(ev.time.tv_sec as u64, (ev.time.tv_usec as u32) * 1000),
            })
        }
        _ => {
            debug!(
                "Ignoring record from {0} [type: {1} code: {2} value: {3}]",
                device_id, ev._type, ev.code, ev.value
            );
            None
        }
    }
}
