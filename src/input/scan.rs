use super::DeviceId;
use fxhash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

lazy_static! {
    /// A singleton of the EvDevsScan object
    pub static ref SCAN: EvDevsScan = EvDevsScan::new();
}

/// Resolves the device id found on a raw event into the human readable name
/// the driver registered the device under.
pub trait DeviceNameResolver {
    fn name_of(&self, device_id: DeviceId) -> Option<String>;
}

impl<'a, R: DeviceNameResolver + ?Sized> DeviceNameResolver for &'a R {
    fn name_of(&self, device_id: DeviceId) -> Option<String> {
        (**self).name_of(device_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDevice {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Default)]
struct KnownDevices {
    named: FxHashMap<DeviceId, ScannedDevice>,
    /// Ids whose node could not be opened. Not opened again.
    unreadable: FxHashSet<DeviceId>,
}

/// This struct contains the results of scanning the evdev devices. Devices that
/// show up after the scan are opened once, when an event from them is first resolved.
pub struct EvDevsScan {
    input_dir: PathBuf,
    devices: Mutex<KnownDevices>,
    opens: AtomicUsize,
}

/// `eventN` maps to `DeviceId(N + 1)`
pub fn device_id_for(file_name: &str) -> Option<DeviceId> {
    if !file_name.starts_with("event") {
        return None;
    }
    file_name["event".len()..]
        .parse::<u32>()
        .ok()
        .map(|n| DeviceId(n + 1))
}

fn open_node(path: &Path) -> Option<ScannedDevice> {
    match evdev::Device::open(&path) {
        Ok(dev) => Some(ScannedDevice {
            path: path.to_path_buf(),
            name: dev.name().to_string_lossy().into_owned(),
        }),
        Err(e) => {
            warn!("Failed to scan {:?}: {}", path, e);
            None
        }
    }
}

impl EvDevsScan {
    fn new() -> Self {
        Self::scan_dir("/dev/input")
    }

    /// Scan all the evdev nodes under `input_dir` and remember their names
    pub fn scan_dir<P: Into<PathBuf>>(input_dir: P) -> Self {
        let input_dir = input_dir.into();
        let mut devices = KnownDevices::default();

        match input_dir.read_dir() {
            Err(e) => warn!("Failed to list {:?}: {}", input_dir, e),
            Ok(entries) => {
                for entry in entries.filter_map(|e| e.ok()) {
                    let file_name = entry.file_name().to_string_lossy().into_owned();
                    let id = match device_id_for(&file_name) {
                        Some(id) => id,
                        None => continue,
                    };
                    match open_node(&entry.path()) {
                        Some(dev) => {
                            debug!("{} is '{}' ({:?})", id, dev.name, dev.path);
                            devices.named.insert(id, dev);
                        }
                        None => {
                            devices.unreadable.insert(id);
                        }
                    }
                }
            }
        }

        info!(
            "Scanned {} evdev devices under {:?}",
            devices.named.len(),
            input_dir
        );
        EvDevsScan {
            input_dir,
            devices: Mutex::new(devices),
            opens: AtomicUsize::new(0),
        }
    }

    /// Snapshot of everything known so far
    pub fn devices(&self) -> Vec<(DeviceId, ScannedDevice)> {
        match self.devices.lock() {
            Ok(devices) => devices
                .named
                .iter()
                .map(|(id, d)| (*id, d.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Devices registered under one of `names`
    pub fn find_named(&self, names: &[&str]) -> Vec<(DeviceId, ScannedDevice)> {
        self.devices()
            .into_iter()
            .filter(|(_, dev)| names.contains(&dev.name.as_str()))
            .collect()
    }

    /// Number of nodes opened on demand by `name_of` since the scan
    pub fn on_demand_opens(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

impl DeviceNameResolver for EvDevsScan {
    fn name_of(&self, device_id: DeviceId) -> Option<String> {
        {
            let devices = self.devices.lock().ok()?;
            if let Some(dev) = devices.named.get(&device_id) {
                return Some(dev.name.clone());
            }
            if device_id.0 == 0 || devices.unreadable.contains(&device_id) {
                return None;
            }
        }

        // the node is opened without holding the lock
        let path = self.input_dir.join(format!("event{}", device_id.0 - 1));
        self.opens.fetch_add(1, Ordering::Relaxed);
        let opened = open_node(&path);

        let mut devices = self.devices.lock().ok()?;
        match opened {
            Some(dev) => {
                let name = dev.name.clone();
                devices.named.insert(device_id, dev);
                Some(name)
            }
            None => {
                devices.unreadable.insert(device_id);
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn event_nodes_map_to_nonzero_ids() {
        assert_eq!(device_id_for("event0"), Some(DeviceId(1)));
        assert_eq!(device_id_for("event12"), Some(DeviceId(13)));
        assert_eq!(device_id_for("mouse0"), None);
        assert_eq!(device_id_for("event"), None);
        assert_eq!(device_id_for("eventx"), None);
    }

    #[test]
    fn missing_input_dir_scans_nothing() {
        let scan = EvDevsScan::scan_dir("/nonexistent/input");
        assert!(scan.devices().is_empty());
        assert_eq!(scan.name_of(DeviceId(1)), None);
        assert_eq!(scan.name_of(DeviceId(0)), None);
    }

    #[test]
    fn unopenable_ids_are_opened_once() {
        let dir = std::env::temp_dir().join(format!("navkeys-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let scan = EvDevsScan::scan_dir(&dir);
        assert_eq!(scan.name_of(DeviceId(5)), None);
        assert_eq!(scan.on_demand_opens(), 1);
        assert_eq!(scan.name_of(DeviceId(5)), None);
        assert_eq!(scan.on_demand_opens(), 1);

        // another id still gets its one try
        assert_eq!(scan.name_of(DeviceId(6)), None);
        assert_eq!(scan.on_demand_opens(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
