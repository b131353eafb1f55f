use crate::input::calibration::CalibrationSource;
use crate::input::scan::DeviceNameResolver;
use crate::input::{DeviceId, RawKeyEvent};

/// Scan code assumed for a button whose calibration file is missing or unreadable.
///
/// Such a button matches any event from its device whose raw scan code is 0.
pub const UNCALIBRATED_SCAN_CODE: i32 = 0;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Label {
    Back,
    Home,
}

impl Label {
    /// Name of the calibration file for this label
    pub fn calibration_file(self) -> &'static str {
        match self {
            Label::Back => "back",
            Label::Home => "home",
        }
    }
}

/// The physical buttons the remapper knows about, in classification priority order.
/// The back sensor ships from several vendors; a given unit carries one of them.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Button {
    BackBetterlife,
    BackGf3206,
    BackGf3208,
    BackIdex,
    Home,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::BackBetterlife,
        Button::BackGf3206,
        Button::BackGf3208,
        Button::BackIdex,
        Button::Home,
    ];

    pub const BACK_SENSORS: [Button; 4] = [
        Button::BackBetterlife,
        Button::BackGf3206,
        Button::BackGf3208,
        Button::BackIdex,
    ];

    pub fn label(self) -> Label {
        match self {
            Button::Home => Label::Home,
            _ => Label::Back,
        }
    }

    /// Name the driver registers its input device under
    pub fn device_name(self) -> &'static str {
        match self {
            Button::BackBetterlife => "betterlife-blfp",
            Button::BackGf3206 => "gf3206",
            Button::BackGf3208 => "gf3208",
            Button::BackIdex => "ix_btp",
            Button::Home => "qpnp_pon",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum DeviceBinding {
    Unbound,
    BoundTo(DeviceId),
}

#[derive(Debug, Clone)]
pub struct ButtonDescriptor {
    button: Button,
    scan_code: i32,
    binding: DeviceBinding,
    output_key_code: Option<u16>,
}

impl ButtonDescriptor {
    pub fn new(button: Button, scan_code: i32) -> ButtonDescriptor {
        ButtonDescriptor {
            button,
            scan_code,
            binding: DeviceBinding::Unbound,
            output_key_code: None,
        }
    }

    pub fn button(&self) -> Button {
        self.button
    }

    pub fn label(&self) -> Label {
        self.button.label()
    }

    pub fn device_name(&self) -> &'static str {
        self.button.device_name()
    }

    pub fn scan_code(&self) -> i32 {
        self.scan_code
    }

    pub fn binding(&self) -> DeviceBinding {
        self.binding
    }

    /// Key code learned from the last event that matched this button
    pub fn output_key_code(&self) -> Option<u16> {
        self.output_key_code
    }

    /// The device binding sticks even if the scan code then fails to match.
    fn matches<R: DeviceNameResolver>(&mut self, resolver: &R, event: &RawKeyEvent) -> bool {
        match self.binding {
            DeviceBinding::Unbound => {
                if resolver.name_of(event.device_id).as_deref() != Some(self.device_name()) {
                    return false;
                }
                info!(
                    "{:?} bound to {} ('{}')",
                    self.button,
                    event.device_id,
                    self.device_name()
                );
                self.binding = DeviceBinding::BoundTo(event.device_id);
            }
            DeviceBinding::BoundTo(id) => {
                if id != event.device_id {
                    return false;
                }
            }
        }

        if event.scan_code != self.scan_code {
            return false;
        }
        self.output_key_code = Some(event.key_code);
        true
    }
}

/// Owns the descriptors of every known button and resolves raw events to them
pub struct KeyRegistry<R> {
    descriptors: [ButtonDescriptor; 5],
    resolver: R,
}

impl<R: DeviceNameResolver> KeyRegistry<R> {
    /// Reads the calibration for every button once
    pub fn load<C: CalibrationSource + ?Sized>(calibration: &C, resolver: R) -> KeyRegistry<R> {
        let mut scan_codes = [UNCALIBRATED_SCAN_CODE; 5];
        for button in Button::ALL.iter() {
            let file = button.label().calibration_file();
            scan_codes[button.index()] = match calibration.read_scan_code(file) {
                Ok(code) => code,
                Err(e) => {
                    warn!(
                        "No calibration for {:?} ({}), using scan code {}",
                        button, e, UNCALIBRATED_SCAN_CODE
                    );
                    UNCALIBRATED_SCAN_CODE
                }
            };
        }
        KeyRegistry::with_scan_codes(scan_codes, resolver)
    }

    /// `scan_codes` is indexed in `Button::ALL` order
    pub fn with_scan_codes(scan_codes: [i32; 5], resolver: R) -> KeyRegistry<R> {
        let d = |b: Button| ButtonDescriptor::new(b, scan_codes[b.index()]);
        KeyRegistry {
            descriptors: [
                d(Button::BackBetterlife),
                d(Button::BackGf3206),
                d(Button::BackGf3208),
                d(Button::BackIdex),
                d(Button::Home),
            ],
            resolver,
        }
    }

    /// First button, in priority order, that produced `event`
    pub fn classify(&mut self, event: &RawKeyEvent) -> Option<Button> {
        self.classify_among(&Button::ALL, event)
    }

    /// Like `classify`, restricted to `candidates` which are tried in the given order
    pub fn classify_among(&mut self, candidates: &[Button], event: &RawKeyEvent) -> Option<Button> {
        let resolver = &self.resolver;
        let descriptors = &mut self.descriptors;
        candidates
            .iter()
            .copied()
            .find(|b| descriptors[b.index()].matches(resolver, event))
    }

    pub fn descriptor(&self, button: Button) -> &ButtonDescriptor {
        &self.descriptors[button.index()]
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}
