use std::io;
use std::path::PathBuf;

/// Where the keypad driver publishes one file per button, each holding the
/// scan code that button reports.
pub const DEFAULT_KEYPAD_DIR: &str = "/proc/keypad";

/// Source of the per-button scan codes. Only read while the registry is built.
pub trait CalibrationSource {
    fn read_scan_code(&self, button_file: &str) -> io::Result<i32>;
}

/// Reads `<root>/<button_file>`, the first line being a decimal scan code
pub struct ProcKeypad {
    root: PathBuf,
}

impl ProcKeypad {
    pub fn new<P: Into<PathBuf>>(root: P) -> ProcKeypad {
        ProcKeypad { root: root.into() }
    }
}

impl Default for ProcKeypad {
    fn default() -> Self {
        ProcKeypad::new(DEFAULT_KEYPAD_DIR)
    }
}

impl CalibrationSource for ProcKeypad {
    fn read_scan_code(&self, button_file: &str) -> io::Result<i32> {
        let content = std::fs::read_to_string(self.root.join(button_file))?;
        parse_scan_code(&content)
    }
}

fn parse_scan_code(content: &str) -> io::Result<i32> {
    let line = content.lines().next().unwrap_or("").trim();
    line.parse::<i32>().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("'{}' is not a scan code: {}", line, e),
        )
    })
}
