use crate::input::calibration::DEFAULT_KEYPAD_DIR;
use std::path::PathBuf;
use std::time::Duration;

/// How long a home release is held back, waiting for a back tap to cancel it
pub const SINGLE_TAP_TIMEOUT: Duration = Duration::from_millis(150);

/// Two back taps closer than this make an app switch
pub const DOUBLE_TAP_TIMEOUT: Duration = Duration::from_millis(300);

pub const ENV_SINGLE_TAP_MS: &str = "NAVKEYS_SINGLE_TAP_MS";
pub const ENV_DOUBLE_TAP_MS: &str = "NAVKEYS_DOUBLE_TAP_MS";
pub const ENV_KEYPAD_DIR: &str = "NAVKEYS_KEYPAD_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapConfig {
    pub single_tap_timeout: Duration,
    pub double_tap_timeout: Duration,
    /// Directory holding the `back` / `home` calibration files
    pub calibration_root: PathBuf,
}

impl Default for RemapConfig {
    fn default() -> Self {
        RemapConfig {
            single_tap_timeout: SINGLE_TAP_TIMEOUT,
            double_tap_timeout: DOUBLE_TAP_TIMEOUT,
            calibration_root: PathBuf::from(DEFAULT_KEYPAD_DIR),
        }
    }
}

fn millis(key: &str, value: Option<String>) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, value, e);
            None
        }
    }
}

impl RemapConfig {
    /// Defaults, overridden by `NAVKEYS_*` environment variables when set
    pub fn from_env() -> RemapConfig {
        RemapConfig::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> RemapConfig {
        if let Some(d) = millis(ENV_SINGLE_TAP_MS, lookup(ENV_SINGLE_TAP_MS)) {
            self.single_tap_timeout = d;
        }
        if let Some(d) = millis(ENV_DOUBLE_TAP_MS, lookup(ENV_DOUBLE_TAP_MS)) {
            self.double_tap_timeout = d;
        }
        if let Some(dir) = lookup(ENV_KEYPAD_DIR) {
            self.calibration_root = PathBuf::from(dir);
        }
        if self.single_tap_timeout >= self.double_tap_timeout {
            warn!(
                "single tap timeout {:?} is not shorter than the double tap window {:?}",
                self.single_tap_timeout, self.double_tap_timeout
            );
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = RemapConfig::default();
        assert_eq!(config.single_tap_timeout, Duration::from_millis(150));
        assert_eq!(config.double_tap_timeout, Duration::from_millis(300));
        assert_eq!(config.calibration_root, PathBuf::from("/proc/keypad"));
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let config = RemapConfig::default().with_overrides(|key| match key {
            ENV_SINGLE_TAP_MS => Some("100".to_owned()),
            ENV_DOUBLE_TAP_MS => Some("soon".to_owned()),
            ENV_KEYPAD_DIR => Some("/tmp/keypad".to_owned()),
            _ => None,
        });
        assert_eq!(config.single_tap_timeout, Duration::from_millis(100));
        assert_eq!(config.double_tap_timeout, DOUBLE_TAP_TIMEOUT);
        assert_eq!(config.calibration_root, PathBuf::from("/tmp/keypad"));
    }
}
