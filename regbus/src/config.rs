//! Bus selection.
//!
//! I2C adapters appear as `/dev/i2c-N`. Which adapter to use is configured by
//! index and turned into a device path here.

use std::path::PathBuf;

/// Default prefix the adapter index is appended to.
pub const DEFAULT_PATH_PREFIX: &str = "/dev/i2c-";

/// Default adapter index.
pub const DEFAULT_DEVICE_INDEX: u32 = 1;

/// Which I2C adapter to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Adapter index, e.g. `1` for `/dev/i2c-1`.
    pub device_index: u32,

    /// Path prefix the index is appended to.
    pub path_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::with_index(DEFAULT_DEVICE_INDEX)
    }
}

impl BusConfig {
    /// Configuration for adapter `device_index` under the default prefix.
    pub fn with_index(device_index: u32) -> Self {
        Self {
            device_index,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }

    /// Parse configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REGBUS_I2C_DEVICE`: adapter index (default: 1; unparsable values
    ///   fall back to the default)
    /// - `REGBUS_I2C_PREFIX`: device node prefix (default: `/dev/i2c-`)
    pub fn from_env() -> Self {
        let device_index = std::env::var("REGBUS_I2C_DEVICE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_DEVICE_INDEX);

        let path_prefix = std::env::var("REGBUS_I2C_PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string());

        Self {
            device_index,
            path_prefix,
        }
    }

    /// Path of the device node to open.
    pub fn device_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.path_prefix, self.device_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn index_is_appended_to_prefix() {
        assert_eq!(BusConfig::with_index(1).device_path(), PathBuf::from("/dev/i2c-1"));
        assert_eq!(BusConfig::with_index(12).device_path(), PathBuf::from("/dev/i2c-12"));
    }

    #[test]
    #[serial]
    fn from_env_defaults() {
        std::env::remove_var("REGBUS_I2C_DEVICE");
        std::env::remove_var("REGBUS_I2C_PREFIX");

        assert_eq!(BusConfig::from_env(), BusConfig::default());
    }

    #[test]
    #[serial]
    fn from_env_overrides() {
        std::env::set_var("REGBUS_I2C_DEVICE", "3");
        std::env::set_var("REGBUS_I2C_PREFIX", "/tmp/fake-i2c-");

        let config = BusConfig::from_env();
        assert_eq!(config.device_path(), PathBuf::from("/tmp/fake-i2c-3"));

        std::env::remove_var("REGBUS_I2C_DEVICE");
        std::env::remove_var("REGBUS_I2C_PREFIX");
    }

    #[test]
    #[serial]
    fn from_env_ignores_garbage_index() {
        std::env::set_var("REGBUS_I2C_DEVICE", "one");

        assert_eq!(BusConfig::from_env().device_index, DEFAULT_DEVICE_INDEX);

        std::env::remove_var("REGBUS_I2C_DEVICE");
    }
}
