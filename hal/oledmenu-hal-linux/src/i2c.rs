//! I2C bus over `/dev/i2c-*`

use embedded_hal::i2c::I2c as _;
use linux_embedded_hal::I2cdev;
use oledmenu_hal::I2cBus;

use crate::error::LinuxHalError;

/// I2C master backed by a Linux i2c-dev node
pub struct LinuxI2c {
    dev: I2cdev,
}

impl LinuxI2c {
    /// Open the bus at `path` (e.g. `/dev/i2c-0`)
    pub fn open(path: &str) -> Result<Self, LinuxHalError> {
        let dev = I2cdev::new(path).map_err(|e| LinuxHalError::I2cOpen {
            path: path.to_string(),
            reason: format!("{e:?}"),
        })?;
        log::debug!("opened I2C bus {}", path);
        Ok(Self { dev })
    }
}

impl I2cBus for LinuxI2c {
    type Error = LinuxHalError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.dev
            .write(address, data)
            .map_err(|e| LinuxHalError::I2cWrite {
                address,
                reason: format!("{e:?}"),
            })
    }
}
