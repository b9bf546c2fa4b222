//! Errors from Linux device access

use thiserror::Error;

/// Failure talking to a Linux device node
#[derive(Debug, Error)]
pub enum LinuxHalError {
    /// The I2C character device could not be opened
    #[error("cannot open I2C bus {path}: {reason}")]
    I2cOpen { path: String, reason: String },

    /// A write to the I2C bus failed
    #[error("I2C write to 0x{address:02x} failed: {reason}")]
    I2cWrite { address: u8, reason: String },

    /// Exporting or configuring a GPIO pin failed
    #[error("cannot set up GPIO {pin}: {reason}")]
    GpioSetup { pin: u64, reason: String },

    /// Reading a GPIO value failed
    #[error("cannot read GPIO {pin}: {reason}")]
    GpioRead { pin: u64, reason: String },

    /// Unexporting a GPIO pin failed
    #[error("cannot release GPIO {pin}: {reason}")]
    GpioRelease { pin: u64, reason: String },
}
