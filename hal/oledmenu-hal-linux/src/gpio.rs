//! Buttons on sysfs GPIO
//!
//! Each button is a pin exported under `/sys/class/gpio` and configured as
//! an input. A pressed button reads high. Pins are unexported again by
//! [`SysfsButton::release`], which the engine calls on every exit path.

use embedded_hal::digital::InputPin as _;
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::SysfsPin;
use oledmenu_hal::{InputPin, Level};

use crate::error::LinuxHalError;

/// A push button wired to a sysfs GPIO line
pub struct SysfsButton {
    number: u64,
    pin: SysfsPin,
    exported: bool,
}

impl SysfsButton {
    /// Export `number` and configure it as an input
    pub fn open(number: u64) -> Result<Self, LinuxHalError> {
        let pin = SysfsPin::new(number);
        let setup = |reason: String| LinuxHalError::GpioSetup {
            pin: number,
            reason,
        };

        pin.export().map_err(|e| setup(format!("{e:?}")))?;
        let mut button = Self {
            number,
            pin,
            exported: true,
        };

        // Dropping `button` on error unexports the pin again
        button
            .pin
            .set_direction(Direction::In)
            .map_err(|e| setup(format!("{e:?}")))?;

        log::debug!("GPIO {} exported as button input", number);
        Ok(button)
    }

    /// GPIO line number
    pub fn number(&self) -> u64 {
        self.number
    }

    fn unexport(&mut self) -> Result<(), LinuxHalError> {
        if !self.exported {
            return Ok(());
        }
        self.exported = false;
        self.pin
            .unexport()
            .map_err(|e| LinuxHalError::GpioRelease {
                pin: self.number,
                reason: format!("{e:?}"),
            })
    }
}

impl InputPin for SysfsButton {
    type Error = LinuxHalError;

    fn level(&mut self) -> Result<Level, Self::Error> {
        let number = self.number;
        self.pin
            .is_high()
            .map(Level::from)
            .map_err(|e| LinuxHalError::GpioRead {
                pin: number,
                reason: format!("{e:?}"),
            })
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.unexport()
    }
}

impl Drop for SysfsButton {
    fn drop(&mut self) {
        if let Err(e) = self.unexport() {
            log::warn!("{}", e);
        }
    }
}
