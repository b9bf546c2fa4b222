//! Linux HAL for oledmenu
//!
//! Implements the `oledmenu-hal` traits on a Linux single-board computer:
//!
//! - [`LinuxI2c`] - `/dev/i2c-*` character devices
//! - [`SysfsButton`] - buttons exported through `/sys/class/gpio`
//! - [`SystemClock`] - the std monotonic clock
//!
//! Device access goes through `linux-embedded-hal`; this crate only adapts
//! its `embedded-hal` implementations to the engine's traits and manages
//! the export/unexport lifecycle of the sysfs pins.

#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod gpio;
pub mod i2c;

pub use clock::SystemClock;
pub use error::LinuxHalError;
pub use gpio::SysfsButton;
pub use i2c::LinuxI2c;
