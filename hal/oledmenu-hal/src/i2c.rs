//! I2C bus abstractions
//!
//! Provides the master-write trait used by the panel transport.

/// I2C bus master
///
/// The panel controllers this engine drives are write-only from the
/// host's point of view, so only writes are required.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write, including any control byte
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// 7-bit device address
    pub address: u8,
    /// Largest payload the bus accepts in one transfer, excluding the
    /// control byte
    pub max_chunk: usize,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            address: 0x3C,
            max_chunk: 32, // SMBus block transfer limit
        }
    }
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, data)
    }
}
