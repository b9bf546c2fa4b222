//! Display transport trait
//!
//! The byte-level interface to a panel controller. The engine never
//! assumes anything about the bus beyond what an implementation does with
//! these two calls.

/// Byte-level panel transport
pub trait DisplayTransport {
    /// Error type of the underlying bus
    type Error;

    /// Send a sequence of controller commands (register writes)
    fn write_register_sequence(&mut self, registers: &[u8]) -> Result<(), Self::Error>;

    /// Stream pixel data into display RAM
    ///
    /// Implementations split `pixels` at whatever maximum payload the bus
    /// imposes.
    fn write_pixel_block(&mut self, pixels: &[u8]) -> Result<(), Self::Error>;
}

impl<T: DisplayTransport + ?Sized> DisplayTransport for &mut T {
    type Error = T::Error;

    fn write_register_sequence(&mut self, registers: &[u8]) -> Result<(), Self::Error> {
        (**self).write_register_sequence(registers)
    }

    fn write_pixel_block(&mut self, pixels: &[u8]) -> Result<(), Self::Error> {
        (**self).write_pixel_block(pixels)
    }
}
