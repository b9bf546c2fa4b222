//! GPIO pin abstractions
//!
//! Buttons are sampled as digital inputs. Reads are fallible because on a
//! Linux board every read is a file access.

/// Logic level of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Error type for pin access
    type Error;

    /// Read the current level of the pin
    fn level(&mut self) -> Result<Level, Self::Error>;

    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level()? == Level::High)
    }

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level()? == Level::Low)
    }

    /// Hand the pin back to the system
    ///
    /// Called once on shutdown. Must tolerate being called on a pin that
    /// was never fully acquired.
    fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
