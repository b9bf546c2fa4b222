//! Button sampling
//!
//! Buttons are numbered from 1 in priority order. A poll samples them one
//! at a time and stops at the first pressed button, so a held button masks
//! every lower-priority one.

use alloc::vec::Vec;
use core::fmt;

use oledmenu_hal::{InputPin, Level};

/// A button number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(pub u8);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key{}", self.0)
    }
}

/// Buttons in priority order
pub struct ButtonPad<P> {
    buttons: Vec<(Key, P)>,
    pressed_level: Level,
}

impl<P: InputPin> ButtonPad<P> {
    /// Number the pins 1, 2, 3, ... in the order given
    ///
    /// A button reads as pressed when its pin is high.
    pub fn new(pins: impl IntoIterator<Item = P>) -> Self {
        let buttons = pins
            .into_iter()
            .zip(1u8..)
            .map(|(pin, n)| (Key(n), pin))
            .collect();
        Self {
            buttons,
            pressed_level: Level::High,
        }
    }

    /// Treat `level` as the pressed state
    pub fn pressed_when(mut self, level: Level) -> Self {
        self.pressed_level = level;
        self
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.buttons.iter().map(|(key, _)| *key)
    }

    /// Highest-priority pressed button, reading no further than it
    pub fn first_pressed(&mut self) -> Result<Option<Key>, P::Error> {
        for (key, pin) in self.buttons.iter_mut() {
            if pin.level()? == self.pressed_level {
                return Ok(Some(*key));
            }
        }
        Ok(None)
    }

    /// Release every pin, attempting all of them even after a failure
    ///
    /// Returns the first error seen.
    pub fn release_all(&mut self) -> Result<(), P::Error> {
        let mut first_error = None;
        for (key, pin) in self.buttons.iter_mut() {
            if let Err(e) = pin.release() {
                log::warn!("failed to release {}", key);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn pins(&self) -> impl Iterator<Item = &P> {
        self.buttons.iter().map(|(_, pin)| pin)
    }
}
