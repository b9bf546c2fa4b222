//! Panel power and frame upload
//!
//! [`Panel`] sits on top of a [`DisplayTransport`] and tracks whether the
//! panel is lit, so the poll loop can call [`Panel::display_on`] every
//! redraw and [`Panel::display_off`] every idle tick without flooding the
//! bus with redundant writes.

use crate::backend::DisplayTransport;
use crate::ssd1306::{cmd, INIT_SEQUENCE};
use crate::{Geometry, PANEL_HEIGHT, PANEL_WIDTH};

/// Whether the panel is lit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    On,
    Off,
}

/// A panel behind a transport
pub struct Panel<T> {
    transport: T,
    geometry: Geometry,
    power: PowerState,
}

impl<T: DisplayTransport> Panel<T> {
    /// Wrap a transport; nothing is written until [`Panel::init`]
    pub fn new(transport: T, geometry: Geometry) -> Self {
        Self {
            transport,
            geometry,
            power: PowerState::Off,
        }
    }

    /// Send the power-up sequence; the panel ends up lit
    pub fn init(&mut self) -> Result<(), T::Error> {
        log::debug!("panel init");
        self.transport.write_register_sequence(INIT_SEQUENCE)?;
        self.power = PowerState::On;
        Ok(())
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Light the panel if it is dark
    pub fn display_on(&mut self) -> Result<(), T::Error> {
        if self.power == PowerState::Off {
            log::debug!("display on");
            self.transport.write_register_sequence(&[cmd::DISPLAY_ON])?;
            self.power = PowerState::On;
        }
        Ok(())
    }

    /// Darken the panel
    ///
    /// Idempotent unless `force`, which always writes the command. The
    /// forced form is for shutdown paths where the tracked state may be
    /// stale.
    pub fn display_off(&mut self, force: bool) -> Result<(), T::Error> {
        if force || self.power == PowerState::On {
            log::debug!("display off (force: {})", force);
            self.power = PowerState::Off;
            self.transport.write_register_sequence(&[cmd::DISPLAY_OFF])?;
        }
        Ok(())
    }

    /// Upload a full frame
    pub fn flush(&mut self, frame: &[u8]) -> Result<(), T::Error> {
        let last_column = self.geometry.row_len().min(PANEL_WIDTH).saturating_sub(1) as u8;
        let last_page = self.geometry.rows.min(PANEL_HEIGHT / 8).saturating_sub(1) as u8;
        self.transport.write_register_sequence(&[
            cmd::SET_COLUMN_ADDR,
            0,
            last_column,
            cmd::SET_PAGE_ADDR,
            0,
            last_page,
        ])?;
        self.transport.write_pixel_block(frame)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
