//! Display side of oledmenu
//!
//! This crate provides:
//! - [`RenderBuffer`], the per-frame grid of glyph-encoded rows
//! - [`Compositor`], which lays [`LogicalLine`]s out into the buffer
//! - [`Canvas`], the drawing facade handed to scene draw hooks
//! - [`DisplayTransport`], the byte-level interface to a panel controller
//! - [`Ssd1306`] over any [`oledmenu_hal::I2cBus`], and [`Panel`] which
//!   owns power state on top of a transport
//!
//! # Architecture
//!
//! Scenes write logical lines (text, invert flag, overflow mode) through a
//! `Canvas`. After the draw hook returns, the compositor encodes every line
//! into glyph bytes, and the panel streams the resulting frame to the
//! controller. Rows that nothing wrote this frame go out blank.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod backend;
pub mod buffer;
pub mod canvas;
pub mod compositor;
pub mod font;
pub mod panel;
pub mod ssd1306;

// Re-export key types
pub use backend::DisplayTransport;
pub use buffer::RenderBuffer;
pub use canvas::Canvas;
pub use compositor::{layout, Compositor, LineSet, LogicalLine, Overflow};
pub use font::{Glyph, GlyphTable, GLYPH_WIDTH};
pub use panel::{Panel, PowerState};
pub use ssd1306::Ssd1306;

/// Panel width in pixels
pub const PANEL_WIDTH: usize = 128;

/// Panel height in pixels
pub const PANEL_HEIGHT: usize = 64;

/// Character grid of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Characters per row
    pub columns: usize,
    /// Text rows (one 8-pixel page each)
    pub rows: usize,
}

impl Geometry {
    /// 16 columns of 8-pixel glyphs by 8 pages: the full 128x64 panel
    pub const FULL_PANEL: Self = Self {
        columns: PANEL_WIDTH / GLYPH_WIDTH,
        rows: PANEL_HEIGHT / 8,
    };

    /// Bytes in one encoded row
    pub const fn row_len(&self) -> usize {
        self.columns * GLYPH_WIDTH
    }

    /// Bytes in one full frame
    pub const fn frame_len(&self) -> usize {
        self.row_len() * self.rows
    }

    /// Check that the grid fits on the panel
    pub const fn fits_panel(&self) -> bool {
        self.columns > 0
            && self.rows > 0
            && self.row_len() <= PANEL_WIDTH
            && self.rows * 8 <= PANEL_HEIGHT
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::FULL_PANEL
    }
}
