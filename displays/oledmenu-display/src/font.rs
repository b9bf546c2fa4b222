//! Glyph table
//!
//! 8x8 glyphs in the panel's native page layout: one byte per pixel
//! column, least significant bit at the top. Printable ASCII is rasterised
//! once from the `embedded-graphics` 5x8 monospace font; everything else
//! maps to [`FALLBACK_GLYPH`].

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

/// Glyph width in pixel columns
pub const GLYPH_WIDTH: usize = 8;

/// One encoded character
pub type Glyph = [u8; GLYPH_WIDTH];

/// Shown for characters outside the table (a hollow box)
pub const FALLBACK_GLYPH: Glyph = [0x00, 0x7E, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x00];

const FIRST: u8 = b' ';
const LAST: u8 = b'~';

/// Normal and inverted glyphs for printable ASCII
#[derive(Debug, Clone)]
pub struct GlyphTable {
    glyphs: Vec<Glyph>,
}

impl GlyphTable {
    /// Rasterise the table
    pub fn new() -> Self {
        let glyphs = (FIRST..=LAST).map(|b| rasterize(b as char)).collect();
        Self { glyphs }
    }

    /// Glyph for `ch`, or the fallback glyph
    pub fn glyph(&self, ch: char) -> Glyph {
        if !ch.is_ascii() {
            return FALLBACK_GLYPH;
        }
        let code = ch as u8;
        if (FIRST..=LAST).contains(&code) {
            self.glyphs[(code - FIRST) as usize]
        } else {
            FALLBACK_GLYPH
        }
    }

    /// Glyph for `ch`, complemented when `inverted`
    pub fn encode(&self, ch: char, inverted: bool) -> Glyph {
        let mut glyph = self.glyph(ch);
        if inverted {
            for column in glyph.iter_mut() {
                *column = !*column;
            }
        }
        glyph
    }

    /// Encode `text` and append the bytes to `out`
    pub fn encode_into(&self, text: &str, inverted: bool, out: &mut Vec<u8>) {
        for ch in text.chars() {
            out.extend_from_slice(&self.encode(ch, inverted));
        }
    }

    /// A row of `columns` normal spaces
    pub fn blank_row(&self, columns: usize) -> Vec<u8> {
        let space = self.glyph(' ');
        let mut row = Vec::with_capacity(columns * GLYPH_WIDTH);
        for _ in 0..columns {
            row.extend_from_slice(&space);
        }
        row
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory 8x8 draw target collecting lit pixels as page columns
#[derive(Default)]
struct GlyphCell {
    columns: Glyph,
}

impl OriginDimensions for GlyphCell {
    fn size(&self) -> Size {
        Size::new(GLYPH_WIDTH as u32, 8)
    }
}

impl DrawTarget for GlyphCell {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if !color.is_on() {
                continue;
            }
            if (0..GLYPH_WIDTH as i32).contains(&point.x) && (0..8).contains(&point.y) {
                self.columns[point.x as usize] |= 1u8 << point.y;
            }
        }
        Ok(())
    }
}

fn rasterize(ch: char) -> Glyph {
    let mut cell = GlyphCell::default();
    let mut utf8 = [0u8; 4];
    let text = ch.encode_utf8(&mut utf8);
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);

    // One column of left bearing keeps 5-wide glyphs centred in the cell
    match Text::with_baseline(text, Point::new(1, 0), style, Baseline::Top).draw(&mut cell) {
        Ok(_) => cell.columns,
        Err(never) => match never {},
    }
}
