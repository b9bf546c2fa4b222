//! Render buffer
//!
//! A fixed grid of rows, each a fixed-width run of glyph-encoded bytes.
//! The buffer is rebuilt every redraw; rows nobody wrote since the last
//! [`RenderBuffer::clear`] are emitted as the blank row at flush time.

use alloc::vec;
use alloc::vec::Vec;

/// Per-frame pixel rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBuffer {
    row_len: usize,
    rows: Vec<Option<Vec<u8>>>,
}

impl RenderBuffer {
    /// Create an empty buffer of `rows` rows, each `row_len` bytes wide
    pub fn new(rows: usize, row_len: usize) -> Self {
        Self {
            row_len,
            rows: vec![None; rows],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Bytes per row
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Forget every written row
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            *row = None;
        }
    }

    /// Replace row `index`
    ///
    /// `bytes` is truncated or zero-padded to the row width. Writes past
    /// the last row are dropped and reported as `false`.
    pub fn write_row(&mut self, index: usize, mut bytes: Vec<u8>) -> bool {
        let row_len = self.row_len;
        match self.rows.get_mut(index) {
            Some(slot) => {
                bytes.resize(row_len, 0);
                *slot = Some(bytes);
                true
            }
            None => false,
        }
    }

    /// Fill rows in order from a flat run of pixel bytes
    ///
    /// Used by scenes that draw raw pixels instead of text. A trailing
    /// partial row is zero-padded; bytes beyond the last row are ignored.
    pub fn write_raw(&mut self, pixels: &[u8]) {
        if self.row_len == 0 {
            return;
        }
        for (index, chunk) in pixels.chunks(self.row_len).enumerate() {
            if !self.write_row(index, chunk.to_vec()) {
                break;
            }
        }
    }

    /// Contents of row `index`, if written
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).and_then(|r| r.as_deref())
    }

    /// Check whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Option::is_none)
    }

    /// Flatten into a full frame, substituting `blank` for unwritten rows
    pub fn to_frame(&self, blank: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.rows.len() * self.row_len);
        for row in &self.rows {
            match row {
                Some(bytes) => frame.extend_from_slice(bytes),
                None => frame.extend(
                    blank
                        .iter()
                        .copied()
                        .chain(core::iter::repeat(0))
                        .take(self.row_len),
                ),
            }
        }
        frame
    }
}
