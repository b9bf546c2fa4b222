//! Drawing facade for scene draw hooks

use alloc::string::String;

use crate::buffer::RenderBuffer;
use crate::compositor::{LineSet, LogicalLine, Overflow};

/// What a draw hook writes into
///
/// Line-mode scenes use [`Canvas::putline`] / [`Canvas::put`]; raw-mode
/// scenes write pixel bytes directly with [`Canvas::raw`]. The frame value
/// is the scene's counter as it stood when the draw started.
pub struct Canvas<'a> {
    lines: &'a mut LineSet,
    buffer: &'a mut RenderBuffer,
    frame: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(lines: &'a mut LineSet, buffer: &'a mut RenderBuffer, frame: u32) -> Self {
        Self {
            lines,
            buffer,
            frame,
        }
    }

    /// Frame counter of the scene being drawn
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Characters per row
    pub fn columns(&self) -> usize {
        self.lines.geometry().columns
    }

    /// Text rows
    pub fn rows(&self) -> usize {
        self.lines.geometry().rows
    }

    /// Write a plain line on the next free row
    pub fn putline(&mut self, text: impl Into<String>) -> Option<usize> {
        self.lines.put(LogicalLine::new(text))
    }

    /// Write a line with explicit options
    pub fn put(&mut self, line: LogicalLine) -> Option<usize> {
        self.lines.put(line)
    }

    /// Shorthand for a line that is highlighted when `selected`
    pub fn item(&mut self, text: impl Into<String>, selected: bool) -> Option<usize> {
        self.lines
            .put(LogicalLine::new(text).inverted(selected).overflow(Overflow::Scroll))
    }

    /// Write raw pixel bytes, row-major by page
    pub fn raw(&mut self, pixels: &[u8]) {
        self.buffer.write_raw(pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Geometry;

    #[test]
    fn test_putline_auto_rows() {
        let g = Geometry::FULL_PANEL;
        let mut lines = LineSet::new(g);
        let mut buffer = RenderBuffer::new(g.rows, g.row_len());
        let mut canvas = Canvas::new(&mut lines, &mut buffer, 3);

        assert_eq!(canvas.frame(), 3);
        assert_eq!(canvas.columns(), 16);
        assert_eq!(canvas.putline("one"), Some(0));
        assert_eq!(canvas.item("two", true), Some(1));

        assert_eq!(lines.len(), 2);
        assert!(lines.get(1).unwrap().is_inverted());
    }

    #[test]
    fn test_raw_writes_buffer() {
        let g = Geometry::FULL_PANEL;
        let mut lines = LineSet::new(g);
        let mut buffer = RenderBuffer::new(g.rows, g.row_len());
        let mut canvas = Canvas::new(&mut lines, &mut buffer, 0);

        canvas.raw(&[0xAA; 128]);
        assert_eq!(buffer.row(0), Some(&[0xAA; 128][..]));
        assert!(buffer.row(1).is_none());
    }
}
