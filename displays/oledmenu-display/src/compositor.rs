//! Text compositor
//!
//! Turns logical lines into render buffer rows. A line that fits is padded
//! to the row width; a longer one is handled by its [`Overflow`] mode:
//!
//! - `Truncate` keeps the first `width` characters
//! - `Wrap` splits into `width`-character chunks on successive rows
//! - `Scroll` shows a `width`-character window starting at
//!   `frame % len(text)`
//!
//! Scroll windows are clamped at the end of the text rather than wrapping
//! around to its start: near the end of a cycle the window shows a
//! shrinking tail followed by padding. The window for frame `f` and frame
//! `f + len(text)` is therefore identical.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::RenderBuffer;
use crate::font::GlyphTable;
use crate::Geometry;

/// What to do with text wider than a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overflow {
    #[default]
    Truncate,
    Wrap,
    Scroll,
}

/// One line of text as a scene asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    text: String,
    inverted: bool,
    overflow: Overflow,
    row: Option<usize>,
}

impl LogicalLine {
    /// A normal, truncating line placed on the next free row
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            inverted: false,
            overflow: Overflow::Truncate,
            row: None,
        }
    }

    /// Draw with inverted glyphs
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Place on an explicit row instead of the next free one
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn overflow_mode(&self) -> Overflow {
        self.overflow
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// Rows this line occupies at `width` columns
    pub fn rows_needed(&self, width: usize) -> usize {
        let len = self.text.chars().count();
        match self.overflow {
            Overflow::Wrap if width > 0 && len > width => len.div_ceil(width),
            _ => 1,
        }
    }
}

/// Lay `text` out into rows of exactly `width` characters
///
/// `frame` only matters for [`Overflow::Scroll`].
pub fn layout(text: &str, overflow: Overflow, width: usize, frame: u32) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= width {
        return alloc::vec![pad(&chars, width)];
    }

    match overflow {
        Overflow::Truncate => alloc::vec![pad(&chars[..width], width)],
        Overflow::Wrap => chars.chunks(width).map(|chunk| pad(chunk, width)).collect(),
        Overflow::Scroll => {
            let start = frame as usize % len;
            let end = (start + width).min(len);
            alloc::vec![pad(&chars[start..end], width)]
        }
    }
}

fn pad(chars: &[char], width: usize) -> String {
    let mut out: String = chars.iter().collect();
    for _ in chars.len()..width {
        out.push(' ');
    }
    out
}

/// The logical lines written during one frame
///
/// Lines without an explicit row go below the lowest row written so far,
/// counting every row a wrapped line spans. Anything that would start past
/// the last row is dropped.
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    geometry: Geometry,
    lines: BTreeMap<usize, LogicalLine>,
    next_row: usize,
}

impl LineSet {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            lines: BTreeMap::new(),
            next_row: 0,
        }
    }

    /// Add a line; returns the row it landed on, or `None` if dropped
    pub fn put(&mut self, line: LogicalLine) -> Option<usize> {
        let row = line.row.unwrap_or(self.next_row);
        if row >= self.geometry.rows {
            return None;
        }
        let span = line.rows_needed(self.geometry.columns);
        self.next_row = self.next_row.max(row + span);
        self.lines.insert(row, line);
        Some(row)
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.lines.clear();
        self.next_row = 0;
    }

    /// Line starting at `row`
    pub fn get(&self, row: usize) -> Option<&LogicalLine> {
        self.lines.get(&row)
    }

    /// Lines in row order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LogicalLine)> {
        self.lines.iter().map(|(row, line)| (*row, line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
}

/// Encodes a [`LineSet`] into a [`RenderBuffer`]
#[derive(Debug, Clone)]
pub struct Compositor {
    geometry: Geometry,
    glyphs: GlyphTable,
    blank_row: Vec<u8>,
}

impl Compositor {
    pub fn new(geometry: Geometry) -> Self {
        let glyphs = GlyphTable::new();
        let blank_row = glyphs.blank_row(geometry.columns);
        Self {
            geometry,
            glyphs,
            blank_row,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    /// An empty buffer sized for this compositor
    pub fn buffer(&self) -> RenderBuffer {
        RenderBuffer::new(self.geometry.rows, self.geometry.row_len())
    }

    /// Write every line of `lines` into `buffer`
    ///
    /// `frame` is the frame counter of the scene that drew the lines.
    pub fn compose(&self, lines: &LineSet, frame: u32, buffer: &mut RenderBuffer) {
        for (row, line) in lines.iter() {
            let chunks = layout(line.text(), line.overflow_mode(), self.geometry.columns, frame);
            for (offset, chunk) in chunks.iter().enumerate() {
                let target = row + offset;
                if target >= self.geometry.rows {
                    break;
                }
                let mut bytes = Vec::with_capacity(self.geometry.row_len());
                self.glyphs.encode_into(chunk, line.is_inverted(), &mut bytes);
                buffer.write_row(target, bytes);
            }
        }
    }

    /// Flatten `buffer` into the bytes sent to the panel
    pub fn frame_bytes(&self, buffer: &RenderBuffer) -> Vec<u8> {
        buffer.to_frame(&self.blank_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const G: Geometry = Geometry {
        columns: 16,
        rows: 8,
    };

    #[test]
    fn test_short_line_padded() {
        let rows = layout("hello", Overflow::Truncate, 8, 0);
        assert_eq!(rows, vec!["hello   ".to_string()]);
    }

    #[test]
    fn test_empty_line_is_blank_row() {
        let rows = layout("", Overflow::Wrap, 4, 0);
        assert_eq!(rows, vec!["    ".to_string()]);
    }

    #[test]
    fn test_truncate() {
        let rows = layout("abcdefghij", Overflow::Truncate, 4, 7);
        assert_eq!(rows, vec!["abcd".to_string()]);
    }

    #[test]
    fn test_wrap() {
        let rows = layout("abcdefghij", Overflow::Wrap, 4, 0);
        assert_eq!(rows, vec!["abcd", "efgh", "ij  "]);
    }

    #[test]
    fn test_scroll_window_moves_with_frame() {
        assert_eq!(layout("abcdefghij", Overflow::Scroll, 4, 0), vec!["abcd"]);
        assert_eq!(layout("abcdefghij", Overflow::Scroll, 4, 3), vec!["defg"]);
    }

    #[test]
    fn test_scroll_clamps_at_end_of_text() {
        assert_eq!(layout("abcdefghij", Overflow::Scroll, 4, 8), vec!["ij  "]);
        assert_eq!(layout("abcdefghij", Overflow::Scroll, 4, 9), vec!["j   "]);
        assert_eq!(layout("abcdefghij", Overflow::Scroll, 4, 10), vec!["abcd"]);
    }

    #[test]
    fn test_scroll_counts_chars_not_bytes() {
        let rows = layout("ééééé", Overflow::Scroll, 4, 1);
        assert_eq!(rows, vec!["éééé"]);
    }

    #[test]
    fn test_lines_auto_increment() {
        let mut lines = LineSet::new(G);
        assert_eq!(lines.put(LogicalLine::new("a")), Some(0));
        assert_eq!(lines.put(LogicalLine::new("b")), Some(1));
        assert_eq!(lines.put(LogicalLine::new("c").at_row(5)), Some(5));
        assert_eq!(lines.put(LogicalLine::new("d")), Some(6));
    }

    #[test]
    fn test_wrapped_line_reserves_rows() {
        let mut lines = LineSet::new(G);
        let long = "x".repeat(40);
        assert_eq!(lines.put(LogicalLine::new(long).overflow(Overflow::Wrap)), Some(0));
        assert_eq!(lines.put(LogicalLine::new("next")), Some(3));
    }

    #[test]
    fn test_lines_past_last_row_dropped() {
        let mut lines = LineSet::new(G);
        for i in 0..8 {
            assert_eq!(lines.put(LogicalLine::new("row")), Some(i));
        }
        assert_eq!(lines.put(LogicalLine::new("overflow")), None);
        assert_eq!(lines.put(LogicalLine::new("far").at_row(20)), None);
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_compose_writes_rows() {
        let compositor = Compositor::new(G);
        let mut lines = LineSet::new(G);
        lines.put(LogicalLine::new("top"));
        lines.put(LogicalLine::new("sel").inverted(true).at_row(2));

        let mut buffer = compositor.buffer();
        compositor.compose(&lines, 0, &mut buffer);

        assert!(buffer.row(0).is_some());
        assert!(buffer.row(1).is_none());
        let inverted = buffer.row(2).unwrap();
        // Padding spaces of an inverted line are fully lit
        assert!(inverted[inverted.len() - 8..].iter().all(|&b| b == 0xFF));

        let frame = compositor.frame_bytes(&buffer);
        assert_eq!(frame.len(), G.frame_len());
    }

    #[test]
    fn test_compose_wrap_clamped_to_last_row() {
        let compositor = Compositor::new(G);
        let mut lines = LineSet::new(G);
        let long = "y".repeat(16 * 4);
        lines.put(LogicalLine::new(long).overflow(Overflow::Wrap).at_row(6));

        let mut buffer = compositor.buffer();
        compositor.compose(&lines, 0, &mut buffer);
        assert!(buffer.row(6).is_some());
        assert!(buffer.row(7).is_some());
        assert!(buffer.row(5).is_none());
    }

    #[test]
    fn test_compose_scroll_uses_frame() {
        let compositor = Compositor::new(G);
        let mut lines = LineSet::new(G);
        let text = "0123456789abcdefghij";
        lines.put(LogicalLine::new(text).overflow(Overflow::Scroll));

        let mut first = compositor.buffer();
        compositor.compose(&lines, 0, &mut first);
        let mut second = compositor.buffer();
        compositor.compose(&lines, 1, &mut second);
        let mut cycled = compositor.buffer();
        compositor.compose(&lines, text.len() as u32, &mut cycled);

        assert_ne!(first.row(0), second.row(0));
        assert_eq!(first.row(0), cycled.row(0));
    }

    proptest! {
        #[test]
        fn prop_wrap_round_trip(text in "[ -~]{1,80}", width in 1usize..24) {
            let len = text.chars().count();
            let rows = layout(&text, Overflow::Wrap, width, 0);

            let expected_rows = if len <= width { 1 } else { len.div_ceil(width) };
            prop_assert_eq!(rows.len(), expected_rows);
            for row in &rows {
                prop_assert_eq!(row.chars().count(), width);
            }

            let joined: String = rows.concat().chars().take(len).collect();
            prop_assert_eq!(joined, text);
        }

        #[test]
        fn prop_scroll_is_periodic(text in "[a-z]{17,60}", frame in 0u32..1000) {
            let len = text.chars().count() as u32;
            let now = layout(&text, Overflow::Scroll, 16, frame);
            let later = layout(&text, Overflow::Scroll, 16, frame + len);
            prop_assert_eq!(now, later);
        }

        #[test]
        fn prop_every_row_is_full_width(
            text in "\\PC{0,60}",
            frame in 0u32..200,
            mode in prop_oneof![
                Just(Overflow::Truncate),
                Just(Overflow::Wrap),
                Just(Overflow::Scroll),
            ],
        ) {
            for row in layout(&text, mode, 16, frame) {
                prop_assert_eq!(row.chars().count(), 16);
            }
        }
    }
}
