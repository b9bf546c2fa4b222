//! Addresses and host metrics

use std::rc::Rc;
use std::time::Duration;

use oledmenu_core::Scene;
use oledmenu_display::{LogicalLine, Overflow};

use crate::metrics::StatusSource;

const LINES: &str = "lines";

/// Frames between two samples
const RESAMPLE_EVERY: u32 = 10;

pub(super) fn scene(source: Rc<dyn StatusSource>) -> Scene {
    Scene::new("status")
        .refresh_every(Duration::from_millis(500))
        .on_draw(move |state, canvas| {
            if canvas.frame() % RESAMPLE_EVERY == 0 || !state.contains(LINES) {
                state.insert(LINES, source.status_lines());
            }
            if let Some(lines) = state.get::<Vec<String>>(LINES) {
                for line in lines {
                    canvas.put(LogicalLine::new(line.as_str()).overflow(Overflow::Scroll));
                }
            }
            None
        })
}
