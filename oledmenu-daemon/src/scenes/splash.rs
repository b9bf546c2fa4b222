//! Idle screen: pixel noise redrawn every second

use std::time::Duration;

use oledmenu_core::Scene;
use oledmenu_display::GLYPH_WIDTH;

const RNG: &str = "rng";

/// Xorshift32 step; `state` must not be zero
fn next(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Fill `pixels` with noise from `state`
fn noise(state: &mut u32, pixels: &mut [u8]) {
    for chunk in pixels.chunks_mut(4) {
        let bytes = next(state).to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }
}

pub(super) fn scene(seed: u32) -> Scene {
    let seed = if seed == 0 { 0x9E37_79B9 } else { seed };
    Scene::new("splash")
        .line_mode(false)
        .refresh_every(Duration::from_secs(1))
        .on_init(move |state| {
            state.insert(RNG, seed);
            None
        })
        .on_draw(|state, canvas| {
            let mut pixels = vec![0u8; canvas.rows() * canvas.columns() * GLYPH_WIDTH];
            let mut rng = state.get_or(RNG, 1u32);
            noise(&mut rng, &mut pixels);
            state.insert(RNG, rng);
            canvas.raw(&pixels);
            None
        })
}
