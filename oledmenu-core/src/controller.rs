//! Input and power loop
//!
//! The controller is the single thread of control that:
//! - Samples the buttons in priority order
//! - Hands released key presses to the navigator
//! - Owns the two deadlines: next redraw and display auto-off
//! - Draws, composes and flushes the current scene
//! - Runs the cleanup path however the loop ends
//!
//! # Tick
//!
//! Each tick sleeps (short while the panel is lit, longer while it is dark)
//! and then:
//!
//! 1. If a button is pressed: remember it, force a redraw, push the
//!    auto-off deadline out, and end the tick. Nothing else happens until
//!    every button is released, so one press yields one key event.
//! 2. Otherwise dispatch the remembered key, or resolve the transition the
//!    last draw asked for. A dispatched key discards that transition.
//! 3. Stop if the current scene is terminal.
//! 4. Past the auto-off deadline: darken the panel and skip drawing.
//! 5. Past the redraw deadline: draw, compose, flush, schedule the next
//!    redraw, then apply the scene's deferred commands.

use core::fmt::Debug;
use core::mem;
use core::time::Duration;

use oledmenu_display::{Compositor, DisplayTransport, LineSet, Panel, PowerState, RenderBuffer};
use oledmenu_hal::{Clock, InputPin};

use crate::error::{ConfigError, EngineError};
use crate::input::{ButtonPad, Key};
use crate::intent::Target;
use crate::navigator::Navigator;
use crate::scene::{SceneId, Terminal};

/// Poll loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Idle time before the panel is switched off
    pub display_off_timeout: Duration,
    /// Poll period while the panel is off
    pub polling_interval: Duration,
    /// Poll period while the panel is on
    pub turbo_polling_interval: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            display_off_timeout: Duration::from_secs(30),
            polling_interval: Duration::from_millis(200),
            turbo_polling_interval: Duration::from_millis(10),
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate(Terminal),
}

/// The run loop
pub struct Controller<T, P, C> {
    navigator: Navigator,
    panel: Panel<T>,
    buttons: ButtonPad<P>,
    clock: C,
    timing: LoopTiming,
    compositor: Compositor,
    lines: LineSet,
    buffer: RenderBuffer,
    pending_key: Option<Key>,
    pending_target: Target,
    next_redraw: Option<Duration>,
    off_deadline: Duration,
}

type Error<T, P> = EngineError<<T as DisplayTransport>::Error, <P as InputPin>::Error>;

impl<T, P, C> Controller<T, P, C>
where
    T: DisplayTransport,
    T::Error: Debug,
    P: InputPin,
    P::Error: Debug,
    C: Clock,
{
    pub fn new(
        navigator: Navigator,
        panel: Panel<T>,
        buttons: ButtonPad<P>,
        clock: C,
        timing: LoopTiming,
    ) -> Self {
        let geometry = panel.geometry();
        let compositor = Compositor::new(geometry);
        let buffer = compositor.buffer();
        Self {
            navigator,
            panel,
            buttons,
            clock,
            timing,
            compositor,
            lines: LineSet::new(geometry),
            buffer,
            pending_key: None,
            pending_target: Target::Stay,
            next_redraw: None,
            off_deadline: Duration::ZERO,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn panel(&self) -> &Panel<T> {
        &self.panel
    }

    pub fn buttons(&self) -> &ButtonPad<P> {
        &self.buttons
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Latest render buffer
    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    /// Run until a terminal scene is reached or an error occurs
    ///
    /// The cleanup path runs in both cases before this returns.
    pub fn run(&mut self, initial: SceneId) -> Result<Terminal, Error<T, P>> {
        let result = self.run_loop(initial);
        if let Err(e) = &result {
            log::error!("run loop stopped: {}", e);
        }
        self.cleanup();
        result
    }

    fn run_loop(&mut self, initial: SceneId) -> Result<Terminal, Error<T, P>> {
        self.start(initial)?;
        loop {
            if let Flow::Terminate(terminal) = self.tick()? {
                log::info!("terminal scene reached: {:?}", terminal);
                return Ok(terminal);
            }
        }
    }

    /// Light the panel and enter the first scene
    pub fn start(&mut self, initial: SceneId) -> Result<(), Error<T, P>> {
        self.panel.init().map_err(EngineError::Display)?;
        let now = self.clock.now();
        self.off_deadline = now.saturating_add(self.timing.display_off_timeout);
        self.next_redraw = Some(now);
        self.navigator.start(initial)?;
        Ok(())
    }

    /// One poll of the loop
    pub fn tick(&mut self) -> Result<Flow, Error<T, P>> {
        let interval = if self.panel.power() == PowerState::On {
            self.timing.turbo_polling_interval
        } else {
            self.timing.polling_interval
        };
        self.clock.sleep(interval);
        let now = self.clock.now();

        if let Some(key) = self.buttons.first_pressed().map_err(EngineError::Input)? {
            self.pending_key = Some(key);
            self.next_redraw = Some(now);
            self.off_deadline = now.saturating_add(self.timing.display_off_timeout);
            return Ok(Flow::Continue);
        }

        let pending = mem::take(&mut self.pending_target);
        if let Some(key) = self.pending_key.take() {
            if !pending.is_stay() {
                log::debug!("{} overrides pending {:?}", key, pending);
            }
            self.navigator.dispatch_key(key)?;
        } else if !pending.is_stay() {
            self.navigator.resolve(pending)?;
            self.next_redraw = Some(now);
        }

        if let Some(terminal) = self.navigator.terminal() {
            return Ok(Flow::Terminate(terminal));
        }

        if now > self.off_deadline {
            self.panel.display_off(false).map_err(EngineError::Display)?;
            return Ok(Flow::Continue);
        }

        if self.next_redraw.is_some_and(|due| now >= due) {
            self.redraw(now)?;
        }
        Ok(Flow::Continue)
    }

    fn redraw(&mut self, now: Duration) -> Result<(), Error<T, P>> {
        let (options, frame) = match self.navigator.current_scene() {
            Some(scene) => (scene.options(), scene.frame()),
            None => return Err(ConfigError::NotStarted.into()),
        };

        self.panel.display_on().map_err(EngineError::Display)?;
        if options.clear {
            self.lines.clear();
            self.buffer.clear();
        }

        let target = self.navigator.tick_draw(&mut self.lines, &mut self.buffer)?;

        if options.line_mode {
            self.compositor.compose(&self.lines, frame, &mut self.buffer);
        }
        if options.flush {
            let bytes = self.compositor.frame_bytes(&self.buffer);
            self.panel.flush(&bytes).map_err(EngineError::Display)?;
        }
        self.next_redraw = options.refresh_interval.map(|interval| now + interval);

        self.navigator.flush_deferred();
        self.pending_target = target;
        Ok(())
    }

    /// Best-effort shutdown of hardware and scenes
    fn cleanup(&mut self) {
        log::info!("cleaning up");
        if let Err(e) = self.panel.display_off(true) {
            log::warn!("display off failed: {:?}", e);
        }
        if let Err(e) = self.buttons.release_all() {
            log::warn!("button release failed: {:?}", e);
        }
        self.navigator.shutdown();
        if let Err(e) = self.panel.display_off(true) {
            log::warn!("display off failed: {:?}", e);
        }
    }
}
