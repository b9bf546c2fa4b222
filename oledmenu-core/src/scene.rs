//! Scenes
//!
//! A scene is a reusable screen template built once at startup. It owns:
//! - display options (clear, line mode, flush, refresh interval, keep state)
//! - a frame counter, reset to 0 on entry
//! - a private [`SceneState`] handed to every hook by reference
//! - a queue of deferred frame commands
//! - its key dispatch: a catch-all handler, or a table of [`KeyAction`]s
//! - optional init, draw and finish hooks
//!
//! Hooks never see the navigator. They return an [`Intent`] and the scene
//! applies its commands; the navigator acts on its target.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt;
use core::time::Duration;

use heapless::Vec as HVec;
use oledmenu_display::Canvas;

use crate::command::{Command, Timing};
use crate::error::ConfigError;
use crate::input::Key;
use crate::intent::{Intent, Target};
use crate::state::SceneState;

/// Deferred commands a scene can hold between flushes
pub const MAX_DEFERRED: usize = 8;

/// Default time between redraws
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(100);

/// Handle of a scene registered with a [`crate::Navigator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SceneId(pub(crate) usize);

impl SceneId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// System states that end the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Terminal {
    Shutdown,
    Reboot,
    Exit,
}

/// Per-scene display options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    /// Reset the lines and render buffer before each draw
    pub clear: bool,
    /// Draw through the text compositor rather than raw bytes
    pub line_mode: bool,
    /// Send the buffer to the panel after each draw
    pub flush: bool,
    /// Time between redraws; `None` redraws only on demand
    pub refresh_interval: Option<Duration>,
    /// Keep private state across entries
    pub keep_state: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            clear: true,
            line_mode: true,
            flush: true,
            refresh_interval: Some(DEFAULT_REFRESH),
            keep_state: false,
        }
    }
}

/// Init and finish hook
pub type StateHook = Box<dyn FnMut(&mut SceneState) -> Option<Intent>>;

/// Draw hook
pub type DrawHook = Box<dyn FnMut(&mut SceneState, &mut Canvas<'_>) -> Option<Intent>>;

/// Catch-all key handler
pub type KeyHook = Box<dyn FnMut(Key, &mut SceneState) -> Option<Intent>>;

/// Entry of a scene's key table
pub enum KeyAction {
    /// Consume the key and stay
    Ignore,
    /// Go straight to a scene
    Goto(SceneId),
    /// A fixed intent
    Intent(Intent),
    /// Compute the intent from the scene state
    Handler(StateHook),
}

impl KeyAction {
    pub fn handler(f: impl FnMut(&mut SceneState) -> Option<Intent> + 'static) -> Self {
        KeyAction::Handler(Box::new(f))
    }
}

impl fmt::Debug for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::Ignore => f.write_str("Ignore"),
            KeyAction::Goto(id) => f.debug_tuple("Goto").field(id).finish(),
            KeyAction::Intent(intent) => f.debug_tuple("Intent").field(intent).finish(),
            KeyAction::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// A screen template
pub struct Scene {
    name: &'static str,
    terminal: Option<Terminal>,
    options: SceneOptions,
    frame: u32,
    state: SceneState,
    deferred: HVec<Command, MAX_DEFERRED>,
    keymap: BTreeMap<Key, KeyAction>,
    keyfunc: Option<KeyHook>,
    init_hook: Option<StateHook>,
    draw_hook: Option<DrawHook>,
    finish_hook: Option<StateHook>,
}

impl Scene {
    /// A scene with default options and no hooks
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            terminal: None,
            options: SceneOptions::default(),
            frame: 0,
            state: SceneState::new(),
            deferred: HVec::new(),
            keymap: BTreeMap::new(),
            keyfunc: None,
            init_hook: None,
            draw_hook: None,
            finish_hook: None,
        }
    }

    /// A terminal scene; entering it ends the run loop
    pub fn terminal(name: &'static str, kind: Terminal) -> Self {
        let mut scene = Self::new(name);
        scene.terminal = Some(kind);
        scene.options.refresh_interval = None;
        scene
    }

    pub fn with_options(mut self, options: SceneOptions) -> Self {
        self.options = options;
        self
    }

    pub fn clear(mut self, clear: bool) -> Self {
        self.options.clear = clear;
        self
    }

    pub fn line_mode(mut self, line_mode: bool) -> Self {
        self.options.line_mode = line_mode;
        self
    }

    pub fn flush(mut self, flush: bool) -> Self {
        self.options.flush = flush;
        self
    }

    /// Redraw every `interval`; zero means on demand only
    pub fn refresh_every(mut self, interval: Duration) -> Self {
        self.options.refresh_interval = if interval.is_zero() {
            None
        } else {
            Some(interval)
        };
        self
    }

    pub fn keep_state(mut self, keep_state: bool) -> Self {
        self.options.keep_state = keep_state;
        self
    }

    pub fn on_init(mut self, f: impl FnMut(&mut SceneState) -> Option<Intent> + 'static) -> Self {
        self.init_hook = Some(Box::new(f));
        self
    }

    pub fn on_draw(
        mut self,
        f: impl FnMut(&mut SceneState, &mut Canvas<'_>) -> Option<Intent> + 'static,
    ) -> Self {
        self.draw_hook = Some(Box::new(f));
        self
    }

    pub fn on_finish(mut self, f: impl FnMut(&mut SceneState) -> Option<Intent> + 'static) -> Self {
        self.finish_hook = Some(Box::new(f));
        self
    }

    /// Catch-all key handler; takes priority over the key table
    pub fn on_key(mut self, f: impl FnMut(Key, &mut SceneState) -> Option<Intent> + 'static) -> Self {
        self.keyfunc = Some(Box::new(f));
        self
    }

    /// Add a key table entry
    pub fn key(mut self, key: Key, action: KeyAction) -> Self {
        self.bind(key, action);
        self
    }

    /// Add or replace a key table entry in place
    pub fn bind(&mut self, key: Key, action: KeyAction) {
        self.keymap.insert(key, action);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn terminal_kind(&self) -> Option<Terminal> {
        self.terminal
    }

    pub fn options(&self) -> SceneOptions {
        self.options
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    /// Number of queued deferred commands
    pub fn pending_commands(&self) -> usize {
        self.deferred.len()
    }

    /// Enter the scene
    ///
    /// Resets the frame counter (when `reset_frame`) and the deferred
    /// queue, clears private state unless `keep_state`, then runs the init
    /// hook.
    pub fn init(&mut self, reset_frame: bool) -> Result<Target, ConfigError> {
        if reset_frame {
            self.frame = 0;
        }
        self.deferred.clear();
        if !self.options.keep_state {
            self.state.clear();
        }

        let intent = match self.init_hook.as_mut() {
            Some(hook) => hook(&mut self.state),
            None => None,
        };
        self.apply(intent)
    }

    /// Run the draw hook
    ///
    /// A deferred `addframe 1` is queued ahead of whatever the hook
    /// returns, so a deferred `setframe` from the hook still wins.
    pub fn draw(&mut self, canvas: &mut Canvas<'_>) -> Result<Target, ConfigError> {
        self.defer(Command::AddFrame(1))?;

        let intent = match self.draw_hook.as_mut() {
            Some(hook) => hook(&mut self.state, canvas),
            None => None,
        };
        self.apply(intent)
    }

    /// Run the finish hook
    ///
    /// Commands are applied; a transition request is ignored since the
    /// navigator is already leaving this scene.
    pub fn finish(&mut self) -> Result<(), ConfigError> {
        let intent = match self.finish_hook.as_mut() {
            Some(hook) => hook(&mut self.state),
            None => None,
        };
        let target = self.apply(intent)?;
        if !target.is_stay() {
            log::warn!("scene '{}': finish hook transition ignored", self.name);
        }
        Ok(())
    }

    /// Dispatch a key press
    pub fn handle_key(&mut self, key: Key) -> Result<Target, ConfigError> {
        let intent = if let Some(keyfunc) = self.keyfunc.as_mut() {
            keyfunc(key, &mut self.state)
        } else {
            match self.keymap.get_mut(&key) {
                Some(KeyAction::Ignore) => None,
                Some(KeyAction::Goto(id)) => Some(Intent::goto(*id)),
                Some(KeyAction::Intent(intent)) => Some(intent.clone()),
                Some(KeyAction::Handler(handler)) => handler(&mut self.state),
                None => {
                    return Err(ConfigError::MissingKeyHandler {
                        scene: self.name,
                        key,
                    })
                }
            }
        };
        self.apply(intent)
    }

    /// Apply an intent's commands and hand back its target
    pub fn apply(&mut self, intent: Option<Intent>) -> Result<Target, ConfigError> {
        let Some(intent) = intent else {
            return Ok(Target::Stay);
        };
        for scheduled in intent.commands {
            match scheduled.timing {
                Timing::Immediate => scheduled.command.apply(&mut self.frame),
                Timing::Deferred => self.defer(scheduled.command)?,
            }
        }
        Ok(intent.target)
    }

    /// Apply and empty the deferred queue
    pub fn run_deferred(&mut self) {
        if self.deferred.is_empty() {
            return;
        }
        log::trace!("scene '{}': {} deferred", self.name, self.deferred.len());
        for command in self.deferred.iter() {
            command.apply(&mut self.frame);
        }
        self.deferred.clear();
    }

    fn defer(&mut self, command: Command) -> Result<(), ConfigError> {
        self.deferred
            .push(command)
            .map_err(|_| ConfigError::DeferredQueueFull)
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("terminal", &self.terminal)
            .field("frame", &self.frame)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
