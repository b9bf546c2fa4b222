//! Engine errors
//!
//! Configuration errors are wiring bugs and abort the run loop. Transport
//! and input errors come from the hardware and are carried through
//! unchanged so the caller can report them.

use core::fmt;

use heapless::String;

use crate::input::Key;
use crate::scene::SceneId;

/// Longest command name kept for error reporting
pub const MAX_COMMAND_NAME: usize = 16;

/// Wiring errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Command name not in the vocabulary
    UnknownCommand(String<MAX_COMMAND_NAME>),
    /// Command text with a missing or unparsable argument
    MalformedCommand,
    /// Key pressed on a scene with no handler for it
    MissingKeyHandler { scene: &'static str, key: Key },
    /// Pop requested with nothing suspended
    EmptyNavigationStack,
    /// Init hooks kept requesting transitions
    TransitionChainTooDeep,
    /// Too many deferred commands queued on one scene
    DeferredQueueFull,
    /// Scene id not registered with the navigator
    UnknownScene(SceneId),
    /// Navigator used before a start scene was entered
    NotStarted,
}

impl ConfigError {
    /// Build an [`ConfigError::UnknownCommand`], truncating long names
    pub fn unknown_command(name: &str) -> Self {
        let mut kept = String::new();
        for ch in name.chars() {
            if kept.push(ch).is_err() {
                break;
            }
        }
        ConfigError::UnknownCommand(kept)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownCommand(name) => write!(f, "unknown command '{}'", name),
            ConfigError::MalformedCommand => f.write_str("malformed command"),
            ConfigError::MissingKeyHandler { scene, key } => {
                write!(f, "scene '{}' has no handler for key {}", scene, key.0)
            }
            ConfigError::EmptyNavigationStack => f.write_str("pop with empty navigation stack"),
            ConfigError::TransitionChainTooDeep => f.write_str("transition chain too deep"),
            ConfigError::DeferredQueueFull => f.write_str("deferred command queue full"),
            ConfigError::UnknownScene(id) => write!(f, "unknown scene id {}", id.index()),
            ConfigError::NotStarted => f.write_str("navigator not started"),
        }
    }
}

/// Anything that stops the run loop
///
/// `D` is the display transport error, `I` the button input error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError<D, I> {
    Config(ConfigError),
    Display(D),
    Input(I),
}

impl<D, I> From<ConfigError> for EngineError<D, I> {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl<D: fmt::Debug, I: fmt::Debug> fmt::Display for EngineError<D, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "configuration error: {}", e),
            EngineError::Display(e) => write!(f, "display error: {:?}", e),
            EngineError::Input(e) => write!(f, "input error: {:?}", e),
        }
    }
}
