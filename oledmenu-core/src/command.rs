//! Frame commands
//!
//! Hooks adjust their scene's frame counter by returning commands with
//! their intent. An immediate command applies as soon as the intent is
//! processed; a deferred one is queued on the scene and applied after the
//! current frame has been rendered with the old counter.
//!
//! The textual form used in logs and wiring tables is the command name
//! followed by its argument, with a `post_` prefix marking deferred
//! commands: `setframe 0`, `post_addframe 1`.

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;

/// Prefix marking a deferred command in text form
pub const DEFERRED_PREFIX: &str = "post_";

/// A frame counter mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the counter to the given value
    SetFrame(u32),
    /// Add the given value to the counter (wrapping)
    AddFrame(u32),
}

impl Command {
    /// Apply to a frame counter
    pub fn apply(self, frame: &mut u32) {
        match self {
            Command::SetFrame(n) => *frame = n,
            Command::AddFrame(n) => *frame = frame.wrapping_add(n),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SetFrame(_) => "setframe",
            Command::AddFrame(_) => "addframe",
        }
    }

    pub fn immediate(self) -> Scheduled {
        Scheduled {
            command: self,
            timing: Timing::Immediate,
        }
    }

    pub fn deferred(self) -> Scheduled {
        Scheduled {
            command: self,
            timing: Timing::Deferred,
        }
    }
}

/// When a command takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timing {
    /// While the intent is being processed
    Immediate,
    /// After the scene's next render
    Deferred,
}

/// A command together with its timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scheduled {
    pub command: Command,
    pub timing: Timing,
}

impl FromStr for Scheduled {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let word = parts.next().ok_or(ConfigError::MalformedCommand)?;

        let (name, timing) = match word.strip_prefix(DEFERRED_PREFIX) {
            Some(rest) => (rest, Timing::Deferred),
            None => (word, Timing::Immediate),
        };

        let constructor: fn(u32) -> Command = match name {
            "setframe" => Command::SetFrame,
            "addframe" => Command::AddFrame,
            _ => return Err(ConfigError::unknown_command(name)),
        };

        let arg = parts
            .next()
            .and_then(|a| a.parse::<u32>().ok())
            .ok_or(ConfigError::MalformedCommand)?;
        if parts.next().is_some() {
            return Err(ConfigError::MalformedCommand);
        }

        Ok(Scheduled {
            command: constructor(arg),
            timing,
        })
    }
}

impl fmt::Display for Scheduled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.timing == Timing::Deferred {
            f.write_str(DEFERRED_PREFIX)?;
        }
        let arg = match self.command {
            Command::SetFrame(n) | Command::AddFrame(n) => n,
        };
        write!(f, "{} {}", self.command.name(), arg)
    }
}
