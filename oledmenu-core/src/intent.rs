//! Transition intents
//!
//! What a hook asks the navigator to do once it returns: where to go next
//! and which frame commands to run on the way.

use alloc::vec::Vec;

use crate::command::{Command, Scheduled};
use crate::scene::SceneId;

/// Where navigation goes after a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Remain on the current scene
    #[default]
    Stay,
    /// Leave the current scene for another
    Replace(SceneId),
    /// Suspend the current scene and enter another
    Push(SceneId),
    /// Discard the current scene and resume the suspended one
    Pop,
    /// Finish the current and every suspended scene, then enter another
    Reset(SceneId),
}

impl Target {
    pub fn is_stay(&self) -> bool {
        matches!(self, Target::Stay)
    }
}

/// A target plus the commands issued alongside it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Intent {
    pub target: Target,
    pub commands: Vec<Scheduled>,
}

impl Intent {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            commands: Vec::new(),
        }
    }

    /// No transition
    pub fn stay() -> Self {
        Self::new(Target::Stay)
    }

    pub fn goto(scene: SceneId) -> Self {
        Self::new(Target::Replace(scene))
    }

    pub fn push(scene: SceneId) -> Self {
        Self::new(Target::Push(scene))
    }

    pub fn pop() -> Self {
        Self::new(Target::Pop)
    }

    /// Leave a pushed sub-flow for `scene`, dropping the navigation stack
    pub fn reset(scene: SceneId) -> Self {
        Self::new(Target::Reset(scene))
    }

    /// Append a command
    pub fn with(mut self, command: Scheduled) -> Self {
        self.commands.push(command);
        self
    }

    /// Append an immediate command
    pub fn now(self, command: Command) -> Self {
        self.with(command.immediate())
    }

    /// Append a deferred command
    pub fn later(self, command: Command) -> Self {
        self.with(command.deferred())
    }
}

impl From<Target> for Intent {
    fn from(target: Target) -> Self {
        Self::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Timing;

    #[test]
    fn test_builder() {
        let intent = Intent::stay()
            .now(Command::SetFrame(0))
            .later(Command::AddFrame(2));

        assert!(intent.target.is_stay());
        assert_eq!(intent.commands.len(), 2);
        assert_eq!(intent.commands[0].timing, Timing::Immediate);
        assert_eq!(intent.commands[1].timing, Timing::Deferred);
    }

    #[test]
    fn test_default_is_stay() {
        assert_eq!(Intent::default(), Intent::stay());
        assert_eq!(Intent::from(Target::Pop), Intent::pop());
    }
}
