//! Scene navigator
//!
//! Owns every scene (an arena indexed by [`SceneId`]), the current scene
//! and the navigation stack. Transition rules:
//!
//! - `Replace`: finish the current scene, enter the new one
//! - `Push`: suspend the current scene (no finish), enter the new one
//! - `Pop`: finish the current scene and resume the suspended one with its
//!   frame counter and state untouched; init does not run again
//! - `Reset`: finish the current scene and every suspended one (top
//!   first), empty the stack, enter the new one
//!
//! Entering a scene runs its init hook and then its deferred commands. If
//! init asks for another transition it is followed, up to
//! [`MAX_CHAIN_DEPTH`] steps.

use alloc::vec::Vec;

use oledmenu_display::{Canvas, LineSet, RenderBuffer};

use crate::error::ConfigError;
use crate::input::Key;
use crate::intent::Target;
use crate::scene::{KeyAction, Scene, SceneId, Terminal};

/// Longest chain of transitions one request may trigger
pub const MAX_CHAIN_DEPTH: usize = 16;

/// Scene arena plus navigation state
#[derive(Debug, Default)]
pub struct Navigator {
    scenes: Vec<Scene>,
    current: Option<SceneId>,
    stack: Vec<SceneId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene
    pub fn add(&mut self, scene: Scene) -> SceneId {
        self.scenes.push(scene);
        SceneId(self.scenes.len() - 1)
    }

    /// Add a key table entry to a registered scene
    ///
    /// Lets scenes refer to each other regardless of registration order.
    pub fn bind(&mut self, id: SceneId, key: Key, action: KeyAction) -> Result<(), ConfigError> {
        self.scene_mut(id)?.bind(key, action);
        Ok(())
    }

    pub fn scene(&self, id: SceneId) -> Result<&Scene, ConfigError> {
        self.scenes.get(id.0).ok_or(ConfigError::UnknownScene(id))
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Result<&mut Scene, ConfigError> {
        self.scenes.get_mut(id.0).ok_or(ConfigError::UnknownScene(id))
    }

    /// Look a scene up by name
    pub fn find(&self, name: &str) -> Option<SceneId> {
        self.scenes
            .iter()
            .position(|s| s.name() == name)
            .map(SceneId)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn current(&self) -> Option<SceneId> {
        self.current
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.and_then(|id| self.scenes.get(id.0))
    }

    /// Number of suspended scenes
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Terminal kind of the current scene, if it is one
    pub fn terminal(&self) -> Option<Terminal> {
        self.current_scene().and_then(Scene::terminal_kind)
    }

    /// Enter the first scene
    pub fn start(&mut self, initial: SceneId) -> Result<(), ConfigError> {
        self.scene(initial)?;
        self.current = None;
        self.stack.clear();
        log::info!("starting at '{}'", self.scene(initial)?.name());
        let next = self.enter(initial)?;
        self.resolve(next)
    }

    /// Act on a target, following any transitions init hooks request
    pub fn resolve(&mut self, target: Target) -> Result<(), ConfigError> {
        let mut target = target;
        let mut depth = 0;
        while !target.is_stay() {
            depth += 1;
            if depth > MAX_CHAIN_DEPTH {
                return Err(ConfigError::TransitionChainTooDeep);
            }
            target = self.step(target)?;
        }
        Ok(())
    }

    fn step(&mut self, target: Target) -> Result<Target, ConfigError> {
        match target {
            Target::Stay => Ok(Target::Stay),
            Target::Replace(id) => {
                self.scene(id)?;
                let current = self.current.ok_or(ConfigError::NotStarted)?;
                self.scenes[current.0].finish()?;
                self.enter(id)
            }
            Target::Push(id) => {
                self.scene(id)?;
                let current = self.current.ok_or(ConfigError::NotStarted)?;
                self.stack.push(current);
                self.enter(id)
            }
            Target::Pop => {
                let previous = self.stack.pop().ok_or(ConfigError::EmptyNavigationStack)?;
                let current = self.current.ok_or(ConfigError::NotStarted)?;
                self.scenes[current.0].finish()?;
                self.current = Some(previous);
                log::debug!(
                    "'{}' -> '{}' (resume)",
                    self.scenes[current.0].name(),
                    self.scenes[previous.0].name()
                );
                Ok(Target::Stay)
            }
            Target::Reset(id) => {
                self.scene(id)?;
                let current = self.current.ok_or(ConfigError::NotStarted)?;
                self.scenes[current.0].finish()?;
                while let Some(suspended) = self.stack.pop() {
                    self.scenes[suspended.0].finish()?;
                }
                self.enter(id)
            }
        }
    }

    fn enter(&mut self, id: SceneId) -> Result<Target, ConfigError> {
        if let Some(from) = self.current_scene() {
            log::debug!("'{}' -> '{}'", from.name(), self.scenes[id.0].name());
        }
        self.current = Some(id);
        let scene = &mut self.scenes[id.0];
        let next = scene.init(true)?;
        scene.run_deferred();
        Ok(next)
    }

    /// Pass a key press to the current scene and act on the result
    pub fn dispatch_key(&mut self, key: Key) -> Result<(), ConfigError> {
        let current = self.current.ok_or(ConfigError::NotStarted)?;
        log::debug!("{} on '{}'", key, self.scenes[current.0].name());
        let target = self.scenes[current.0].handle_key(key)?;
        self.resolve(target)
    }

    /// Run the current scene's draw hook into `lines` / `buffer`
    ///
    /// Returns the hook's target without acting on it; the caller resolves
    /// it once the frame is out. Terminal scenes are not drawn.
    pub fn tick_draw(
        &mut self,
        lines: &mut LineSet,
        buffer: &mut RenderBuffer,
    ) -> Result<Target, ConfigError> {
        let current = self.current.ok_or(ConfigError::NotStarted)?;
        let scene = &mut self.scenes[current.0];
        if scene.terminal_kind().is_some() {
            return Ok(Target::Stay);
        }
        let mut canvas = Canvas::new(lines, buffer, scene.frame());
        scene.draw(&mut canvas)
    }

    /// Apply the current scene's deferred commands
    pub fn flush_deferred(&mut self) {
        if let Some(current) = self.current {
            self.scenes[current.0].run_deferred();
        }
    }

    /// Finish the current scene and every suspended one, top first
    ///
    /// Used on the way out of the run loop; errors are logged, not
    /// returned, so every scene gets its finish hook.
    pub fn shutdown(&mut self) {
        let current = self.current.take();
        let suspended = core::mem::take(&mut self.stack);
        for id in current.into_iter().chain(suspended.into_iter().rev()) {
            let scene = &mut self.scenes[id.0];
            if let Err(e) = scene.finish() {
                log::warn!("finish of '{}' failed: {}", scene.name(), e);
            }
        }
        // Keep the final scene visible to callers asking for the terminal kind
        self.current = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::intent::Intent;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    fn counting(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Scene {
        let init_log = log.clone();
        let finish_log = log.clone();
        Scene::new(name)
            .on_init(move |_| {
                init_log.borrow_mut().push(format!("init {}", name));
                None
            })
            .on_finish(move |_| {
                finish_log.borrow_mut().push(format!("finish {}", name));
                None
            })
    }

    #[test]
    fn test_start_runs_init() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let a = nav.add(counting("a", &log));
        nav.start(a).unwrap();
        assert_eq!(nav.current(), Some(a));
        assert_eq!(*log.borrow(), vec!["init a"]);
    }

    #[test]
    fn test_replace_finishes_then_inits() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let a = nav.add(counting("a", &log));
        let b = nav.add(counting("b", &log));
        nav.bind(a, Key(1), KeyAction::Goto(b)).unwrap();

        nav.start(a).unwrap();
        nav.dispatch_key(Key(1)).unwrap();

        assert_eq!(nav.current(), Some(b));
        assert_eq!(*log.borrow(), vec!["init a", "finish a", "init b"]);
    }

    #[test]
    fn test_push_pop_resumes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let a = nav.add(counting("a", &log).keep_state(false));
        let b = nav.add(counting("b", &log));
        nav.bind(a, Key(1), KeyAction::Intent(Intent::push(b))).unwrap();
        nav.bind(b, Key(3), KeyAction::Intent(Intent::pop())).unwrap();

        nav.start(a).unwrap();
        nav.scene_mut(a).unwrap().state_mut().insert("cursor", 2usize);
        nav.scene_mut(a)
            .unwrap()
            .apply(Some(Intent::stay().now(Command::SetFrame(11))))
            .unwrap();

        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.current(), Some(b));
        assert_eq!(nav.stack_depth(), 1);

        nav.dispatch_key(Key(3)).unwrap();
        assert_eq!(nav.current(), Some(a));
        assert_eq!(nav.stack_depth(), 0);

        let scene = nav.scene(a).unwrap();
        assert_eq!(scene.frame(), 11);
        assert_eq!(scene.state().get::<usize>("cursor"), Some(&2));
        assert_eq!(*log.borrow(), vec!["init a", "init b", "finish b"]);
    }

    #[test]
    fn test_reset_unwinds_stack() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let a = nav.add(counting("a", &log));
        let b = nav.add(counting("b", &log));
        let c = nav.add(counting("c", &log));
        let d = nav.add(counting("d", &log));
        nav.bind(a, Key(1), KeyAction::Intent(Intent::push(b))).unwrap();
        nav.bind(b, Key(1), KeyAction::Intent(Intent::push(c))).unwrap();
        nav.bind(c, Key(1), KeyAction::Intent(Intent::reset(d))).unwrap();
        nav.bind(d, Key(1), KeyAction::Goto(a)).unwrap();

        nav.start(a).unwrap();
        for _ in 0..3 {
            nav.dispatch_key(Key(1)).unwrap();
            nav.dispatch_key(Key(1)).unwrap();
            assert_eq!(nav.stack_depth(), 2);
            log.borrow_mut().clear();

            nav.dispatch_key(Key(1)).unwrap();
            assert_eq!(nav.current(), Some(d));
            assert_eq!(nav.stack_depth(), 0);
            assert_eq!(
                *log.borrow(),
                vec!["finish c", "finish b", "finish a", "init d"]
            );
            nav.dispatch_key(Key(1)).unwrap();
        }

        log.borrow_mut().clear();
        nav.shutdown();
        assert_eq!(*log.borrow(), vec!["finish a"]);
    }

    #[test]
    fn test_reset_to_unknown_scene() {
        let mut nav = Navigator::new();
        let a = nav.add(Scene::new("a").key(Key(1), KeyAction::Intent(Intent::reset(SceneId(7)))));
        nav.start(a).unwrap();
        assert_eq!(nav.dispatch_key(Key(1)), Err(ConfigError::UnknownScene(SceneId(7))));
        assert_eq!(nav.current(), Some(a));
    }

    #[test]
    fn test_pop_empty_stack() {
        let mut nav = Navigator::new();
        let a = nav.add(Scene::new("a").key(Key(1), KeyAction::Intent(Intent::pop())));
        nav.start(a).unwrap();
        assert_eq!(nav.dispatch_key(Key(1)), Err(ConfigError::EmptyNavigationStack));
    }

    #[test]
    fn test_init_chain_followed() {
        let mut nav = Navigator::new();
        let c = nav.add(Scene::new("c"));
        let b = nav.add(Scene::new("b").on_init(move |_| Some(Intent::goto(c))));
        let a = nav.add(Scene::new("a").key(Key(1), KeyAction::Goto(b)));
        nav.start(a).unwrap();
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.current(), Some(c));
    }

    #[test]
    fn test_self_chain_is_config_error() {
        let mut nav = Navigator::new();
        let id = SceneId(0);
        nav.add(Scene::new("loop").on_init(move |_| Some(Intent::goto(id))));
        assert_eq!(nav.start(id), Err(ConfigError::TransitionChainTooDeep));
    }

    #[test]
    fn test_unknown_scene() {
        let mut nav = Navigator::new();
        let a = nav.add(Scene::new("a").key(Key(1), KeyAction::Goto(SceneId(7))));
        assert_eq!(nav.start(SceneId(3)), Err(ConfigError::UnknownScene(SceneId(3))));
        nav.start(a).unwrap();
        assert_eq!(nav.dispatch_key(Key(1)), Err(ConfigError::UnknownScene(SceneId(7))));
        assert_eq!(nav.current(), Some(a));
    }

    #[test]
    fn test_not_started() {
        let mut nav = Navigator::new();
        nav.add(Scene::new("a"));
        assert_eq!(nav.dispatch_key(Key(1)), Err(ConfigError::NotStarted));
    }

    #[test]
    fn test_init_deferred_applied_on_entry() {
        let mut nav = Navigator::new();
        let a = nav.add(Scene::new("a").on_init(|_| Some(Intent::stay().later(Command::SetFrame(3)))));
        nav.start(a).unwrap();
        assert_eq!(nav.scene(a).unwrap().frame(), 3);
    }

    #[test]
    fn test_terminal_not_drawn() {
        let mut nav = Navigator::new();
        let bye = nav.add(Scene::terminal("exit", Terminal::Exit));
        nav.start(bye).unwrap();
        assert_eq!(nav.terminal(), Some(Terminal::Exit));

        let g = oledmenu_display::Geometry::FULL_PANEL;
        let mut lines = LineSet::new(g);
        let mut buffer = RenderBuffer::new(g.rows, g.row_len());
        assert_eq!(nav.tick_draw(&mut lines, &mut buffer), Ok(Target::Stay));
        assert_eq!(nav.scene(bye).unwrap().pending_commands(), 0);
    }

    #[test]
    fn test_shutdown_finishes_stack() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let a = nav.add(counting("a", &log));
        let b = nav.add(counting("b", &log));
        let c = nav.add(counting("c", &log));
        nav.bind(a, Key(1), KeyAction::Intent(Intent::push(b))).unwrap();
        nav.bind(b, Key(1), KeyAction::Intent(Intent::push(c))).unwrap();

        nav.start(a).unwrap();
        nav.dispatch_key(Key(1)).unwrap();
        nav.dispatch_key(Key(1)).unwrap();
        log.borrow_mut().clear();

        nav.shutdown();
        assert_eq!(*log.borrow(), vec!["finish c", "finish b", "finish a"]);
        assert_eq!(nav.stack_depth(), 0);
        assert_eq!(nav.current(), Some(c));
    }

    #[test]
    fn test_find_by_name() {
        let mut nav = Navigator::new();
        nav.add(Scene::new("a"));
        let b = nav.add(Scene::new("b"));
        assert_eq!(nav.find("b"), Some(b));
        assert_eq!(nav.find("z"), None);
    }
}
