//! Shutdown / reboot / exit confirmation

use oledmenu_core::{ConfigError, Intent, Key, KeyAction, Navigator, Scene, SceneId};
use oledmenu_display::LogicalLine;

use super::{select_next, selected, Menu, SELECTED};

const OPTIONS: [&str; 4] = ["cancel", "shutdown", "reboot", "exit"];

pub(super) fn scene() -> Scene {
    Scene::new("power")
        .on_init(|state| {
            state.insert(SELECTED, 0usize);
            None
        })
        .on_draw(|state, canvas| {
            let cursor = selected(state);
            canvas.putline("");
            for (index, option) in OPTIONS.iter().enumerate() {
                canvas.put(LogicalLine::new(*option).inverted(index == cursor));
            }
            canvas.putline("");
            canvas.putline("F1: Confirm");
            canvas.putline("F3: Cycle opts");
            None
        })
}

pub(super) fn bind(nav: &mut Navigator, menu: &Menu) -> Result<(), ConfigError> {
    let targets: [SceneId; 4] = [menu.splash, menu.shutdown, menu.reboot, menu.exit];
    let id = menu.power;
    nav.bind(
        id,
        Key(1),
        KeyAction::handler(move |state| {
            let target = targets.get(selected(state)).copied()?;
            Some(Intent::goto(target))
        }),
    )?;
    nav.bind(id, Key(2), KeyAction::Goto(menu.connections))?;
    nav.bind(
        id,
        Key(3),
        KeyAction::handler(|state| {
            select_next(state, OPTIONS.len());
            None
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::build;
    use crate::scenes::testing::{render, services, FakeNetwork};
    use oledmenu_core::Terminal;
    use std::rc::Rc;

    fn setup() -> (Navigator, Menu) {
        let (mut nav, menu) = build(services(Rc::new(FakeNetwork::default()), Rc::default())).unwrap();
        nav.start(menu.power).unwrap();
        (nav, menu)
    }

    #[test]
    fn test_layout() {
        let (mut nav, _menu) = setup();
        let rows = render(&mut nav);
        let texts: Vec<&str> = rows.iter().map(|(text, _)| text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["", "cancel", "shutdown", "reboot", "exit", "", "F1: Confirm", "F3: Cycle opts"]
        );
        assert!(rows[1].1);
        assert!(!rows[2].1);
    }

    #[test]
    fn test_cancel_returns_to_splash() {
        let (mut nav, menu) = setup();
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.current(), Some(menu.splash));
    }

    #[test]
    fn test_cycle_then_confirm_reboot() {
        let (mut nav, _menu) = setup();
        nav.dispatch_key(Key(3)).unwrap();
        nav.dispatch_key(Key(3)).unwrap();
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.terminal(), Some(Terminal::Reboot));
    }

    #[test]
    fn test_cycle_wraps_to_cancel() {
        let (mut nav, menu) = setup();
        for _ in 0..OPTIONS.len() {
            nav.dispatch_key(Key(3)).unwrap();
        }
        assert_eq!(selected(nav.scene(menu.power).unwrap().state()), 0);
        nav.dispatch_key(Key(2)).unwrap();
        assert_eq!(nav.current(), Some(menu.connections));
    }
}
