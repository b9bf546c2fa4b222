//! Saved connection profiles
//!
//! Rows are `cancel`, one `"<0|1> <name>"` per profile (down first, then by
//! name), and `new connection`.

use std::rc::Rc;
use std::time::Duration;

use oledmenu_core::{
    Command, ConfigError, Intent, Key, KeyAction, Navigator, Scene, SceneState,
};

use super::{draw_list, select_next, selected, Menu, SELECTED};
use crate::network::{NetworkManager, SavedConnection};

const CONNECTIONS: &str = "connections";

fn load(network: &dyn NetworkManager) -> Vec<SavedConnection> {
    let mut conns = network.saved_connections().unwrap_or_default();
    conns.sort_by(|a, b| (a.up, &a.name).cmp(&(b.up, &b.name)));
    conns
}

fn connections(state: &SceneState) -> &[SavedConnection] {
    state
        .get::<Vec<SavedConnection>>(CONNECTIONS)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn options(conns: &[SavedConnection]) -> Vec<String> {
    let mut options = Vec::with_capacity(conns.len() + 2);
    options.push("cancel".to_string());
    options.extend(
        conns
            .iter()
            .map(|conn| format!("{} {}", u8::from(conn.up), conn.name)),
    );
    options.push("new connection".to_string());
    options
}

pub(super) fn scene(network: Rc<dyn NetworkManager>) -> Scene {
    Scene::new("connections")
        .refresh_every(Duration::from_millis(300))
        .on_init(move |state| {
            state.insert(CONNECTIONS, load(network.as_ref()));
            state.insert(SELECTED, 0usize);
            None
        })
        .on_draw(|state, canvas| {
            let rows = canvas.rows();
            draw_list(canvas, &options(connections(state)), selected(state), rows);
            None
        })
}

pub(super) fn bind(
    nav: &mut Navigator,
    menu: &Menu,
    network: Rc<dyn NetworkManager>,
) -> Result<(), ConfigError> {
    let (splash, access_points) = (menu.splash, menu.access_points);
    let activate = move |state: &mut SceneState| {
        let conns = connections(state);
        let cursor = selected(state);
        if cursor == 0 {
            return Some(Intent::goto(splash));
        }
        if cursor == conns.len() + 1 {
            return Some(Intent::push(access_points));
        }
        let conn = conns.get(cursor - 1)?.clone();
        let status = network.set_connection(&conn.uuid, !conn.up);
        if !status.success() {
            log::warn!("toggling '{}' failed: {}", conn.name, status.message);
        }

        // Keep the cursor on the same profile after the re-sort
        let reloaded = load(network.as_ref());
        let cursor = reloaded
            .iter()
            .position(|c| c.uuid == conn.uuid)
            .map_or(0, |index| index + 1);
        state.insert(CONNECTIONS, reloaded);
        state.insert(SELECTED, cursor);
        Some(Intent::stay().now(Command::SetFrame(0)))
    };

    let id = menu.connections;
    nav.bind(id, Key(1), KeyAction::handler(activate))?;
    nav.bind(
        id,
        Key(2),
        KeyAction::handler(|state| {
            let count = connections(state).len() + 2;
            select_next(state, count);
            Some(Intent::stay().now(Command::SetFrame(0)))
        }),
    )?;
    nav.bind(id, Key(3), KeyAction::Goto(menu.power))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::testing::{conn, render, services, texts, FakeNetwork};
    use crate::scenes::build;

    fn setup() -> (Rc<FakeNetwork>, Navigator, Menu) {
        let network = Rc::new(FakeNetwork::default());
        *network.connections.borrow_mut() = vec![
            conn("office", "u-1", true),
            conn("home", "u-2", false),
            conn("cafe", "u-3", false),
        ];
        let (mut nav, menu) = build(services(network.clone(), Rc::default())).unwrap();
        nav.start(menu.connections).unwrap();
        (network, nav, menu)
    }

    #[test]
    fn test_rows_sorted_down_first() {
        let (_network, mut nav, _menu) = setup();
        assert_eq!(
            texts(&mut nav),
            vec!["cancel", "0 cafe", "0 home", "1 office", "new connection"]
        );
    }

    #[test]
    fn test_cursor_wraps_and_restarts_scroll() {
        let (_network, mut nav, menu) = setup();
        texts(&mut nav);
        texts(&mut nav);
        nav.dispatch_key(Key(2)).unwrap();
        let scene = nav.scene(menu.connections).unwrap();
        assert_eq!(scene.frame(), 0);
        assert_eq!(selected(scene.state()), 1);

        for _ in 0..4 {
            nav.dispatch_key(Key(2)).unwrap();
        }
        assert_eq!(selected(nav.scene(menu.connections).unwrap().state()), 0);
    }

    #[test]
    fn test_selected_row_is_highlighted() {
        let (_network, mut nav, _menu) = setup();
        nav.dispatch_key(Key(2)).unwrap();
        nav.dispatch_key(Key(2)).unwrap();
        let rows = render(&mut nav);
        assert_eq!(rows[2], ("0 home".to_string(), true));
        assert!(!rows[0].1);
    }

    #[test]
    fn test_toggle_keeps_cursor_on_profile() {
        let (network, mut nav, menu) = setup();
        nav.dispatch_key(Key(2)).unwrap();
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(*network.requests.borrow(), vec!["up u-3"]);
        assert_eq!(nav.current(), Some(menu.connections));
        assert_eq!(
            texts(&mut nav),
            vec!["cancel", "0 home", "1 cafe", "1 office", "new connection"]
        );
        assert_eq!(selected(nav.scene(menu.connections).unwrap().state()), 2);
    }

    #[test]
    fn test_cancel_and_new_connection() {
        let (_network, mut nav, menu) = setup();
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.current(), Some(menu.splash));

        nav.start(menu.connections).unwrap();
        for _ in 0..4 {
            nav.dispatch_key(Key(2)).unwrap();
        }
        nav.dispatch_key(Key(1)).unwrap();
        assert_eq!(nav.current(), Some(menu.access_points));
        assert_eq!(nav.stack_depth(), 1);
    }
}
