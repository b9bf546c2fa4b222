//! The menu shipped with the daemon
//!
//! - `splash`: random noise, the idle screen
//! - `status`: addresses and host metrics
//! - `connections`: saved network profiles, toggled with button 1
//! - `access_points`: visible networks to join
//! - `password`: passphrase entry for the chosen network
//! - `power`: shutdown, reboot, exit
//!
//! Buttons 1-3 move between the top-level screens; inside the list
//! screens button 1 activates and button 2 or 3 moves the cursor.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use oledmenu_core::{Key, KeyAction, Navigator, Scene, SceneId, Terminal};
use oledmenu_display::{Canvas, LogicalLine, Overflow};

use crate::metrics::StatusSource;
use crate::network::NetworkManager;
use crate::text_input::KeyEventSource;

mod access_points;
mod connections;
mod password;
mod power;
mod splash;
mod status;

/// Opens a keyboard for the password screen
pub type KeyboardFactory = Rc<dyn Fn() -> io::Result<Box<dyn KeyEventSource>>>;

/// Key of the cursor position in list scenes
const SELECTED: &str = "selected";

/// What the scenes talk to
#[derive(Clone)]
pub struct Services {
    pub status: Rc<dyn StatusSource>,
    pub network: Rc<dyn NetworkManager>,
    pub keyboard: KeyboardFactory,
    /// Seed for the splash noise
    pub seed: u32,
}

/// Ids of every scene in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Menu {
    pub splash: SceneId,
    pub status: SceneId,
    pub connections: SceneId,
    pub power: SceneId,
    pub access_points: SceneId,
    pub password: SceneId,
    pub shutdown: SceneId,
    pub reboot: SceneId,
    pub exit: SceneId,
}

/// Values handed from one scene to another
#[derive(Default)]
struct Handoff {
    /// Network the password is being typed for
    ssid: RefCell<String>,
    /// Outcome of the last connection attempt
    result: RefCell<Option<String>>,
}

/// Build the scene graph; the menu starts at `splash`
pub fn build(services: Services) -> Result<(Navigator, Menu), oledmenu_core::ConfigError> {
    let handoff = Rc::new(Handoff::default());
    let mut nav = Navigator::new();

    let menu = Menu {
        splash: nav.add(splash::scene(services.seed)),
        status: nav.add(status::scene(services.status.clone())),
        connections: nav.add(connections::scene(services.network.clone())),
        power: nav.add(power::scene()),
        access_points: nav.add(access_points::scene(
            services.network.clone(),
            handoff.clone(),
        )),
        password: nav.add(password::scene(
            services.network.clone(),
            services.keyboard.clone(),
            handoff.clone(),
        )),
        shutdown: nav.add(Scene::terminal("shutdown", Terminal::Shutdown)),
        reboot: nav.add(Scene::terminal("reboot", Terminal::Reboot)),
        exit: nav.add(Scene::terminal("exit", Terminal::Exit)),
    };

    for top in [menu.splash, menu.status] {
        let home = if top == menu.splash { menu.status } else { menu.splash };
        nav.bind(top, Key(1), KeyAction::Goto(home))?;
        nav.bind(top, Key(2), KeyAction::Goto(menu.connections))?;
        nav.bind(top, Key(3), KeyAction::Goto(menu.power))?;
    }

    connections::bind(&mut nav, &menu, services.network.clone())?;
    power::bind(&mut nav, &menu)?;
    access_points::bind(&mut nav, &menu, handoff)?;

    log::debug!("menu built with {} scenes", nav.len());
    Ok((nav, menu))
}

/// Cursor position stored in scene state
fn selected(state: &oledmenu_core::SceneState) -> usize {
    state.get_or(SELECTED, 0usize)
}

/// Move the cursor one step forward through `count` options
fn select_next(state: &mut oledmenu_core::SceneState, count: usize) {
    let next = (selected(state) + 1) % count.max(1);
    state.insert(SELECTED, next);
}

/// Draw a list in `rows` rows, keeping the selected option on screen
///
/// The selected row is inverted and scrolls; the others are truncated.
fn draw_list(canvas: &mut Canvas<'_>, options: &[String], selected: usize, rows: usize) {
    let (start, end) = if rows > 0 && selected >= rows {
        (selected + 1 - rows, selected + 1)
    } else {
        (0, rows)
    };
    for (index, option) in options.iter().enumerate().take(end).skip(start) {
        let line = if index == selected {
            LogicalLine::new(option.as_str())
                .inverted(true)
                .overflow(Overflow::Scroll)
        } else {
            LogicalLine::new(option.as_str())
        };
        canvas.put(line);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::network::{AccessPoint, SavedConnection};
    use crate::shell::CommandStatus;
    use crate::text_input::testing::ScriptedKeys;
    use crate::text_input::KeyNotification;
    use oledmenu_display::{Geometry, LineSet, RenderBuffer};

    pub struct FixedStatus(pub Vec<String>);

    impl StatusSource for FixedStatus {
        fn status_lines(&self) -> Vec<String> {
            self.0.clone()
        }
    }

    /// In-memory network manager recording every change request
    #[derive(Default)]
    pub struct FakeNetwork {
        pub connections: RefCell<Vec<SavedConnection>>,
        pub access_points: RefCell<Vec<AccessPoint>>,
        pub requests: RefCell<Vec<String>>,
        pub connect_code: std::cell::Cell<i32>,
    }

    impl NetworkManager for FakeNetwork {
        fn saved_connections(&self) -> Result<Vec<SavedConnection>, CommandStatus> {
            Ok(self.connections.borrow().clone())
        }

        fn access_points(&self) -> Result<Vec<AccessPoint>, CommandStatus> {
            Ok(self.access_points.borrow().clone())
        }

        fn set_connection(&self, uuid: &str, up: bool) -> CommandStatus {
            self.requests
                .borrow_mut()
                .push(format!("{} {}", if up { "up" } else { "down" }, uuid));
            for conn in self.connections.borrow_mut().iter_mut() {
                if conn.uuid == uuid {
                    conn.up = up;
                }
            }
            CommandStatus {
                code: 0,
                message: String::new(),
            }
        }

        fn connect(&self, ssid: &str, password: &str) -> CommandStatus {
            self.requests
                .borrow_mut()
                .push(format!("connect {} {}", ssid, password));
            CommandStatus {
                code: self.connect_code.get(),
                message: "Secrets were required".to_string(),
            }
        }
    }

    pub fn conn(name: &str, uuid: &str, up: bool) -> SavedConnection {
        SavedConnection {
            name: name.into(),
            uuid: uuid.into(),
            up,
        }
    }

    pub fn ap(in_use: bool, signal: u32, ssid: &str) -> AccessPoint {
        AccessPoint {
            in_use,
            signal,
            ssid: ssid.into(),
        }
    }

    /// Keys each password screen will see, one script per opening
    pub type KeyScripts = Rc<RefCell<Vec<Vec<KeyNotification>>>>;

    pub fn services(network: Rc<FakeNetwork>, scripts: KeyScripts) -> Services {
        let keyboard: KeyboardFactory = Rc::new(move || {
            let script = scripts.borrow_mut().pop().unwrap_or_default();
            Ok(Box::new(ScriptedKeys::new(script)) as Box<dyn KeyEventSource>)
        });
        Services {
            status: Rc::new(FixedStatus(vec!["wlan0 UP 10.0.0.2/24".into()])),
            network,
            keyboard,
            seed: 7,
        }
    }

    /// Draw the current scene, act on its target and return the drawn rows
    pub fn render(nav: &mut Navigator) -> Vec<(String, bool)> {
        let geometry = Geometry::FULL_PANEL;
        let mut lines = LineSet::new(geometry);
        let mut buffer = RenderBuffer::new(geometry.rows, geometry.row_len());
        let target = nav.tick_draw(&mut lines, &mut buffer).unwrap();
        nav.flush_deferred();
        nav.resolve(target).unwrap();
        lines
            .iter()
            .map(|(_, line)| (line.text().to_string(), line.is_inverted()))
            .collect()
    }

    /// Just the texts of [`render`]
    pub fn texts(nav: &mut Navigator) -> Vec<String> {
        render(nav).into_iter().map(|(text, _)| text).collect()
    }
}
