//! Networks in range
//!
//! Lists access points that are not in use, strongest first. Picking one
//! pushes the password screen; its outcome shows on the top row when the
//! password screen pops back here.

use std::rc::Rc;
use std::time::Duration;

use oledmenu_core::{Command, ConfigError, Intent, Key, KeyAction, Navigator, Scene, SceneState};
use oledmenu_display::{LogicalLine, Overflow};

use super::{draw_list, select_next, selected, Handoff, Menu, SELECTED};
use crate::network::{AccessPoint, NetworkManager};

const ACCESS_POINTS: &str = "access_points";

fn access_points(state: &SceneState) -> &[AccessPoint] {
    state
        .get::<Vec<AccessPoint>>(ACCESS_POINTS)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `"<signal> <ssid>"`, signal shown as `??` when it does not fit two digits
fn label(ap: &AccessPoint) -> String {
    if ap.signal < 100 {
        format!("{} {}", ap.signal, ap.ssid)
    } else {
        format!("?? {}", ap.ssid)
    }
}

pub(super) fn scene(network: Rc<dyn NetworkManager>, handoff: Rc<Handoff>) -> Scene {
    Scene::new("access_points")
        .refresh_every(Duration::from_millis(300))
        .on_init(move |state| {
            let mut aps: Vec<AccessPoint> = network
                .access_points()
                .unwrap_or_default()
                .into_iter()
                .filter(|ap| !ap.in_use)
                .collect();
            aps.sort_by(|a, b| (b.signal, &b.ssid).cmp(&(a.signal, &a.ssid)));
            state.insert(ACCESS_POINTS, aps);
            state.insert(SELECTED, 0usize);
            None
        })
        .on_draw(move |state, canvas| {
            let mut rows = canvas.rows();
            if let Some(result) = handoff.result.borrow().as_deref() {
                canvas.put(LogicalLine::new(result).overflow(Overflow::Scroll));
                rows = rows.saturating_sub(1);
            }
            let mut options = vec!["cancel".to_string()];
            options.extend(access_points(state).iter().map(label));
            draw_list(canvas, &options, selected(state), rows);
            None
        })
}

pub(super) fn bind(nav: &mut Navigator, menu: &Menu, handoff: Rc<Handoff>) -> Result<(), ConfigError> {
    let password = menu.password;
    let id = menu.access_points;
    nav.bind(
        id,
        Key(1),
        KeyAction::handler(move |state| {
            let cursor = selected(state);
            if cursor == 0 {
                return Some(Intent::pop());
            }
            let ap = access_points(state).get(cursor - 1)?;
            *handoff.ssid.borrow_mut() = ap.ssid.clone();
            Some(Intent::push(password))
        }),
    )?;
    nav.bind(
        id,
        Key(2),
        KeyAction::handler(|state| {
            let count = access_points(state).len() + 1;
            select_next(state, count);
            Some(Intent::stay().now(Command::SetFrame(0)))
        }),
    )?;
    // Leaving for power abandons the pushed sub-flow
    nav.bind(id, Key(3), KeyAction::Intent(Intent::reset(menu.power)))
}
