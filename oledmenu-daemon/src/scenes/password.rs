//! Passphrase entry
//!
//! Typing happens on a keyboard through the listener thread. Enter or
//! button 1 confirms, Esc or button 3 cancels; either way the scene pops
//! back to whoever pushed it. The listener is unhooked before the connect
//! call and again, idempotently, when the scene finishes.

use std::rc::Rc;
use std::sync::Arc;

use oledmenu_core::{Intent, Key, Scene, SceneState};
use oledmenu_display::{LogicalLine, Overflow};

use super::{Handoff, KeyboardFactory};
use crate::network::NetworkManager;
use crate::text_input::{lock, EntryStatus, ListenerGuard, SharedEntry};

const ENTRY: &str = "entry";
const LISTENER: &str = "listener";

fn unhook(state: &mut SceneState) {
    if let Some(guard) = state.get_mut::<ListenerGuard>(LISTENER) {
        guard.unhook();
    }
    state.remove(LISTENER);
}

/// Act on a confirmed or cancelled entry
fn settle(state: &mut SceneState, network: &dyn NetworkManager, handoff: &Handoff) -> Option<Intent> {
    let entry = state.get::<SharedEntry>(ENTRY)?.clone();
    let (status, password) = {
        let entry = lock(&entry);
        (entry.status(), entry.text().to_string())
    };
    match status {
        EntryStatus::Editing => None,
        EntryStatus::Cancelled => {
            unhook(state);
            Some(Intent::pop())
        }
        EntryStatus::Confirmed => {
            unhook(state);
            let ssid = handoff.ssid.borrow().clone();
            let result = network.connect(&ssid, &password);
            let message = if result.success() {
                format!("connected to {}", ssid)
            } else {
                format!("{} failed: {}", ssid, result.message)
            };
            *handoff.result.borrow_mut() = Some(message);
            Some(Intent::pop())
        }
    }
}

pub(super) fn scene(
    network: Rc<dyn NetworkManager>,
    keyboard: KeyboardFactory,
    handoff: Rc<Handoff>,
) -> Scene {
    let (draw_network, draw_handoff) = (network.clone(), handoff.clone());
    Scene::new("password")
        .on_init(move |state| {
            let entry: SharedEntry = Arc::default();
            match keyboard().and_then(|source| ListenerGuard::spawn(source, entry.clone())) {
                Ok(guard) => state.insert(LISTENER, guard),
                Err(e) => log::warn!("no keyboard for text entry: {}", e),
            }
            state.insert(ENTRY, entry);
            None
        })
        .on_draw(move |state, canvas| {
            if let Some(intent) = settle(state, draw_network.as_ref(), &draw_handoff) {
                return Some(intent);
            }
            let prompt = format!("input password for {}", draw_handoff.ssid.borrow());
            canvas.put(LogicalLine::new(prompt).overflow(Overflow::Wrap));
            let masked = state
                .get::<SharedEntry>(ENTRY)
                .map(|entry| lock(entry).masked())
                .unwrap_or_default();
            canvas.put(LogicalLine::new(masked).overflow(Overflow::Wrap));
            canvas.putline("F1: OK F3: Back");
            None
        })
        .on_finish(|state| {
            unhook(state);
            None
        })
        .on_key(move |key, state| {
            let entry = state.get::<SharedEntry>(ENTRY)?.clone();
            match key {
                Key(1) => lock(&entry).confirm(),
                Key(3) => lock(&entry).cancel(),
                _ => return None,
            }
            settle(state, network.as_ref(), &handoff)
        })
}
