//! Keyboard text entry
//!
//! A listener thread pulls [`KeyNotification`]s from a [`KeyEventSource`]
//! and applies them to a shared [`TextEntry`]. The draw and key hooks of
//! the password scene read the same entry. Both sides hold the lock only
//! for a single read-modify-write.
//!
//! The thread lives as long as its [`ListenerGuard`]; unhooking (or
//! dropping the guard) stops and joins it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, ModifierKeyCode};

/// WPA passphrases are at most 63 characters
pub const MAX_TEXT: usize = 63;

/// How long the listener waits for a key before checking its stop flag
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Keys the entry reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Char(char),
    Space,
    Shift,
    Backspace,
    Delete,
    Enter,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Press,
    Release,
}

/// One key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotification {
    pub name: KeyName,
    pub kind: KeyKind,
}

impl KeyNotification {
    pub fn press(name: KeyName) -> Self {
        Self {
            name,
            kind: KeyKind::Press,
        }
    }

    pub fn release(name: KeyName) -> Self {
        Self {
            name,
            kind: KeyKind::Release,
        }
    }
}

/// Where key notifications come from
pub trait KeyEventSource: Send {
    /// Wait up to `timeout` for the next notification
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyNotification>>;
}

/// Keys typed on the controlling terminal
///
/// Puts the terminal in raw mode for as long as the source lives.
pub struct TerminalKeySource {
    _private: (),
}

impl TerminalKeySource {
    pub fn open() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalKeySource {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

impl KeyEventSource for TerminalKeySource {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyNotification>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        let kind = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => KeyKind::Press,
            KeyEventKind::Release => KeyKind::Release,
        };
        let name = match key.code {
            KeyCode::Char(' ') => KeyName::Space,
            KeyCode::Char(c) => KeyName::Char(c),
            KeyCode::Backspace => KeyName::Backspace,
            KeyCode::Delete => KeyName::Delete,
            KeyCode::Enter => KeyName::Enter,
            KeyCode::Esc => KeyName::Esc,
            KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
                KeyName::Shift
            }
            _ => KeyName::Other,
        };
        Ok(Some(KeyNotification { name, kind }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Editing,
    Confirmed,
    Cancelled,
}

/// Text typed so far
#[derive(Debug, Default)]
pub struct TextEntry {
    text: heapless::String<MAX_TEXT>,
    shift: bool,
    status: EntryStatus,
}

impl TextEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// One `*` per character
    pub fn masked(&self) -> String {
        "*".repeat(self.text.chars().count())
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status != EntryStatus::Editing
    }

    pub fn shift_held(&self) -> bool {
        self.shift
    }

    pub fn confirm(&mut self) {
        if self.status == EntryStatus::Editing {
            self.status = EntryStatus::Confirmed;
        }
    }

    pub fn cancel(&mut self) {
        if self.status == EntryStatus::Editing {
            self.status = EntryStatus::Cancelled;
        }
    }

    /// Apply one notification; ignored once confirmed or cancelled
    pub fn apply(&mut self, key: KeyNotification) {
        if self.is_done() {
            return;
        }
        match (key.name, key.kind) {
            (KeyName::Shift, kind) => self.shift = kind == KeyKind::Press,
            (_, KeyKind::Release) => {}
            (KeyName::Char(c), KeyKind::Press) => {
                let c = if self.shift { c.to_ascii_uppercase() } else { c };
                self.push(c);
            }
            (KeyName::Space, KeyKind::Press) => self.push(' '),
            (KeyName::Backspace | KeyName::Delete, KeyKind::Press) => {
                self.text.pop();
            }
            (KeyName::Enter, KeyKind::Press) => self.confirm(),
            (KeyName::Esc, KeyKind::Press) => self.cancel(),
            (KeyName::Other, KeyKind::Press) => {}
        }
    }

    fn push(&mut self, c: char) {
        if self.text.push(c).is_err() {
            log::debug!("text entry full, dropping key");
        }
    }
}

/// Entry shared between the listener thread and the scene hooks
pub type SharedEntry = Arc<Mutex<TextEntry>>;

/// Lock an entry, recovering it if a holder panicked
pub fn lock(entry: &SharedEntry) -> MutexGuard<'_, TextEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running listener thread
pub struct ListenerGuard {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ListenerGuard {
    /// Start feeding `source` into `entry` on a new thread
    pub fn spawn(mut source: Box<dyn KeyEventSource>, entry: SharedEntry) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                log::debug!("key listener started");
                while !thread_stop.load(Ordering::Acquire) {
                    match source.next_key(POLL_TIMEOUT) {
                        Ok(Some(key)) => {
                            let mut entry = lock(&entry);
                            entry.apply(key);
                            if entry.is_done() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!("key listener stopped: {}", e);
                            break;
                        }
                    }
                }
                log::debug!("key listener finished");
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_hooked(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop and join the thread; later calls do nothing
    pub fn unhook(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            log::warn!("key listener panicked");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.unhook();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed list of notifications, then reports nothing
    pub struct ScriptedKeys {
        keys: VecDeque<KeyNotification>,
        polls: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl ScriptedKeys {
        pub fn new(keys: impl IntoIterator<Item = KeyNotification>) -> Self {
            Self {
                keys: keys.into_iter().collect(),
                polls: Arc::default(),
            }
        }

        pub fn polls(&self) -> Arc<std::sync::atomic::AtomicUsize> {
            self.polls.clone()
        }
    }

    impl KeyEventSource for ScriptedKeys {
        fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyNotification>> {
            self.polls.fetch_add(1, Ordering::Relaxed);
            match self.keys.pop_front() {
                Some(key) => Ok(Some(key)),
                None => {
                    thread::sleep(timeout.min(Duration::from_millis(5)));
                    Ok(None)
                }
            }
        }
    }

    pub fn typed(text: &str) -> Vec<KeyNotification> {
        text.chars()
            .flat_map(|c| {
                let name = if c == ' ' { KeyName::Space } else { KeyName::Char(c) };
                [KeyNotification::press(name), KeyNotification::release(name)]
            })
            .collect()
    }
}
