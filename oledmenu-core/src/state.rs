//! Per-scene private state
//!
//! A small typed key-value store. Values are looked up by name and
//! downcast to the type the hook expects; a lookup with the wrong type
//! behaves like a missing key.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::any::Any;
use core::fmt;

/// Private state of one scene
#[derive(Default)]
pub struct SceneState {
    values: BTreeMap<&'static str, Box<dyn Any>>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn insert<T: Any>(&mut self, key: &'static str, value: T) {
        self.values.insert(key, Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Copy of the value under `key`, or `fallback`
    pub fn get_or<T: Any + Clone>(&self, key: &str, fallback: T) -> T {
        self.get::<T>(key).cloned().unwrap_or(fallback)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let mut state = SceneState::new();
        state.insert("index", 3usize);
        state.insert("label", "hello");

        assert_eq!(state.get::<usize>("index"), Some(&3));
        assert_eq!(state.get::<&str>("label"), Some(&"hello"));
        assert_eq!(state.get::<u32>("index"), None);
        assert_eq!(state.get::<usize>("missing"), None);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_get_or_falls_back() {
        let mut state = SceneState::new();
        assert_eq!(state.get_or("count", 0u32), 0);
        state.insert("count", state.get_or("count", 0u32) + 1);
        state.insert("count", state.get_or("count", 0u32) + 1);
        assert_eq!(state.get_or("count", 0u32), 2);

        // Wrong type reads as missing
        assert_eq!(state.get_or("count", 9i64), 9);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut state = SceneState::new();
        state.insert("a", 1u8);
        state.insert("b", 2u8);
        assert!(state.remove("a"));
        assert!(!state.remove("a"));
        assert!(state.contains("b"));
        state.clear();
        assert!(state.is_empty());
    }
}
