use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Keys released since the last frame.
///
/// Every release counts, including one whose press happened before the
/// window had focus.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_released.clear();
    }

    /// Folds one event into the frame.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, state: KeyState::Released } => {
                self.keys_released.insert(key);
            }
            InputEvent::Key { state: KeyState::Pressed, .. } => {}
        }
    }

    /// Whether `key` went up during this frame.
    pub fn released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state }
    }

    #[test]
    fn press_alone_is_not_a_release() {
        let mut f = InputFrame::default();
        f.apply_event(key(Key::Escape, KeyState::Pressed));
        assert!(!f.released(Key::Escape));
        f.apply_event(key(Key::Escape, KeyState::Released));
        assert!(f.released(Key::Escape));
    }

    #[test]
    fn release_without_seen_press_is_recorded() {
        // Escape pressed in another window, released over ours.
        let mut f = InputFrame::default();
        f.apply_event(key(Key::Escape, KeyState::Released));
        assert!(f.released(Key::Escape));
    }

    #[test]
    fn repeated_release_records_once() {
        let mut f = InputFrame::default();
        f.apply_event(key(Key::Char('f'), KeyState::Released));
        f.apply_event(key(Key::Char('f'), KeyState::Released));
        assert_eq!(f.keys_released.len(), 1);
    }

    #[test]
    fn clear_resets_frame() {
        let mut f = InputFrame::default();
        f.apply_event(key(Key::Char('f'), KeyState::Released));
        f.clear();
        assert!(f.keys_released.is_empty());
        assert!(!f.released(Key::Char('f')));
    }
}
