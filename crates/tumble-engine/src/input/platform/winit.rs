use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};

use crate::input::{InputEvent, Key, KeyState};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            Some(InputEvent::Key {
                key: map_key(&event.logical_key),
                state,
            })
        }

        _ => None,
    }
}

fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Character(s) => map_character(s),
        _ => Key::Unknown,
    }
}

fn map_character(s: &str) -> Key {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Key::Char(c.to_lowercase().next().unwrap_or(c)),
        _ => Key::Unknown,
    }
}
