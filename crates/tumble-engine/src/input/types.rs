/// Keyboard key identifier.
///
/// Keys are logical (layout-aware): `Char('f')` is whatever key produces
/// "f" on the active layout. Letters are stored lowercase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,

    /// A key producing a single printable character.
    Char(char),

    /// Anything not represented above.
    Unknown,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: KeyState },
}
