//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform events into `InputEvent`s.

mod frame;
mod types;

pub(crate) mod platform;

pub use frame::InputFrame;
pub use types::{InputEvent, Key, KeyState};
