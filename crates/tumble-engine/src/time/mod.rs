//! Time subsystem.
//!
//! Provides testable frame timing utilities without coupling to the runtime:
//! - `SimClock` drives animation (wall-clock or fixed-step)
//! - `RenderTimer` measures how long each frame takes to produce

mod render_timer;
mod sim_clock;

pub use render_timer::{RenderTimer, SMOOTHING};
pub use sim_clock::{SimClock, SimTime, TimeMode};
