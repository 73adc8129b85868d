//! Platform event translation.

mod winit;

pub(crate) use self::winit::translate_window_event;
