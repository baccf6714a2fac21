//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop, creates the window and GL device on resume,
//! and drives one frame per redraw until the window closes or Escape is pressed.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
