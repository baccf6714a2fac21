//! Time subsystem.
//!
//! - one `FrameClock` per render loop; call `tick()` once per presented frame
//! - `WallTime` for human-readable local timestamps in diagnostics

mod frame_clock;
mod wall_clock;

pub use frame_clock::{FrameClock, FrameTime};
pub use wall_clock::WallTime;
