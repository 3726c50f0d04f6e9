//! Frame timing.
//!
//! - one `FrameClock` per render loop; `tick()` once per frame
//! - `FpsMeter` turns ticks into a periodic average frame rate

mod fps;
mod frame_clock;

pub use fps::FpsMeter;
pub use frame_clock::{FrameClock, FrameTime};
