//! Window + render loop.
//!
//! Owns the `winit` event loop and the single window, and wires them to the
//! GPU context and the application.

mod runtime;

pub use runtime::{LoopState, Runtime, RuntimeConfig};
