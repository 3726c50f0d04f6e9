//! Contract between the runtime loop and the application.
//!
//! The runtime owns the window and GPU context; the application owns its GPU
//! resources and sees the platform only through these contexts.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, InitCtx, WindowCtx};
