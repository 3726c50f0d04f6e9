use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by `window::Runtime`.
///
/// Call order: `on_init` once after the GPU context exists, then
/// `on_window_event`/`on_frame` while running, then `on_exit` once before the
/// GPU context is dropped.
pub trait App {
    /// Creates GPU resources. An error aborts startup and is returned from
    /// `Runtime::run`.
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> anyhow::Result<()>;

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases GPU resources. The device is still alive here.
    fn on_exit(&mut self) {}
}
