//! Lamina GUI — a small immediate-mode overlay on top of `lamina-engine`.
//!
//! Every frame the application rebuilds the interface from scratch:
//!
//! ```rust,ignore
//! gui.begin_frame(FrameInput::from_engine(ctx.input, ctx.input_frame), viewport);
//! let changed = gui.window("Light Direction", |ui| {
//!     ui.slider_float3("Direction", &mut light, -1.0..=1.0).changed
//! });
//! let (draw_list, fonts) = gui.end_frame();
//! rect_renderer.render(rctx, target, draw_list);
//! text_renderer.render(rctx, target, draw_list, fonts);
//! ```
//!
//! Only window positions and the widget currently held by the pointer survive
//! between frames; values live in the caller.

mod context;
mod id;
mod input;
mod painter;
mod style;
mod ui;
pub mod widgets;

pub use context::Context;
pub use id::Id;
pub use input::FrameInput;
pub use style::Style;
pub use ui::{Response, Ui};
