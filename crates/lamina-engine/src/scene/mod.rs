//! Scene (draw stream) types.
//!
//! The GUI records renderer-agnostic commands here each frame; the 2D
//! renderers consume them in paint order (z-index, then insertion order).

mod cmd;
mod layer;
mod list;

pub use cmd::{DrawCmd, RectCmd, TextCmd};
pub use layer::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
