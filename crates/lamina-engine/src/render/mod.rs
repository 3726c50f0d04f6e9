//! 2D overlay rendering.
//!
//! Renderers consume a `scene::DrawList` and draw it on top of whatever the
//! frame already contains (load, never clear). Each renderer owns its GPU
//! resources and creates them lazily on first use.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

mod ctx;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
