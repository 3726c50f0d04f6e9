//! Lamina engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the demo: window and
//! device setup, the shader program builder, the static mesh resource, and the
//! 2D draw-list renderers the GUI overlay paints through.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
pub mod text;

pub mod lighting;
pub mod mesh;
pub mod shader;
