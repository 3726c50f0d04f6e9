//! Paint model shared between the GUI and the 2D renderers.

mod color;

pub use color::Color;
