//! Font loading and text measurement for the GUI overlay.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem, SYSTEM_FONT_CANDIDATES};
