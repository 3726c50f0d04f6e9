//! Widget geometry and value mapping, independent of any frame state.

pub mod slider;
