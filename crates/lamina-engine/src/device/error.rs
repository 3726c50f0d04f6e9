use std::fmt;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); shut the loop down.
    Fatal,
}

/// The window or its GPU context could not be created.
///
/// Fatal before the render loop starts. `step` names what failed (event loop,
/// window, surface, adapter, device, surface format); `detail` carries the
/// platform message when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInitError {
    pub step: &'static str,
    pub detail: String,
}

impl ContextInitError {
    pub(crate) fn new(step: &'static str, detail: impl fmt::Display) -> Self {
        Self { step, detail: detail.to_string() }
    }
}

impl fmt::Display for ContextInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not create window/context ({})", self.step)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ContextInitError {}
