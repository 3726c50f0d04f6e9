use std::fmt;

use super::ShaderStage;

/// Failure to turn shader source into a usable program.
///
/// Both variants are fatal for the caller; the log carries the diagnostic
/// text meant for a human.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// A single stage failed to parse or validate.
    Compile { stage: ShaderStage, log: String },
    /// The stages compiled but do not fit together (or with the mesh).
    Link { log: String },
}

impl ShaderError {
    pub(crate) fn compile(stage: ShaderStage, log: impl Into<String>) -> Self {
        Self::Compile { stage, log: log.into() }
    }

    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self::Link { log: log.into() }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Compile { stage, log } => {
                write!(f, "{stage} shader compilation failed:\n{log}")
            }
            ShaderError::Link { log } => write!(f, "shader program linking failed:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage_and_keeps_log() {
        let e = ShaderError::compile(ShaderStage::Fragment, "expected ';'");
        assert_eq!(e.to_string(), "fragment shader compilation failed:\nexpected ';'");

        let e = ShaderError::link("location 1 missing");
        assert!(e.to_string().ends_with("location 1 missing"));
    }
}
