use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderError, ShaderStage};

/// A parsed and validated single-stage WGSL module.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    source: String,
    module: naga::Module,
    entry_index: usize,
}

impl CompiledStage {
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn entry_point(&self) -> &str {
        &self.entry().name
    }

    #[inline]
    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    #[inline]
    pub(crate) fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

/// Parses and validates `source` as a `stage` shader.
///
/// The module must declare exactly one entry point for `stage`. Any failure
/// is a [`ShaderError::Compile`] whose log is naga's rendered diagnostic.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::compile(stage, e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderError::compile(stage, e.emit_to_string(source)))?;

    let mut entries = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.to_naga());

    let entry_index = match (entries.next(), entries.next()) {
        (Some((i, _)), None) => i,
        (None, _) => {
            return Err(ShaderError::compile(stage, format!("no @{stage} entry point found")));
        }
        (Some(_), Some(_)) => {
            return Err(ShaderError::compile(
                stage,
                format!("more than one @{stage} entry point; expected exactly one"),
            ));
        }
    };

    log::debug!(
        "compiled {stage} stage (entry point `{}`)",
        module.entry_points[entry_index].name
    );

    Ok(CompiledStage {
        stage,
        source: source.to_owned(),
        module,
        entry_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
@vertex
fn main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}
"#;

    #[test]
    fn valid_vertex_stage_compiles() {
        let vs = compile_stage(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(vs.stage(), ShaderStage::Vertex);
        assert_eq!(vs.entry_point(), "main");
        assert_eq!(vs.source(), VS);
    }

    #[test]
    fn syntax_error_is_a_compile_error_for_that_stage() {
        let err = compile_stage(ShaderStage::Vertex, "@vertex fn main( {").unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn type_error_is_caught_by_validation() {
        // Parses, but returns the wrong type.
        let src = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec3<f32>(1.0, 0.0, 0.0);
}
"#;
        let err = compile_stage(ShaderStage::Fragment, src).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn wrong_stage_is_rejected() {
        let err = compile_stage(ShaderStage::Fragment, VS).unwrap_err();
        let ShaderError::Compile { log, .. } = err else { panic!("expected compile error") };
        assert!(log.contains("no @fragment entry point"));
    }

    #[test]
    fn two_entry_points_of_one_stage_are_rejected() {
        let src = format!("{VS}\n@vertex fn other() -> @builtin(position) vec4<f32> {{ return vec4<f32>(0.0); }}");
        let err = compile_stage(ShaderStage::Vertex, &src).unwrap_err();
        let ShaderError::Compile { log, .. } = err else { panic!("expected compile error") };
        assert!(log.contains("more than one"));
    }
}
