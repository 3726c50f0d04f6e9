use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use naga::{AddressSpace, Binding, Handle, Module, ScalarKind, Type, TypeInner};

use super::{CompiledStage, ShaderError, ShaderStage};

/// Scalar kind of a vertex attribute as the shader sees it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttributeKind {
    Float,
    Uint,
    Sint,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeKind::Float => "f32",
            AttributeKind::Uint => "u32",
            AttributeKind::Sint => "i32",
        })
    }
}

/// One vertex attribute a mesh supplies: shader location, scalar kind and
/// component count.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub kind: AttributeKind,
    pub components: u32,
}

impl VertexAttribute {
    /// A float attribute.
    #[inline]
    pub const fn new(location: u32, components: u32) -> Self {
        Self { location, kind: AttributeKind::Float, components }
    }

    #[inline]
    pub const fn with_kind(self, kind: AttributeKind) -> Self {
        Self { kind, ..self }
    }

    /// Maps a wgpu attribute to its location, kind and component count.
    /// Returns `None` for packed/normalized formats the link check does not model.
    pub fn from_wgpu(attr: &wgpu::VertexAttribute) -> Option<Self> {
        use wgpu::VertexFormat as F;
        let (kind, components) = match attr.format {
            F::Float32 => (AttributeKind::Float, 1),
            F::Float32x2 => (AttributeKind::Float, 2),
            F::Float32x3 => (AttributeKind::Float, 3),
            F::Float32x4 => (AttributeKind::Float, 4),
            F::Uint32 => (AttributeKind::Uint, 1),
            F::Uint32x2 => (AttributeKind::Uint, 2),
            F::Uint32x3 => (AttributeKind::Uint, 3),
            F::Uint32x4 => (AttributeKind::Uint, 4),
            F::Sint32 => (AttributeKind::Sint, 1),
            F::Sint32x2 => (AttributeKind::Sint, 2),
            F::Sint32x3 => (AttributeKind::Sint, 3),
            F::Sint32x4 => (AttributeKind::Sint, 4),
            _ => return None,
        };
        Some(Self::new(attr.shader_location, components).with_kind(kind))
    }
}

/// Reflected uniform binding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub group: u32,
    pub binding: u32,
    /// Byte size of the WGSL type (12 for `vec3<f32>`).
    pub size: u64,
    /// Stages that declare the uniform.
    pub stages: wgpu::ShaderStages,
}

/// CPU-side result of linking a vertex and a fragment stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramInterface {
    /// location → component count.
    vertex_inputs: BTreeMap<u32, u32>,
    uniforms: BTreeMap<String, UniformSlot>,
}

impl ProgramInterface {
    #[inline]
    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.get(name)
    }

    /// Uniforms sorted by name.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformSlot)> {
        self.uniforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Vertex input locations and their component counts, sorted by location.
    pub fn vertex_inputs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.vertex_inputs.iter().map(|(&l, &c)| (l, c))
    }
}

/// Checks that `vertex`, `fragment` and the mesh `attributes` fit together.
///
/// All problems are collected into one [`ShaderError::Link`] log, one per line.
pub fn link(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
    attributes: &[VertexAttribute],
) -> Result<ProgramInterface, ShaderError> {
    for (stage, expected) in [(vertex, ShaderStage::Vertex), (fragment, ShaderStage::Fragment)] {
        if stage.stage() != expected {
            return Err(ShaderError::link(format!(
                "expected a {expected} stage, got a {} stage",
                stage.stage()
            )));
        }
    }

    let mut log = String::new();

    // vertex inputs vs mesh attributes
    let vs_module = vertex.module();
    let vs_inputs = stage_inputs(vs_module, &vertex.entry().function);
    let mut vertex_inputs = BTreeMap::new();
    for (location, ty) in &vs_inputs {
        let Some((kind, components)) = attribute_shape(&vs_module.types[*ty].inner) else {
            let _ = writeln!(log, "vertex input @location({location}) has an unsupported type");
            continue;
        };
        match attributes.iter().find(|a| a.location == *location) {
            None => {
                let _ = writeln!(log, "vertex input @location({location}) is not provided by the mesh");
            }
            Some(a) if a.kind != kind => {
                let _ = writeln!(
                    log,
                    "vertex input @location({location}) is {kind}, mesh provides {}",
                    a.kind
                );
            }
            Some(a) if a.components != components => {
                let _ = writeln!(
                    log,
                    "vertex input @location({location}) expects {components} components, mesh provides {}",
                    a.components
                );
            }
            Some(_) => {
                vertex_inputs.insert(*location, components);
            }
        }
    }

    // vertex outputs vs fragment inputs
    let fs_module = fragment.module();
    let vs_outputs = stage_outputs(vs_module, &vertex.entry().function);
    for (location, fs_ty) in stage_inputs(fs_module, &fragment.entry().function) {
        match vs_outputs.get(&location) {
            None => {
                let _ = writeln!(
                    log,
                    "fragment input @location({location}) is not written by the vertex stage"
                );
            }
            Some(&vs_ty) if vs_module.types[vs_ty].inner != fs_module.types[fs_ty].inner => {
                let _ = writeln!(
                    log,
                    "@location({location}) type differs between vertex output and fragment input"
                );
            }
            Some(_) => {}
        }
    }

    // uniforms
    let mut uniforms: BTreeMap<String, UniformSlot> = BTreeMap::new();
    for stage in [vertex, fragment] {
        for (name, slot) in stage_uniforms(stage) {
            match uniforms.get_mut(&name) {
                None => {
                    uniforms.insert(name, slot);
                }
                Some(existing) => {
                    if (existing.group, existing.binding, existing.size)
                        != (slot.group, slot.binding, slot.size)
                    {
                        let _ = writeln!(
                            log,
                            "uniform `{name}` is declared differently in the vertex and fragment stages"
                        );
                    }
                    existing.stages |= slot.stages;
                }
            }
        }
    }

    // Two different names on the same binding cannot both be backed by a buffer.
    let mut seen: BTreeMap<(u32, u32), &str> = BTreeMap::new();
    for (name, slot) in &uniforms {
        if let Some(other) = seen.insert((slot.group, slot.binding), name) {
            let _ = writeln!(
                log,
                "uniforms `{other}` and `{name}` share @group({}) @binding({})",
                slot.group, slot.binding
            );
        }
    }

    if !log.is_empty() {
        return Err(ShaderError::link(log.trim_end()));
    }

    log::debug!(
        "linked program: {} vertex input(s), {} uniform(s)",
        vertex_inputs.len(),
        uniforms.len()
    );

    Ok(ProgramInterface { vertex_inputs, uniforms })
}

/// `@location` arguments of an entry point, flattening struct arguments.
fn stage_inputs(module: &Module, function: &naga::Function) -> BTreeMap<u32, Handle<Type>> {
    let mut out = BTreeMap::new();
    for arg in &function.arguments {
        collect_locations(module, arg.binding.as_ref(), arg.ty, &mut out);
    }
    out
}

/// `@location` outputs of an entry point, flattening a struct result.
fn stage_outputs(module: &Module, function: &naga::Function) -> BTreeMap<u32, Handle<Type>> {
    let mut out = BTreeMap::new();
    if let Some(result) = &function.result {
        collect_locations(module, result.binding.as_ref(), result.ty, &mut out);
    }
    out
}

fn collect_locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: Handle<Type>,
    out: &mut BTreeMap<u32, Handle<Type>>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, ty);
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.binding.as_ref(), m.ty, out);
                }
            }
        }
    }
}

/// Scalar kind and component count of a vertex input type.
fn attribute_shape(inner: &TypeInner) -> Option<(AttributeKind, u32)> {
    let (scalar, components) = match *inner {
        TypeInner::Scalar(scalar) => (scalar, 1),
        TypeInner::Vector { size, scalar } => (scalar, size as u32),
        _ => return None,
    };
    let kind = match scalar.kind {
        ScalarKind::Float => AttributeKind::Float,
        ScalarKind::Uint => AttributeKind::Uint,
        ScalarKind::Sint => AttributeKind::Sint,
        _ => return None,
    };
    Some((kind, components))
}

fn stage_uniforms(stage: &CompiledStage) -> Vec<(String, UniformSlot)> {
    let module = stage.module();
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let name = var.name.clone()?;
            let binding = var.binding.as_ref()?;
            let size = module.types[var.ty].inner.size(module.to_ctx());
            Some((name, UniformSlot {
                group: binding.group,
                binding: binding.binding,
                size: u64::from(size),
                stages: stage.stage().to_wgpu(),
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile_stage;

    const VS: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.normal = normal;
    return out;
}
"#;

    const FS: &str = r#"
@group(0) @binding(0) var<uniform> tint: vec3<f32>;

@fragment
fn fs_main(@location(0) normal: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(normal * tint, 1.0);
}
"#;

    const ATTRS: [VertexAttribute; 2] = [VertexAttribute::new(0, 3), VertexAttribute::new(1, 3)];

    fn vs(src: &str) -> CompiledStage {
        compile_stage(ShaderStage::Vertex, src).unwrap()
    }

    fn fs(src: &str) -> CompiledStage {
        compile_stage(ShaderStage::Fragment, src).unwrap()
    }

    fn link_log(result: Result<ProgramInterface, ShaderError>) -> String {
        match result {
            Err(ShaderError::Link { log }) => log,
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn matching_stages_link() {
        let iface = link(&vs(VS), &fs(FS), &ATTRS).unwrap();
        assert_eq!(iface.vertex_inputs().collect::<Vec<_>>(), vec![(0, 3), (1, 3)]);

        let tint = iface.uniform("tint").unwrap();
        assert_eq!((tint.group, tint.binding, tint.size), (0, 0, 12));
        assert_eq!(tint.stages, wgpu::ShaderStages::FRAGMENT);
        assert!(iface.uniform("missing").is_none());
    }

    #[test]
    fn missing_mesh_attribute_fails() {
        let log = link_log(link(&vs(VS), &fs(FS), &ATTRS[..1]));
        assert!(log.contains("@location(1) is not provided"), "{log}");
    }

    #[test]
    fn attribute_width_mismatch_fails() {
        let attrs = [VertexAttribute::new(0, 3), VertexAttribute::new(1, 2)];
        let log = link_log(link(&vs(VS), &fs(FS), &attrs));
        assert!(log.contains("expects 3 components, mesh provides 2"), "{log}");
    }

    #[test]
    fn attribute_kind_mismatch_fails() {
        let attrs = [VertexAttribute::new(0, 3).with_kind(AttributeKind::Uint), ATTRS[1]];
        let log = link_log(link(&vs(VS), &fs(FS), &attrs));
        assert!(log.contains("@location(0) is f32, mesh provides u32"), "{log}");
    }

    #[test]
    fn integer_inputs_link_against_integer_attributes() {
        let vs_src = r#"
@vertex
fn vs_main(@location(0) id: vec2<u32>, @location(1) offset: i32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(f32(id.x), f32(offset), 0.0, 1.0);
}
"#;
        let fs_src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let attrs = [
            VertexAttribute::new(0, 2).with_kind(AttributeKind::Uint),
            VertexAttribute::new(1, 1).with_kind(AttributeKind::Sint),
        ];
        let iface = link(&vs(vs_src), &fs(fs_src), &attrs).unwrap();
        assert_eq!(iface.vertex_inputs().collect::<Vec<_>>(), vec![(0, 2), (1, 1)]);
    }

    #[test]
    fn unwritten_fragment_input_fails() {
        let fs_src = r#"
@fragment
fn fs_main(@location(3) x: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(x, 1.0);
}
"#;
        let log = link_log(link(&vs(VS), &fs(fs_src), &ATTRS));
        assert!(log.contains("@location(3) is not written"), "{log}");
    }

    #[test]
    fn interstage_type_mismatch_fails() {
        let fs_src = r#"
@fragment
fn fs_main(@location(0) n: vec4<f32>) -> @location(0) vec4<f32> {
    return n;
}
"#;
        let log = link_log(link(&vs(VS), &fs(fs_src), &ATTRS));
        assert!(log.contains("type differs"), "{log}");
    }

    #[test]
    fn conflicting_uniform_declarations_fail() {
        let vs_src = format!(
            "@group(0) @binding(1) var<uniform> tint: vec3<f32>;\n{}",
            VS.replace("out.normal = normal;", "out.normal = normal * tint;")
        );
        let log = link_log(link(&vs(&vs_src), &fs(FS), &ATTRS));
        assert!(log.contains("uniform `tint` is declared differently"), "{log}");
    }

    #[test]
    fn shared_uniform_merges_stages() {
        let vs_src = format!(
            "@group(0) @binding(0) var<uniform> tint: vec3<f32>;\n{}",
            VS.replace("out.normal = normal;", "out.normal = normal * tint;")
        );
        let iface = link(&vs(&vs_src), &fs(FS), &ATTRS).unwrap();
        assert_eq!(
            iface.uniform("tint").unwrap().stages,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
    }

    #[test]
    fn swapped_stages_fail() {
        let log = link_log(link(&fs(FS), &vs(VS), &ATTRS));
        assert!(log.contains("expected a vertex stage"), "{log}");
    }

    #[test]
    fn wgpu_formats_map_to_components() {
        let attr = wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: 1,
        };
        assert_eq!(VertexAttribute::from_wgpu(&attr), Some(VertexAttribute::new(1, 3)));

        let uint = wgpu::VertexAttribute { format: wgpu::VertexFormat::Uint32x3, ..attr };
        assert_eq!(
            VertexAttribute::from_wgpu(&uint),
            Some(VertexAttribute::new(1, 3).with_kind(AttributeKind::Uint))
        );

        let packed = wgpu::VertexAttribute { format: wgpu::VertexFormat::Unorm8x4, ..attr };
        assert_eq!(VertexAttribute::from_wgpu(&packed), None);
    }
}
