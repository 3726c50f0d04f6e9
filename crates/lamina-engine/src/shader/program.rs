use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU64;

use super::{
    compile_stage, link, CompiledStage, ProgramInterface, ShaderError, ShaderStage, UniformSlot,
    VertexAttribute,
};

/// Runs every CPU-side step of program creation: compile both stages and
/// link them against `attributes`. No GPU object is touched.
pub fn check_program(
    vertex_src: &str,
    fragment_src: &str,
    attributes: &[VertexAttribute],
) -> Result<(CompiledStage, CompiledStage, ProgramInterface), ShaderError> {
    let vertex = compile_stage(ShaderStage::Vertex, vertex_src)?;
    let fragment = compile_stage(ShaderStage::Fragment, fragment_src)?;
    let interface = link(&vertex, &fragment, attributes)?;
    Ok((vertex, fragment, interface))
}

/// Bytes written into a `vec3<f32>` uniform.
#[inline]
pub fn vec3_uniform_bytes(value: &[f32; 3]) -> &[u8] {
    bytemuck::cast_slice(value)
}

struct UniformBuffer {
    slot: UniformSlot,
    buffer: wgpu::Buffer,
}

/// A linked vertex + fragment program on the GPU.
///
/// Owns the render pipeline, one uniform buffer per reflected uniform and the
/// bind groups that expose them. Dropping it releases all of these.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    /// Indexed by group number.
    bind_groups: Vec<wgpu::BindGroup>,
    uniforms: HashMap<String, UniformBuffer>,
    warned: HashSet<String>,
}

impl ShaderProgram {
    /// Compiles, links, and creates the pipeline for a triangle-list program
    /// rendering into `target_format`.
    ///
    /// Compilation and linking complete before any GPU allocation, so a bad
    /// source never leaves partial GPU state behind.
    pub fn build(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        vertex_src: &str,
        fragment_src: &str,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
    ) -> Result<Self, ShaderError> {
        let mut attributes = Vec::with_capacity(vertex_layout.attributes.len());
        for attr in vertex_layout.attributes {
            let a = VertexAttribute::from_wgpu(attr).ok_or_else(|| {
                ShaderError::link(format!(
                    "vertex attribute @location({}) uses unsupported format {:?}",
                    attr.shader_location, attr.format
                ))
            })?;
            attributes.push(a);
        }

        let (vertex, fragment, interface) = check_program(vertex_src, fragment_src, &attributes)?;

        // GPU objects from here on.
        let mut groups: BTreeMap<u32, Vec<(&str, &UniformSlot)>> = BTreeMap::new();
        for (name, slot) in interface.uniforms() {
            groups.entry(slot.group).or_default().push((name, slot));
        }
        let group_count = groups.keys().next_back().map_or(0, |&g| g + 1);

        let mut uniforms = HashMap::new();
        let mut layouts = Vec::with_capacity(group_count as usize);
        let mut bind_groups = Vec::with_capacity(group_count as usize);

        for group in 0..group_count {
            let members = groups.get(&group).map(Vec::as_slice).unwrap_or_default();

            let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|(_, slot)| wgpu::BindGroupLayoutEntry {
                    binding: slot.binding,
                    visibility: slot.stages,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(slot.size),
                    },
                    count: None,
                })
                .collect();

            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lamina program bgl"),
                entries: &layout_entries,
            });

            for (name, slot) in members {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(name),
                    // Uniform buffers are allocated in 16-byte units.
                    size: slot.size.max(1).next_multiple_of(16),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                uniforms.insert((*name).to_owned(), UniformBuffer { slot: **slot, buffer });
            }

            let entries: Vec<wgpu::BindGroupEntry<'_>> = members
                .iter()
                .filter_map(|(name, slot)| {
                    let ub = uniforms.get(*name)?;
                    Some(wgpu::BindGroupEntry {
                        binding: slot.binding,
                        resource: ub.buffer.as_entire_binding(),
                    })
                })
                .collect();

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("lamina program bind group"),
                layout: &layout,
                entries: &entries,
            });

            layouts.push(layout);
            bind_groups.push(bind_group);
        }

        let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lamina program layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lamina vertex stage"),
            source: wgpu::ShaderSource::Wgsl(vertex.source().into()),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lamina fragment stage"),
            source: wgpu::ShaderSource::Wgsl(fragment.source().into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lamina program"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // The stage modules are only needed while the pipeline is created.
        drop(vs_module);
        drop(fs_module);

        log::info!(
            "shader program ready ({} uniform(s), {} bind group(s))",
            uniforms.len(),
            bind_groups.len()
        );

        Ok(Self {
            pipeline,
            bind_groups,
            uniforms,
            warned: HashSet::new(),
        })
    }

    /// Writes `value` into the uniform called `name`.
    ///
    /// Returns `false` (and warns once per name) when no such uniform exists
    /// or it is not 12 bytes wide; the draw then proceeds with the old value.
    pub fn set_uniform_vec3(&mut self, queue: &wgpu::Queue, name: &str, value: [f32; 3]) -> bool {
        let bytes = vec3_uniform_bytes(&value);
        match self.uniforms.get(name) {
            Some(u) if u.slot.size == bytes.len() as u64 => {
                queue.write_buffer(&u.buffer, 0, bytes);
                true
            }
            found => {
                if self.warned.insert(name.to_owned()) {
                    match found {
                        None => log::warn!("uniform `{name}` not found in program; ignoring writes"),
                        Some(u) => log::warn!(
                            "uniform `{name}` is {} bytes, not a vec3<f32>; ignoring writes",
                            u.slot.size
                        ),
                    }
                }
                false
            }
        }
    }

    /// Sets the pipeline and all bind groups on `rpass`.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        for (group, bind_group) in self.bind_groups.iter().enumerate() {
            rpass.set_bind_group(group as u32, bind_group, &[]);
        }
    }
}
