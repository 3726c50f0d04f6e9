//! GPU plumbing shared by the instanced quad renderers.

use std::num::NonZeroU64;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Viewport};

// ── blend ─────────────────────────────────────────────────────────────────

/// Premultiplied "over".
pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let over = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: over, alpha: over }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(super) fn from_viewport(viewport: Viewport) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }

    pub(super) const SIZE: NonZeroU64 = match NonZeroU64::new(size_of::<Self>() as u64) {
        Some(n) => n,
        None => panic!("ViewportUniform is zero-sized"),
    };

    /// Bind group layout entry for the viewport uniform at `binding`.
    pub(super) fn layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(Self::SIZE),
            },
            count: None,
        }
    }
}

// ── unit quad ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const UNIT_QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const UNIT_QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad buffers (slot 0) plus a growable per-instance buffer (slot 1).
pub(super) struct InstancedQuads {
    label: &'static str,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl InstancedQuads {
    pub(super) fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&UNIT_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&UNIT_QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            label,
            quad_vbo,
            quad_ibo,
            instance_vbo: None,
            instance_capacity: 0,
        }
    }

    /// Uploads `instances`, growing the instance buffer to the next power of
    /// two when needed.
    pub(super) fn upload<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[T]) {
        if instances.len() > self.instance_capacity || self.instance_vbo.is_none() {
            let new_cap = instances.len().next_power_of_two().max(64);
            log::trace!("{}: instance buffer -> {new_cap}", self.label);
            self.instance_vbo = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (new_cap * size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = new_cap;
        }

        if let Some(vbo) = self.instance_vbo.as_ref() {
            queue.write_buffer(vbo, 0, bytemuck::cast_slice(instances));
        }
    }

    pub(super) fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
    }
}

/// Creates the pipeline every quad renderer uses: `vs_main`/`fs_main`, unit
/// quad at slot 0, `instance_layout` at slot 1, premultiplied blending.
pub(super) fn create_quad_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    label: &str,
    shader_src: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    instance_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[QuadVertex::layout(), instance_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
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
    })
}

// ── clipping ──────────────────────────────────────────────────────────────

/// Converts a logical-pixel clip rect to a physical scissor `(x, y, w, h)`,
/// clamped to the viewport.
///
/// `None` clip means the full viewport. Returns `None` for a zero-area result;
/// the caller skips those draws.
pub(super) fn logical_clip_to_scissor(
    clip: Option<Rect>,
    viewport: Viewport,
    scale: f32,
) -> Option<(u32, u32, u32, u32)> {
    let phys_vw = (viewport.width * scale).max(1.0) as u32;
    let phys_vh = (viewport.height * scale).max(1.0) as u32;

    let (x, y, w, h) = match clip {
        None => (0, 0, phys_vw, phys_vh),
        Some(r) => {
            let to_px = |v: f32, limit: u32| ((v * scale).max(0.0) as u32).min(limit);
            let max = r.max();
            let x = to_px(r.origin.x, phys_vw);
            let y = to_px(r.origin.y, phys_vh);
            let x2 = to_px(max.x, phys_vw);
            let y2 = to_px(max.y, phys_vh);
            (x, y, x2.saturating_sub(x), y2.saturating_sub(y))
        }
    };

    if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
}

/// Splits a per-instance clip sequence into runs of equal clip rects so each
/// run becomes one instanced draw.
pub(super) fn clip_runs(clips: &[Option<Rect>]) -> Vec<(Range<u32>, Option<Rect>)> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    while start < clips.len() {
        let clip = clips[start];
        let mut end = start + 1;
        while end < clips.len() && clips[end] == clip {
            end += 1;
        }
        runs.push((start as u32..end as u32, clip));
        start = end;
    }
    runs
}

/// Issues one instanced quad draw per clip run, setting the scissor for each.
pub(super) fn draw_clipped(
    rpass: &mut wgpu::RenderPass<'_>,
    clips: &[Option<Rect>],
    viewport: Viewport,
    scale: f32,
) {
    for (instances, clip) in clip_runs(clips) {
        if let Some((sx, sy, sw, sh)) = logical_clip_to_scissor(clip, viewport, scale) {
            rpass.set_scissor_rect(sx, sy, sw, sh);
            rpass.draw_indexed(0..UNIT_QUAD_INDICES.len() as u32, 0, instances);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport::new(800.0, 600.0);

    #[test]
    fn no_clip_is_full_viewport() {
        assert_eq!(logical_clip_to_scissor(None, VP, 1.0), Some((0, 0, 800, 600)));
        assert_eq!(logical_clip_to_scissor(None, VP, 2.0), Some((0, 0, 1600, 1200)));
    }

    #[test]
    fn clip_is_scaled_and_clamped() {
        let clip = Some(Rect::new(700.0, -10.0, 200.0, 50.0));
        assert_eq!(logical_clip_to_scissor(clip, VP, 1.0), Some((700, 0, 100, 40)));
    }

    #[test]
    fn zero_area_clip_is_skipped() {
        assert_eq!(logical_clip_to_scissor(Some(Rect::default()), VP, 1.0), None);
    }

    #[test]
    fn runs_group_consecutive_equal_clips() {
        let a = Some(Rect::new(0.0, 0.0, 10.0, 10.0));
        let runs = clip_runs(&[None, None, a, a, None]);
        assert_eq!(runs, vec![(0..2, None), (2..4, a), (4..5, None)]);
        assert!(clip_runs(&[]).is_empty());
    }

    #[test]
    fn viewport_uniform_is_never_zero() {
        let u = ViewportUniform::from_viewport(Viewport::new(0.0, 300.0));
        assert_eq!(u.viewport, [1.0, 300.0]);
        assert_eq!(ViewportUniform::SIZE.get(), 16);
    }
}
