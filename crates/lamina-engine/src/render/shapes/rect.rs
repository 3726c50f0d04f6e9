use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{create_quad_pipeline, draw_clipped, InstancedQuads, ViewportUniform};

/// Solid rectangle renderer for `DrawCmd::Rect`.
///
/// Geometry is logical pixels, converted to NDC in the vertex shader.
/// Colors are premultiplied RGBA (`paint::Color`).
#[derive(Default)]
pub struct RectRenderer {
    gpu: Option<RectGpu>,
    instances: Vec<RectInstance>,
    clips: Vec<Option<Rect>>,
}

struct RectGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,
    quads: InstancedQuads,
}

impl RectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every rectangle in `draw_list` over the current frame contents,
    /// in paint order.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        self.instances.clear();
        self.clips.clear();

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Rect(cmd) = &item.cmd else { continue };
            if cmd.rect.is_empty() {
                continue;
            }
            self.instances.push(RectInstance {
                origin: [cmd.rect.origin.x, cmd.rect.origin.y],
                size: [cmd.rect.size.x, cmd.rect.size.y],
                color: cmd.color.to_array(),
            });
            self.clips.push(item.clip_rect);
        }

        if self.instances.is_empty() {
            return;
        }

        if self.gpu.as_ref().is_none_or(|g| g.format != ctx.surface_format) {
            self.gpu = Some(RectGpu::new(ctx));
        }
        let Some(gpu) = self.gpu.as_mut() else { return };

        ctx.queue.write_buffer(
            &gpu.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)),
        );
        gpu.quads.upload(ctx.device, ctx.queue, &self.instances);

        let mut rpass = target.begin_overlay_pass("lamina rect pass");
        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        gpu.quads.bind(&mut rpass);
        draw_clipped(&mut rpass, &self.clips, ctx.viewport, ctx.scale_factor);
    }
}

impl RectGpu {
    fn new(ctx: &RenderCtx<'_>) -> Self {
        log::debug!("creating rect pipeline for {:?}", ctx.surface_format);

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lamina rect bgl"),
            entries: &[ViewportUniform::layout_entry(0)],
        });

        let pipeline = create_quad_pipeline(
            ctx.device,
            ctx.surface_format,
            "lamina rect pipeline",
            include_str!("shaders/rect.wgsl"),
            &bind_group_layout,
            RectInstance::layout(),
        );

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lamina rect viewport ubo"),
            size: ViewportUniform::SIZE.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lamina rect bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        Self {
            format: ctx.surface_format,
            pipeline,
            bind_group,
            viewport_ubo,
            quads: InstancedQuads::new(ctx.device, "lamina rect quads"),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
